//! Response normalization
//!
//! Every API response is resolved to either its decoded JSON payload or a
//! classified [`RestError`]. Checks run in a fixed order:
//!
//! 1. status outside {200, 201} → [`RestError::HttpStatus`] (body not parsed)
//! 2. body not JSON, or empty → [`RestError::InvalidResponseBody`]
//! 3. `"error"` key present → [`RestError::Api`]
//! 4. `"errors"` key present → [`RestError::Api`], all messages joined with `", "`
//! 5. `"success": false` → [`RestError::Api`]

use serde_json::Value;
use tracing::debug;

use crate::error::{RestError, RestResult};

/// Statuses treated as success
pub const SUCCESS_STATUSES: [u16; 2] = [200, 201];

const SEPARATOR: &str = ", ";
const UNSUCCESSFUL: &str = "Request was not successful";

/// Resolve a raw HTTP status and body to a payload or an error
pub fn normalize(status: u16, body: &[u8]) -> RestResult<Value> {
    if !SUCCESS_STATUSES.contains(&status) {
        debug!(status, "Non-success HTTP status");
        return Err(RestError::HttpStatus {
            status,
            body: raw(body),
        });
    }

    let value: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(e) => {
            debug!(status, error = %e, "Response body is not JSON");
            return Err(RestError::InvalidResponseBody {
                status,
                body: raw(body),
            });
        }
    };

    if is_empty(&value) {
        return Err(RestError::InvalidResponseBody {
            status,
            body: raw(body),
        });
    }

    if let Some(object) = value.as_object() {
        let api_error = |message: String| RestError::Api {
            message,
            status,
            body: raw(body),
        };

        if let Some(error) = object.get("error") {
            return Err(api_error(message_of(error)));
        }

        if let Some(errors) = object.get("errors") {
            return Err(api_error(message_of(errors)));
        }

        if object.get("success") == Some(&Value::Bool(false)) {
            return Err(api_error(UNSUCCESSFUL.to_string()));
        }
    }

    Ok(value)
}

/// Whether a decoded payload carries nothing
fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Render an error value
///
/// A key present with nothing in it still reports a generic failure.
fn message_of(value: &Value) -> String {
    if is_empty(value) {
        UNSUCCESSFUL.to_string()
    } else {
        render(value)
    }
}

/// Sequences are joined
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(render)
            .collect::<Vec<_>>()
            .join(SEPARATOR),
        other => other.to_string(),
    }
}

fn raw(body: &[u8]) -> String {
    String::from_utf8_lossy(body).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn api_message(result: RestResult<Value>) -> String {
        match result {
            Err(RestError::Api { message, .. }) => message,
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[test]
    fn test_ok_payload_round_trips() {
        let payload = json!({
            "amount": "36.62800000",
            "currency": "BTC",
            "nested": {"list": [1, 2, 3], "flag": true}
        });
        let body = serde_json::to_vec(&payload).unwrap();

        assert_eq!(normalize(200, &body).unwrap(), payload);
        assert_eq!(normalize(201, &body).unwrap(), payload);
    }

    #[test]
    fn test_non_success_status_wins_over_body() {
        for status in [204, 301, 400, 401, 404, 500, 503] {
            let err = normalize(status, br#"{"amount":"1"}"#).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::HttpError);
            assert_eq!(err.http_status(), Some(status));
        }

        let err = normalize(502, b"<html>Bad Gateway</html>").unwrap_err();
        match err {
            RestError::HttpStatus { status, body } => {
                assert_eq!(status, 502);
                assert_eq!(body, "<html>Bad Gateway</html>");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_invalid_and_empty_bodies() {
        for body in [&b"not json"[..], b"", b" ", b"null", b"{}", b"[]", b"\"\""] {
            let err = normalize(200, body).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidResponseBody, "body {:?}", body);
        }
    }

    #[test]
    fn test_error_key() {
        let result = normalize(200, br#"{"error": "bad thing"}"#);
        assert_eq!(api_message(result), "bad thing");
    }

    #[test]
    fn test_errors_key_joins_all() {
        let result = normalize(200, br#"{"errors": ["first", "second"]}"#);
        assert_eq!(api_message(result), "first, second");
    }

    #[test]
    fn test_success_false_with_errors_joins_all() {
        let result = normalize(200, br#"{"success": false, "errors": ["a", "b"]}"#);
        assert_eq!(api_message(result), "a, b");
    }

    #[test]
    fn test_success_false_without_errors() {
        let result = normalize(200, br#"{"success": false}"#);
        assert_eq!(api_message(result), UNSUCCESSFUL);
    }

    #[test]
    fn test_error_precedes_errors() {
        let result = normalize(200, br#"{"error": "one", "errors": ["two"], "success": false}"#);
        assert_eq!(api_message(result), "one");
    }

    #[test]
    fn test_present_but_empty_error_keys_still_fail() {
        let result = normalize(200, br#"{"error": null, "amount": "1"}"#);
        assert_eq!(api_message(result), UNSUCCESSFUL);

        let result = normalize(200, br#"{"errors": [], "amount": "1"}"#);
        assert_eq!(api_message(result), UNSUCCESSFUL);

        let result = normalize(201, br#"{"success": true, "error": "", "transfer": {"code": "X"}}"#);
        assert_eq!(api_message(result), UNSUCCESSFUL);
    }

    #[test]
    fn test_api_error_keeps_raw_body() {
        let body = br#"{"error":"Invalid api key"}"#;
        match normalize(201, body) {
            Err(RestError::Api { status, body: raw, .. }) => {
                assert_eq!(status, 201);
                assert_eq!(raw, r#"{"error":"Invalid api key"}"#);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_non_object_payloads_pass_through() {
        assert_eq!(normalize(200, b"[1,2]").unwrap(), json!([1, 2]));
        assert_eq!(normalize(200, b"42").unwrap(), json!(42));
    }
}

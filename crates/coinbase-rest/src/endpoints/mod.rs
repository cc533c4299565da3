//! API endpoint implementations
//!
//! Each wrapper turns typed arguments into a path and parameters for
//! [`CoinbaseRpc::request`] and the decoded JSON back into a record.

pub mod account;
pub mod buttons;
pub mod trading;
pub mod transactions;
pub mod transfers;
pub mod users;

pub use account::AccountEndpoints;
pub use buttons::ButtonEndpoints;
pub use trading::TradingEndpoints;
pub use transactions::TransactionEndpoints;
pub use transfers::TransferEndpoints;
pub use users::UserEndpoints;

use coinbase_auth::{Method, Params};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::{RestError, RestResult};
use crate::rpc::CoinbaseRpc;

/// Records per page on paginated list endpoints
pub const PAGE_SIZE: usize = 30;

/// Build a parameter map from a `json!` object literal
pub(crate) fn params(value: Value) -> Params {
    match value {
        Value::Object(map) => map,
        _ => Params::new(),
    }
}

/// Deserialize a JSON value into a record
pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> RestResult<T> {
    serde_json::from_value(value).map_err(|e| RestError::Decode(e.to_string()))
}

/// Take a top-level field out of a response
pub(crate) fn take(mut value: Value, key: &str) -> RestResult<Value> {
    match value.get_mut(key).map(Value::take) {
        Some(Value::Null) | None => Err(RestError::Decode(format!("missing '{}' in response", key))),
        Some(field) => Ok(field),
    }
}

/// Fetch up to `count` records from a paginated list
///
/// List responses look like `{"num_pages": N, "<list_key>": [{"<item_key>": {...}}, ...]}`.
/// At most `count / PAGE_SIZE + 1` pages are requested, stopping at the last
/// page the server reports.
pub(crate) fn paginate<T: DeserializeOwned>(
    rpc: &CoinbaseRpc,
    path: &str,
    list_key: &str,
    item_key: &str,
    count: usize,
) -> RestResult<Vec<T>> {
    let mut records = Vec::new();
    if count == 0 {
        return Ok(records);
    }

    let max_pages = count / PAGE_SIZE + 1;

    for page in 1..=max_pages {
        let mut query = Params::new();
        query.insert("page".to_string(), Value::from(page));

        let response = rpc.request(Method::Get, path, Some(&query))?;
        let num_pages = response.get("num_pages").and_then(Value::as_u64);

        let entries = match take(response, list_key)? {
            Value::Array(entries) => entries,
            _ => return Err(RestError::Decode(format!("'{}' is not a list", list_key))),
        };

        debug!(path, page, entries = entries.len(), "Fetched page");

        for entry in entries {
            records.push(decode(take(entry, item_key)?)?);
        }

        if records.len() >= count || num_pages.map_or(true, |n| n <= page as u64) {
            break;
        }
    }

    records.truncate(count);
    Ok(records)
}

//! OAuth2 authorization flow
//!
//! Builds the authorization URL a user is sent to, and exchanges an
//! authorization code (or a refresh token) for a token pair. This is the
//! only place tokens are refreshed; [`crate::CoinbaseRpc`] never does it
//! implicitly.

use chrono::{Duration as ChronoDuration, Utc};
use coinbase_auth::{Credentials, Method, SignedRequest};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::endpoints::decode;
use crate::error::{RestError, RestResult};
use crate::response::normalize;
use crate::transport::{HttpTransport, Transport};
use crate::types::OAuthTokens;

/// Authorization page users are redirected to
pub const AUTHORIZE_URL: &str = "https://coinbase.com/oauth/authorize";

/// Token exchange endpoint
pub const TOKEN_URL: &str = "https://coinbase.com/oauth/token";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// OAuth2 application client
pub struct OAuthClient {
    client_id: String,
    client_secret: SecretString,
    redirect_uri: String,
    authorize_url: String,
    token_url: String,
    transport: Box<dyn Transport>,
}

impl OAuthClient {
    /// Create a client for a registered OAuth application
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> RestResult<Self> {
        let transport = HttpTransport::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS))?;
        Ok(Self::with_transport(client_id, client_secret, redirect_uri, transport))
    }

    /// Create a client that sends token requests through `transport`
    pub fn with_transport(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
        transport: impl Transport + 'static,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
            redirect_uri: redirect_uri.into(),
            authorize_url: AUTHORIZE_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
            transport: Box::new(transport),
        }
    }

    /// Override the authorization and token endpoints
    pub fn with_endpoints(
        mut self,
        authorize_url: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Self {
        self.authorize_url = authorize_url.into();
        self.token_url = token_url.into();
        self
    }

    /// URL to send the user to for granting access
    ///
    /// # Arguments
    /// * `scopes` - Requested permissions, e.g. `["balance", "buy"]`
    pub fn authorize_url(&self, scopes: &[&str]) -> RestResult<String> {
        let mut pairs = vec![
            ("response_type", "code".to_string()),
            ("client_id", self.client_id.clone()),
            ("redirect_uri", self.redirect_uri.clone()),
        ];
        if !scopes.is_empty() {
            pairs.push(("scope", scopes.join(" ")));
        }

        let query = serde_urlencoded::to_string(&pairs)
            .map_err(|e| RestError::InvalidParameter(e.to_string()))?;

        Ok(format!("{}?{}", self.authorize_url, query))
    }

    /// Exchange an authorization code for tokens
    #[instrument(skip(self, code))]
    pub fn exchange_code(&self, code: &str) -> RestResult<OAuthTokens> {
        self.request_tokens("authorization_code", ("code", code))
    }

    /// Obtain a fresh token pair from a refresh token
    #[instrument(skip(self, refresh_token))]
    pub fn refresh_tokens(&self, refresh_token: &str) -> RestResult<OAuthTokens> {
        self.request_tokens("refresh_token", ("refresh_token", refresh_token))
    }

    /// Refresh OAuth credentials, returning replacements
    ///
    /// # Errors
    /// [`RestError::Configuration`] for API key credentials.
    pub fn refresh(&self, credentials: &Credentials) -> RestResult<Credentials> {
        let refresh_token = credentials.refresh_token().ok_or_else(|| {
            RestError::Configuration("API key credentials cannot be refreshed".to_string())
        })?;

        self.refresh_tokens(refresh_token)?.into_credentials()
    }

    fn request_tokens(&self, grant_type: &str, grant: (&str, &str)) -> RestResult<OAuthTokens> {
        let form = serde_urlencoded::to_string([
            ("grant_type", grant_type),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose_secret()),
            grant,
        ])
        .map_err(|e| RestError::InvalidParameter(e.to_string()))?;

        let request = SignedRequest::unsigned(Method::Post, self.token_url.as_str())
            .with_header("Accept", "application/json")
            .with_header("Content-Type", "application/x-www-form-urlencoded")
            .with_body(form.into_bytes());

        debug!(grant_type, "Requesting OAuth tokens");

        let response = self.transport.send(&request)?;
        let tokens: OAuthTokens = decode(normalize(response.status, &response.body)?)?;

        info!(expires_in = ?tokens.expires_in, "Obtained OAuth tokens");
        Ok(tokens)
    }
}

impl std::fmt::Debug for OAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthClient")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .field("token_url", &self.token_url)
            .finish()
    }
}

impl OAuthTokens {
    /// Turn a token response into client credentials
    ///
    /// A known `expires_in` becomes an absolute expiry.
    pub fn into_credentials(self) -> RestResult<Credentials> {
        let expires_in = self.expires_in;
        let credentials = Credentials::oauth(self.access_token, self.refresh_token)?;

        Ok(match expires_in {
            Some(secs) => credentials.expiring_at(Utc::now() + ChronoDuration::seconds(secs)),
            None => credentials,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::transport::{RawResponse, TransportError};
    use parking_lot::Mutex;
    use std::sync::Arc;

    struct FixedTransport {
        status: u16,
        body: &'static str,
        sent: Mutex<Vec<SignedRequest>>,
    }

    impl FixedTransport {
        fn new(status: u16, body: &'static str) -> Arc<Self> {
            Arc::new(Self {
                status,
                body,
                sent: Mutex::new(Vec::new()),
            })
        }
    }

    impl Transport for FixedTransport {
        fn send(&self, request: &SignedRequest) -> Result<RawResponse, TransportError> {
            self.sent.lock().push(request.clone());
            Ok(RawResponse::new(self.status, self.body.as_bytes()))
        }
    }

    const TOKENS: &str = r#"{
        "access_token": "new_access",
        "refresh_token": "new_refresh",
        "token_type": "bearer",
        "expires_in": 7200,
        "scope": "balance buy"
    }"#;

    fn client(transport: Arc<FixedTransport>) -> OAuthClient {
        OAuthClient::with_transport("cid", "csecret", "https://app.example.com/callback", transport)
    }

    #[test]
    fn test_authorize_url() {
        let oauth = client(FixedTransport::new(200, TOKENS));
        let url = oauth.authorize_url(&["balance", "buy"]).unwrap();

        assert_eq!(
            url,
            "https://coinbase.com/oauth/authorize?response_type=code&client_id=cid\
             &redirect_uri=https%3A%2F%2Fapp.example.com%2Fcallback&scope=balance+buy"
        );
        assert!(!url.contains("csecret"));
    }

    #[test]
    fn test_authorize_url_without_scopes() {
        let oauth = client(FixedTransport::new(200, TOKENS));
        let url = oauth.authorize_url(&[]).unwrap();
        assert!(!url.contains("scope"));
    }

    #[test]
    fn test_exchange_code_posts_form() {
        let transport = FixedTransport::new(200, TOKENS);
        let oauth = client(Arc::clone(&transport));

        let tokens = oauth.exchange_code("auth-code").unwrap();
        assert_eq!(tokens.access_token, "new_access");
        assert_eq!(tokens.expires_in, Some(7200));

        let sent = transport.sent.lock();
        let request = &sent[0];
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.url, TOKEN_URL);
        assert_eq!(
            request.header("Content-Type"),
            Some("application/x-www-form-urlencoded")
        );

        let body = request.body_str().unwrap();
        assert!(body.contains("grant_type=authorization_code"));
        assert!(body.contains("code=auth-code"));
        assert!(body.contains("client_secret=csecret"));
    }

    #[test]
    fn test_refresh_credentials() {
        let transport = FixedTransport::new(200, TOKENS);
        let oauth = client(Arc::clone(&transport));

        let old = Credentials::oauth("old_access", "old_refresh").unwrap();
        let new = oauth.refresh(&old).unwrap();

        assert!(new.is_oauth());
        assert_eq!(new.refresh_token(), Some("new_refresh"));
        assert!(!new.is_expired_at(Utc::now()));

        let sent = transport.sent.lock();
        let body = sent[0].body_str().unwrap();
        assert!(body.contains("grant_type=refresh_token"));
        assert!(body.contains("refresh_token=old_refresh"));
    }

    #[test]
    fn test_refresh_rejects_api_key() {
        let oauth = client(FixedTransport::new(200, TOKENS));
        let creds = Credentials::api_key("K", "S").unwrap();
        let err = oauth.refresh(&creds).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigurationError);
    }

    #[test]
    fn test_token_endpoint_failure() {
        let oauth = client(FixedTransport::new(400, r#"{"error":"invalid_grant"}"#));
        let err = oauth.exchange_code("bad").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::HttpError);

        let oauth = client(FixedTransport::new(200, r#"{"error":"invalid_grant"}"#));
        let err = oauth.exchange_code("bad").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ApiError);
    }

    #[test]
    fn test_debug_redacts_client_secret() {
        let oauth = client(FixedTransport::new(200, TOKENS));
        assert!(!format!("{:?}", oauth).contains("csecret"));
    }
}

//! Request signing
//!
//! Coinbase API key signature algorithm:
//! 1. message = nonce + url (GET/DELETE: url includes the query string)
//! 2. POST/PUT: message += JSON body
//! 3. HMAC-SHA256(api_secret, message), lower-case hex
//!
//! OAuth2 requests are not signed; they carry a bearer header instead.

use chrono::Utc;
use hmac::{Hmac, Mac};
use secrecy::ExposeSecret;
use serde_json::Value;
use sha2::Sha256;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::credentials::Credentials;
use crate::error::{AuthError, AuthResult};
use crate::nonce::NonceSequencer;

type HmacSha256 = Hmac<Sha256>;

/// `User-Agent` used until [`RequestSigner::with_user_agent`] overrides it
const DEFAULT_USER_AGENT: &str = concat!("coinbase-auth/", env!("CARGO_PKG_VERSION"));

/// Request parameters, encoded as a query string or a JSON body
pub type Params = serde_json::Map<String, Value>;

/// HTTP method of an API call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// Upper-case method name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// Whether parameters travel in a JSON body rather than the query string
    pub fn has_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(Self::Get),
            "post" => Ok(Self::Post),
            "put" => Ok(Self::Put),
            "delete" => Ok(Self::Delete),
            other => Err(AuthError::InvalidParameter(format!(
                "Unsupported HTTP method: {}",
                other
            ))),
        }
    }
}

/// A fully prepared request, ready for the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute URL, including the query string for GET/DELETE
    pub url: String,
    /// Header name/value pairs
    pub headers: Vec<(String, String)>,
    /// Encoded body for POST/PUT
    pub body: Option<Vec<u8>>,
}

impl SignedRequest {
    /// Build a request that carries no authentication headers
    pub fn unsigned(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Append a header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the body
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Look up a header value (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body as UTF-8 text, if any
    pub fn body_str(&self) -> Option<&str> {
        self.body
            .as_deref()
            .and_then(|b| std::str::from_utf8(b).ok())
    }
}

/// HMAC-SHA256 of `message` keyed with `key`, lower-case hex encoded
pub fn hmac_sha256_hex(key: &[u8], message: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(message);
    hex::encode(mac.finalize().into_bytes())
}

/// Builds authenticated requests for one client
///
/// Owns the client's credentials and its nonce sequence. Every API key
/// request consumes exactly one nonce; OAuth requests consume none.
pub struct RequestSigner {
    credentials: Credentials,
    nonces: NonceSequencer,
    user_agent: String,
}

impl RequestSigner {
    /// Create a signer with a clock-seeded nonce sequence
    pub fn new(credentials: Credentials) -> Self {
        Self::with_nonces(credentials, NonceSequencer::new())
    }

    /// Create a signer with an explicit nonce sequence
    pub fn with_nonces(credentials: Credentials, nonces: NonceSequencer) -> Self {
        Self {
            credentials,
            nonces,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Set the `User-Agent` header value
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Get the credentials used by this signer
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Get the nonce sequence used by this signer
    pub fn nonces(&self) -> &NonceSequencer {
        &self.nonces
    }

    /// Build an authenticated request
    ///
    /// # Arguments
    /// * `method` - HTTP method
    /// * `url` - Absolute URL without query string
    /// * `params` - Query parameters (GET/DELETE) or JSON body (POST/PUT)
    ///
    /// # Errors
    /// [`AuthError::InvalidParameter`] if a query parameter is not a scalar,
    /// [`AuthError::TokenExpired`] if the OAuth token is known to be expired.
    pub fn sign(&self, method: Method, url: &str, params: Option<&Params>) -> AuthResult<SignedRequest> {
        let (url, body) = encode(method, url, params)?;

        match &self.credentials {
            Credentials::ApiKey { key, secret } => {
                let nonce = self.nonces.next();
                Ok(self.api_key_request(method, url, body, key, secret.expose_secret(), nonce))
            }
            Credentials::OAuth {
                access_token,
                expires_at,
                ..
            } => {
                if self.credentials.is_expired_at(Utc::now()) {
                    debug!(?expires_at, "OAuth token expired before send");
                    return Err(AuthError::TokenExpired);
                }

                let request = self
                    .base_request(method, url, body)
                    .with_header("Authorization", format!("Bearer {}", access_token.expose_secret()));
                Ok(request)
            }
        }
    }

    /// Build an API key request with a caller-chosen nonce
    ///
    /// Does not touch the nonce sequence. OAuth credentials ignore the nonce
    /// and behave exactly like [`RequestSigner::sign`].
    pub fn sign_with_nonce(
        &self,
        method: Method,
        url: &str,
        params: Option<&Params>,
        nonce: u64,
    ) -> AuthResult<SignedRequest> {
        match &self.credentials {
            Credentials::ApiKey { key, secret } => {
                let (url, body) = encode(method, url, params)?;
                Ok(self.api_key_request(method, url, body, key, secret.expose_secret(), nonce))
            }
            Credentials::OAuth { .. } => self.sign(method, url, params),
        }
    }

    fn api_key_request(
        &self,
        method: Method,
        url: String,
        body: Option<Vec<u8>>,
        key: &str,
        secret: &str,
        nonce: u64,
    ) -> SignedRequest {
        let nonce = nonce.to_string();
        let mut message = Vec::with_capacity(nonce.len() + url.len());
        message.extend_from_slice(nonce.as_bytes());
        message.extend_from_slice(url.as_bytes());
        if let Some(body) = &body {
            message.extend_from_slice(body);
        }

        let signature = hmac_sha256_hex(secret.as_bytes(), &message);

        debug!(%method, %url, %nonce, "Signed API key request");

        self.base_request(method, url, body)
            .with_header("ACCESS_KEY", key)
            .with_header("ACCESS_SIGNATURE", signature)
            .with_header("ACCESS_NONCE", nonce)
    }

    fn base_request(&self, method: Method, url: String, body: Option<Vec<u8>>) -> SignedRequest {
        let request = SignedRequest::unsigned(method, url)
            .with_header("Accept", "application/json")
            .with_header("Content-Type", "application/json")
            .with_header("User-Agent", self.user_agent.as_str());

        match body {
            Some(body) => request.with_body(body),
            None => request,
        }
    }
}

impl fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSigner")
            .field("credentials", &self.credentials)
            .field("nonces", &self.nonces)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Resolve the final URL and body for a method
///
/// Empty or absent parameters contribute nothing: no `?`, no body.
fn encode(method: Method, url: &str, params: Option<&Params>) -> AuthResult<(String, Option<Vec<u8>>)> {
    let params = match params {
        Some(params) if !params.is_empty() => params,
        _ => return Ok((url.to_string(), None)),
    };

    if method.has_body() {
        let body = serde_json::to_vec(params)
            .map_err(|e| AuthError::InvalidParameter(e.to_string()))?;
        return Ok((url.to_string(), Some(body)));
    }

    let query = query_string(params)?;
    if query.is_empty() {
        return Ok((url.to_string(), None));
    }

    Ok((format!("{}?{}", url, query), None))
}

/// URL-encode scalar parameters; `null` values are skipped
fn query_string(params: &Params) -> AuthResult<String> {
    let mut pairs: Vec<(&str, String)> = Vec::with_capacity(params.len());

    for (key, value) in params {
        let value = match value {
            Value::Null => continue,
            Value::String(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::Array(_) | Value::Object(_) => {
                return Err(AuthError::InvalidParameter(format!(
                    "Query parameter '{}' must be a scalar",
                    key
                )))
            }
        };
        pairs.push((key.as_str(), value));
    }

    serde_urlencoded::to_string(&pairs).map_err(|e| AuthError::InvalidParameter(e.to_string()))
}

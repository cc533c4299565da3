//! Authenticated RPC client
//!
//! Composes the request signer, the transport and the response normalizer
//! behind a single [`CoinbaseRpc::request`] call. Every endpoint wrapper goes
//! through it. No retries happen here.

use coinbase_auth::{Method, Params, RequestSigner};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{RestError, RestResult};
use crate::response::normalize;
use crate::transport::Transport;

/// Result of one API call: decoded JSON or a classified error
pub type NormalizedResult = RestResult<Value>;

/// Signs, sends and normalizes API calls for one set of credentials
pub struct CoinbaseRpc {
    base_url: String,
    signer: RequestSigner,
    transport: Box<dyn Transport>,
}

impl CoinbaseRpc {
    /// Create a client rooted at `base_url`
    pub fn new(
        base_url: impl Into<String>,
        signer: RequestSigner,
        transport: impl Transport + 'static,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            base_url,
            signer,
            transport: Box::new(transport),
        }
    }

    /// Base endpoint every path is appended to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Signer holding this client's credentials and nonce sequence
    pub fn signer(&self) -> &RequestSigner {
        &self.signer
    }

    /// Perform one authenticated call
    ///
    /// # Arguments
    /// * `method` - HTTP method
    /// * `path` - Path below the base URL, e.g. `/account/balance`
    /// * `params` - Query parameters (GET/DELETE) or JSON body (POST/PUT)
    pub fn request(&self, method: Method, path: &str, params: Option<&Params>) -> NormalizedResult {
        let url = format!("{}{}", self.base_url, path);
        let request = self.signer.sign(method, &url, params)?;

        debug!(%method, path, "Sending request");

        let response = self.transport.send(&request).map_err(|e| {
            warn!(%method, path, error = %e, "Transport failure");
            RestError::from(e)
        })?;

        match normalize(response.status, &response.body) {
            Err(RestError::HttpStatus { status: 401, body })
                if self.signer.credentials().is_oauth() =>
            {
                warn!(path, "OAuth access token rejected");
                Err(RestError::Authentication {
                    reason: format!("OAuth access token rejected (HTTP 401): {}", body),
                })
            }
            other => other,
        }
    }

    /// GET with optional query parameters
    pub fn get(&self, path: &str, params: Option<&Params>) -> NormalizedResult {
        self.request(Method::Get, path, params)
    }

    /// POST with optional JSON body
    pub fn post(&self, path: &str, params: Option<&Params>) -> NormalizedResult {
        self.request(Method::Post, path, params)
    }

    /// PUT with optional JSON body
    pub fn put(&self, path: &str, params: Option<&Params>) -> NormalizedResult {
        self.request(Method::Put, path, params)
    }

    /// DELETE with optional query parameters
    pub fn delete(&self, path: &str, params: Option<&Params>) -> NormalizedResult {
        self.request(Method::Delete, path, params)
    }
}

impl std::fmt::Debug for CoinbaseRpc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoinbaseRpc")
            .field("base_url", &self.base_url)
            .field("signer", &self.signer)
            .finish()
    }
}

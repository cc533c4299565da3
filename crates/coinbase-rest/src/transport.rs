//! Blocking HTTP transport
//!
//! The RPC client talks to the network only through [`Transport`], so tests
//! and alternative HTTP stacks can stand in for [`HttpTransport`].

use coinbase_auth::{Method, SignedRequest};
use reqwest::blocking::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::error::{RestError, RestResult};

/// Status and body of an HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw body bytes
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Failure to obtain any HTTP response
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request did not complete in time
    #[error("request timed out")]
    Timeout,

    /// Connection, TLS or protocol failure
    #[error("network error: {0}")]
    Network(String),
}

/// Synchronous request/response capability
pub trait Transport: Send + Sync {
    /// Send a prepared request and return the raw response
    fn send(&self, request: &SignedRequest) -> Result<RawResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: &SignedRequest) -> Result<RawResponse, TransportError> {
        (**self).send(request)
    }
}

/// [`Transport`] backed by a blocking `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport with the given request timeout
    pub fn new(timeout: Duration) -> RestResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RestError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Wrap an existing `reqwest` client
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &SignedRequest) -> Result<RawResponse, TransportError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().map_err(map_reqwest_error)?.to_vec();

        debug!(status, bytes = body.len(), "Received response");

        Ok(RawResponse { status, body })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Network(err.to_string())
    }
}

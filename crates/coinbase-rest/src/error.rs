//! Error types for REST API operations

use coinbase_auth::AuthError;

use crate::transport::TransportError;

/// Coarse classification of a [`RestError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Server answered with a non-success status
    HttpError,
    /// Body was empty or not JSON
    InvalidResponseBody,
    /// Well-formed error payload
    ApiError,
    /// OAuth token expired or rejected
    AuthenticationError,
    /// No response was obtained
    TransportError,
    /// Client was constructed with unusable settings
    ConfigurationError,
    /// Caller-supplied parameters could not be encoded
    InvalidParameter,
    /// Successful payload did not have the expected shape
    Decode,
}

/// Errors that can occur during REST API operations
#[derive(Debug, thiserror::Error)]
pub enum RestError {
    /// Server returned a status outside {200, 201}
    #[error("HTTP status {status}: {body}")]
    HttpStatus {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Response body was empty or not valid JSON
    #[error("Invalid response body (HTTP {status})")]
    InvalidResponseBody {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// API returned an error payload
    #[error("API error: {message}")]
    Api {
        /// Error message(s) reported by the API
        message: String,
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// OAuth access token expired or was rejected
    #[error("Authentication failed: {reason}")]
    Authentication {
        /// What went wrong
        reason: String,
    },

    /// Network failure before any status was received
    #[error("Transport error: {0}")]
    Transport(String),

    /// Request timed out
    #[error("Request timed out")]
    Timeout,

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Failed to map a successful response onto a record
    #[error("Unexpected response shape: {0}")]
    Decode(String),
}

impl RestError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::HttpStatus { .. } => ErrorKind::HttpError,
            Self::InvalidResponseBody { .. } => ErrorKind::InvalidResponseBody,
            Self::Api { .. } => ErrorKind::ApiError,
            Self::Authentication { .. } => ErrorKind::AuthenticationError,
            Self::Transport(_) | Self::Timeout => ErrorKind::TransportError,
            Self::Configuration(_) => ErrorKind::ConfigurationError,
            Self::InvalidParameter(_) => ErrorKind::InvalidParameter,
            Self::Decode(_) => ErrorKind::Decode,
        }
    }

    /// HTTP status of the response, when one was received
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. }
            | Self::InvalidResponseBody { status, .. }
            | Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if the caller may reasonably retry
    ///
    /// The client itself never retries.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout => true,
            Self::HttpStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Check if the caller must refresh OAuth tokens before retrying
    pub fn needs_token_refresh(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }
}

impl From<AuthError> for RestError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Configuration(msg) => Self::Configuration(msg),
            AuthError::EnvVarNotSet(var) => {
                Self::Configuration(format!("Environment variable not set: {}", var))
            }
            AuthError::InvalidParameter(msg) => Self::InvalidParameter(msg),
            AuthError::TokenExpired => Self::Authentication {
                reason: "OAuth access token expired, refresh required".to_string(),
            },
        }
    }
}

impl From<TransportError> for RestError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout => Self::Timeout,
            TransportError::Network(msg) => Self::Transport(msg),
        }
    }
}

/// Result type for REST operations
pub type RestResult<T> = Result<T, RestError>;

//! Error types for authentication operations

/// Errors that can occur while building or signing a request
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Credentials were missing or malformed at construction time
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Environment variable not set
    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),

    /// Request parameters could not be encoded
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// OAuth access token is past its expiry
    #[error("OAuth access token expired, refresh required")]
    TokenExpired,
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

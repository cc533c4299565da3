//! Authentication credentials for the Coinbase API
//!
//! A client authenticates with exactly one of two mechanisms, modelled as
//! the variants of [`Credentials`].
//!
//! # Security
//!
//! The API secret and both OAuth tokens are stored using the `secrecy`
//! crate which:
//! - Zeroizes memory on drop
//! - Prevents accidental logging via Debug impl
//! - Provides explicit access via `expose_secret()`

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::{AuthError, AuthResult};

const ENV_API_KEY: &str = "COINBASE_API_KEY";
const ENV_API_SECRET: &str = "COINBASE_API_SECRET";
const ENV_ACCESS_TOKEN: &str = "COINBASE_ACCESS_TOKEN";
const ENV_REFRESH_TOKEN: &str = "COINBASE_REFRESH_TOKEN";

/// How a client authenticates against the API
///
/// Immutable once constructed. Secret values never appear in `Debug` output.
pub enum Credentials {
    /// Static API key and secret; every request is HMAC-signed
    ApiKey {
        /// API key (public)
        key: String,
        /// API secret (zeroized on drop)
        secret: SecretString,
    },
    /// OAuth2 token pair; requests carry a bearer header
    OAuth {
        /// Access token sent with every request
        access_token: SecretString,
        /// Refresh token, only used by the out-of-band refresh flow
        refresh_token: SecretString,
        /// Access token expiry, when known
        expires_at: Option<DateTime<Utc>>,
    },
}

/// Stored OAuth2 credential blob
#[derive(Debug, Deserialize)]
struct StoredOAuth {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    token_expiry: Option<DateTime<Utc>>,
}

impl Credentials {
    /// Create API key credentials
    ///
    /// # Errors
    /// Returns [`AuthError::Configuration`] if either value is empty.
    pub fn api_key(key: impl Into<String>, secret: impl Into<String>) -> AuthResult<Self> {
        let key = key.into();
        let secret = secret.into();

        if key.trim().is_empty() {
            return Err(AuthError::Configuration("API key must not be empty".to_string()));
        }
        if secret.is_empty() {
            return Err(AuthError::Configuration("API secret must not be empty".to_string()));
        }

        Ok(Self::ApiKey {
            key,
            secret: SecretString::from(secret),
        })
    }

    /// Create OAuth2 credentials from an access/refresh token pair
    ///
    /// # Errors
    /// Returns [`AuthError::Configuration`] if the access token is empty.
    pub fn oauth(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> AuthResult<Self> {
        let access_token = access_token.into();
        if access_token.trim().is_empty() {
            return Err(AuthError::Configuration(
                "OAuth access token must not be empty".to_string(),
            ));
        }

        Ok(Self::OAuth {
            access_token: SecretString::from(access_token),
            refresh_token: SecretString::from(refresh_token.into()),
            expires_at: None,
        })
    }

    /// Attach a known expiry to OAuth credentials
    ///
    /// Has no effect on API key credentials.
    pub fn expiring_at(self, at: DateTime<Utc>) -> Self {
        match self {
            Self::OAuth {
                access_token,
                refresh_token,
                ..
            } => Self::OAuth {
                access_token,
                refresh_token,
                expires_at: Some(at),
            },
            other => other,
        }
    }

    /// Load OAuth2 credentials from a stored JSON blob
    ///
    /// Expects `access_token` and `refresh_token`, and optionally an
    /// RFC 3339 `token_expiry`.
    pub fn from_oauth_json(json: &str) -> AuthResult<Self> {
        let stored: StoredOAuth = serde_json::from_str(json).map_err(|e| {
            AuthError::Configuration(format!("Invalid OAuth credential JSON: {}", e))
        })?;

        let creds = Self::oauth(stored.access_token, stored.refresh_token)?;
        Ok(match stored.token_expiry {
            Some(at) => creds.expiring_at(at),
            None => creds,
        })
    }

    /// Create credentials from environment variables
    ///
    /// Reads `COINBASE_API_KEY` and `COINBASE_API_SECRET`. If no API key is
    /// set, falls back to `COINBASE_ACCESS_TOKEN` and `COINBASE_REFRESH_TOKEN`.
    pub fn from_env() -> AuthResult<Self> {
        if let Ok(key) = std::env::var(ENV_API_KEY) {
            let secret = std::env::var(ENV_API_SECRET)
                .map_err(|_| AuthError::EnvVarNotSet(ENV_API_SECRET.to_string()))?;
            return Self::api_key(key, secret);
        }

        if let Ok(access_token) = std::env::var(ENV_ACCESS_TOKEN) {
            let refresh_token = std::env::var(ENV_REFRESH_TOKEN)
                .map_err(|_| AuthError::EnvVarNotSet(ENV_REFRESH_TOKEN.to_string()))?;
            return Self::oauth(access_token, refresh_token);
        }

        Err(AuthError::Configuration(format!(
            "Neither {} nor {} is set",
            ENV_API_KEY, ENV_ACCESS_TOKEN
        )))
    }

    /// Whether these are OAuth2 credentials
    pub fn is_oauth(&self) -> bool {
        matches!(self, Self::OAuth { .. })
    }

    /// Get the API key, if this is an API key credential
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::ApiKey { key, .. } => Some(key),
            Self::OAuth { .. } => None,
        }
    }

    /// Get the refresh token, if this is an OAuth credential
    ///
    /// Exposes the secret; hand it straight to the refresh flow.
    pub fn refresh_token(&self) -> Option<&str> {
        match self {
            Self::OAuth { refresh_token, .. } => Some(refresh_token.expose_secret()),
            Self::ApiKey { .. } => None,
        }
    }

    /// Check whether an OAuth access token is known to be expired at `now`
    ///
    /// API key credentials and tokens without a recorded expiry never expire.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self {
            Self::OAuth {
                expires_at: Some(at),
                ..
            } => *at <= now,
            _ => false,
        }
    }
}

impl Clone for Credentials {
    /// Clone credentials (creates new secrets with the same content)
    fn clone(&self) -> Self {
        match self {
            Self::ApiKey { key, secret } => Self::ApiKey {
                key: key.clone(),
                secret: SecretString::from(secret.expose_secret().to_string()),
            },
            Self::OAuth {
                access_token,
                refresh_token,
                expires_at,
            } => Self::OAuth {
                access_token: SecretString::from(access_token.expose_secret().to_string()),
                refresh_token: SecretString::from(refresh_token.expose_secret().to_string()),
                expires_at: *expires_at,
            },
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKey { key, .. } => f
                .debug_struct("ApiKey")
                .field("key", &format!("{}...", key.chars().take(8).collect::<String>()))
                .field("secret", &"[REDACTED]")
                .finish(),
            Self::OAuth { expires_at, .. } => f
                .debug_struct("OAuth")
                .field("access_token", &"[REDACTED]")
                .field("refresh_token", &"[REDACTED]")
                .field("expires_at", expires_at)
                .finish(),
        }
    }
}

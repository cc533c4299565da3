//! Current user details

use serde_json::Value;
use tracing::instrument;

use super::{decode, take};
use crate::error::{RestError, RestResult};
use crate::rpc::CoinbaseRpc;
use crate::types::User;

/// User endpoints
pub struct UserEndpoints<'a> {
    rpc: &'a CoinbaseRpc,
}

impl<'a> UserEndpoints<'a> {
    pub fn new(rpc: &'a CoinbaseRpc) -> Self {
        Self { rpc }
    }

    /// Get the authenticated user
    #[instrument(skip(self))]
    pub fn current(&self) -> RestResult<User> {
        let first = match take(self.rpc.get("/users", None)?, "users")? {
            Value::Array(users) => users.into_iter().next(),
            _ => None,
        };

        let entry = first.ok_or_else(|| RestError::Decode("no users in response".to_string()))?;
        decode(take(entry, "user")?)
    }
}

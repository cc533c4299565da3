//! Account endpoints: balance, receive addresses, contacts

use serde_json::{json, Value};
use tracing::instrument;

use super::{decode, params, take};
use crate::error::{RestError, RestResult};
use crate::rpc::CoinbaseRpc;
use crate::types::{Amount, Contact};

/// Account endpoints
pub struct AccountEndpoints<'a> {
    rpc: &'a CoinbaseRpc,
}

impl<'a> AccountEndpoints<'a> {
    pub fn new(rpc: &'a CoinbaseRpc) -> Self {
        Self { rpc }
    }

    /// Get the account balance
    #[instrument(skip(self))]
    pub fn balance(&self) -> RestResult<Amount> {
        decode(self.rpc.get("/account/balance", None)?)
    }

    /// Get the current bitcoin receive address
    #[instrument(skip(self))]
    pub fn receive_address(&self) -> RestResult<String> {
        address(self.rpc.get("/account/receive_address", None)?)
    }

    /// Generate a new bitcoin receive address
    ///
    /// # Arguments
    /// * `callback_url` - URL notified when payments arrive at the address
    #[instrument(skip(self))]
    pub fn generate_receive_address(&self, callback_url: Option<&str>) -> RestResult<String> {
        let body = params(json!({
            "address": {"callback_url": callback_url}
        }));

        address(self.rpc.post("/account/generate_receive_address", Some(&body))?)
    }

    /// List the account's address book contacts
    #[instrument(skip(self))]
    pub fn contacts(&self) -> RestResult<Vec<Contact>> {
        let entries = match take(self.rpc.get("/contacts", None)?, "contacts")? {
            Value::Array(entries) => entries,
            _ => return Err(RestError::Decode("'contacts' is not a list".to_string())),
        };

        entries
            .into_iter()
            .map(|entry| decode(take(entry, "contact")?))
            .collect()
    }
}

fn address(response: Value) -> RestResult<String> {
    match take(response, "address")? {
        Value::String(address) => Ok(address),
        _ => Err(RestError::Decode("'address' is not a string".to_string())),
    }
}

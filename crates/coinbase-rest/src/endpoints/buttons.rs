//! Merchant payment buttons

use serde_json::{json, Value};
use tracing::{info, instrument};

use super::{decode, params, take};
use crate::error::{RestError, RestResult};
use crate::rpc::CoinbaseRpc;
use crate::types::{ButtonRequest, PaymentButton};

/// Button endpoints
pub struct ButtonEndpoints<'a> {
    rpc: &'a CoinbaseRpc,
}

impl<'a> ButtonEndpoints<'a> {
    pub fn new(rpc: &'a CoinbaseRpc) -> Self {
        Self { rpc }
    }

    /// Create a payment button, page or iframe
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub fn create(&self, request: &ButtonRequest) -> RestResult<PaymentButton> {
        let button: Value =
            serde_json::to_value(request).map_err(|e| RestError::InvalidParameter(e.to_string()))?;
        let body = params(json!({ "button": button }));

        let button: PaymentButton = decode(take(self.rpc.post("/buttons", Some(&body))?, "button")?)?;
        info!(code = %button.code, "Button created");
        Ok(button)
    }
}

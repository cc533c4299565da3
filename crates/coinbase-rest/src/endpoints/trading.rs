//! Price quotes and bitcoin buys/sells

use rust_decimal::Decimal;
use serde_json::json;
use tracing::{info, instrument};

use super::{decode, params, take};
use crate::error::RestResult;
use crate::rpc::CoinbaseRpc;
use crate::types::{Amount, Transfer};

/// Trading endpoints
pub struct TradingEndpoints<'a> {
    rpc: &'a CoinbaseRpc,
}

impl<'a> TradingEndpoints<'a> {
    pub fn new(rpc: &'a CoinbaseRpc) -> Self {
        Self { rpc }
    }

    /// Total price to buy `qty` bitcoin
    #[instrument(skip(self))]
    pub fn buy_price(&self, qty: Decimal) -> RestResult<Amount> {
        let query = params(json!({"qty": qty.to_string()}));
        decode(self.rpc.get("/prices/buy", Some(&query))?)
    }

    /// Total received for selling `qty` bitcoin
    #[instrument(skip(self))]
    pub fn sell_price(&self, qty: Decimal) -> RestResult<Amount> {
        let query = params(json!({"qty": qty.to_string()}));
        decode(self.rpc.get("/prices/sell", Some(&query))?)
    }

    /// Buy bitcoin with the account's linked bank account
    ///
    /// # Arguments
    /// * `qty` - Bitcoin quantity to buy
    /// * `agree_btc_amount_varies` - Proceed even if the price cannot be guaranteed
    #[instrument(skip(self))]
    pub fn buy(&self, qty: Decimal, agree_btc_amount_varies: bool) -> RestResult<Transfer> {
        let body = params(json!({
            "qty": qty.to_string(),
            "agree_btc_amount_varies": agree_btc_amount_varies,
        }));

        let transfer: Transfer = decode(take(self.rpc.post("/buys", Some(&body))?, "transfer")?)?;
        info!(code = %transfer.code, status = %transfer.status, "Buy placed");
        Ok(transfer)
    }

    /// Sell bitcoin to the account's linked bank account
    #[instrument(skip(self))]
    pub fn sell(&self, qty: Decimal) -> RestResult<Transfer> {
        let body = params(json!({"qty": qty.to_string()}));

        let transfer: Transfer = decode(take(self.rpc.post("/sells", Some(&body))?, "transfer")?)?;
        info!(code = %transfer.code, status = %transfer.status, "Sell placed");
        Ok(transfer)
    }
}

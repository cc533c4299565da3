//! Sending, requesting and listing bitcoin transactions

use rust_decimal::Decimal;
use serde_json::{json, Value};
use tracing::{info, instrument};

use super::{decode, paginate, params, take};
use crate::error::RestResult;
use crate::rpc::CoinbaseRpc;
use crate::types::Transaction;

/// Transaction endpoints
pub struct TransactionEndpoints<'a> {
    rpc: &'a CoinbaseRpc,
}

impl<'a> TransactionEndpoints<'a> {
    pub fn new(rpc: &'a CoinbaseRpc) -> Self {
        Self { rpc }
    }

    /// Send money to an email or bitcoin address
    ///
    /// # Arguments
    /// * `to` - Recipient email or bitcoin address
    /// * `amount` - Amount in `currency`
    /// * `notes` - Note attached to the transaction
    /// * `currency` - "BTC" or an ISO currency code
    #[instrument(skip(self, notes))]
    pub fn send_money(
        &self,
        to: &str,
        amount: Decimal,
        notes: &str,
        currency: &str,
    ) -> RestResult<Transaction> {
        let body = transaction_body("to", to, amount, notes, currency);
        let transaction: Transaction =
            decode(take(self.rpc.post("/transactions/send_money", Some(&body))?, "transaction")?)?;

        info!(id = %transaction.id, status = %transaction.status, "Money sent");
        Ok(transaction)
    }

    /// Request money from an email address
    #[instrument(skip(self, notes))]
    pub fn request_money(
        &self,
        from: &str,
        amount: Decimal,
        notes: &str,
        currency: &str,
    ) -> RestResult<Transaction> {
        let body = transaction_body("from", from, amount, notes, currency);
        decode(take(
            self.rpc.post("/transactions/request_money", Some(&body))?,
            "transaction",
        )?)
    }

    /// Get one transaction by ID
    #[instrument(skip(self))]
    pub fn get(&self, transaction_id: &str) -> RestResult<Transaction> {
        let path = format!("/transactions/{}", transaction_id);
        decode(take(self.rpc.get(&path, None)?, "transaction")?)
    }

    /// List up to `count` most recent transactions
    #[instrument(skip(self))]
    pub fn list(&self, count: usize) -> RestResult<Vec<Transaction>> {
        paginate(self.rpc, "/transactions", "transactions", "transaction", count)
    }
}

/// Bitcoin amounts go in `amount`; anything else as a string plus currency
fn transaction_body(
    party_key: &str,
    party: &str,
    amount: Decimal,
    notes: &str,
    currency: &str,
) -> coinbase_auth::Params {
    let mut transaction = params(json!({ "notes": notes }));
    transaction.insert(party_key.to_string(), Value::from(party));

    if currency.eq_ignore_ascii_case("BTC") {
        transaction.insert("amount".to_string(), Value::from(amount.to_string()));
    } else {
        transaction.insert("amount_string".to_string(), Value::from(amount.to_string()));
        transaction.insert("amount_currency_iso".to_string(), Value::from(currency));
    }

    params(json!({ "transaction": transaction }))
}

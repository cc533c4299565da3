//! Common test utilities and fixtures for integration tests
//!
//! Response bodies follow the shapes documented for the Coinbase v1 API.

#![allow(dead_code)]

use coinbase_rest::{
    ClientConfig, CoinbaseClient, Credentials, RawResponse, SignedRequest, Transport,
    TransportError,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

pub const BASE_URL: &str = "https://coinbase.com/api/v1";

/// Sample balance response
pub const BALANCE: &str = r#"{
    "amount": "36.62800000",
    "currency": "BTC"
}"#;

/// Sample buy price quote
pub const BUY_PRICE: &str = r#"{
    "amount": "13.85",
    "currency": "USD"
}"#;

/// Sample current user response
pub const USERS: &str = r#"{
    "users": [{
        "user": {
            "id": "512db383f8182bd24d000001",
            "name": "User One",
            "email": "user1@example.com",
            "time_zone": "Pacific Time (US & Canada)",
            "native_currency": "USD",
            "balance": {"amount": "49.76000000", "currency": "BTC"},
            "buy_level": 1,
            "sell_level": 1,
            "buy_limit": {"amount": "10.00000000", "currency": "BTC"},
            "sell_limit": {"amount": "100.00000000", "currency": "BTC"}
        }
    }]
}"#;

/// Sample send_money response
pub const SEND_MONEY: &str = r#"{
    "success": true,
    "transaction": {
        "id": "501a1791f8182b2071000087",
        "created_at": "2012-08-01T23:00:49-07:00",
        "notes": "Sample transaction for you!",
        "amount": {"amount": "-1.23400000", "currency": "BTC"},
        "request": false,
        "status": "pending",
        "sender": {
            "id": "5011f33df8182b142400000e",
            "name": "User Two",
            "email": "user2@example.com"
        },
        "recipient_address": "1AmB4bxKGvozGcZnSSdJDqgKSDsGGmyM4"
    }
}"#;

/// Sample buy response
pub const BUY: &str = r#"{
    "success": true,
    "transfer": {
        "type": "Buy",
        "code": "6H7GYLXZ",
        "created_at": "2013-01-28T16:08:58-08:00",
        "fees": {
            "coinbase": {"cents": 14, "currency_iso": "USD"},
            "bank": {"cents": 15, "currency_iso": "USD"}
        },
        "payout_date": "2013-02-01T18:00:00-08:00",
        "transaction_id": "5011f33df8182b142400000e",
        "status": "created",
        "btc": {"amount": "1.00000000", "currency": "BTC"},
        "subtotal": {"amount": "13.55", "currency": "USD"},
        "total": {"amount": "13.84", "currency": "USD"},
        "description": "Paid for with $13.84 from Test xxxxx3111."
    }
}"#;

/// Buy rejected by the API with HTTP 200
pub const BUY_REJECTED: &str = r#"{
    "success": false,
    "errors": ["Insufficient funds"]
}"#;

/// Sample button response
pub const BUTTON: &str = r#"{
    "success": true,
    "button": {
        "code": "93865b9cae83706ae59220c013bc0afd",
        "type": "buy_now",
        "style": "custom_large",
        "text": "Pay With Bitcoin",
        "name": "test",
        "description": "Sample description",
        "custom": "Order123",
        "price": {"cents": 123, "currency_iso": "USD"}
    }
}"#;

/// One transaction entry for a list page
pub fn transaction_entry(n: usize) -> String {
    format!(
        r#"{{"transaction": {{
            "id": "tx{n}",
            "created_at": "2013-03-21T17:02:57-07:00",
            "amount": {{"amount": "0.10000000", "currency": "BTC"}},
            "request": false,
            "status": "complete",
            "recipient": {{"id": "u{n}", "name": "User {n}", "email": "u{n}@example.com"}}
        }}}}"#
    )
}

/// A `/transactions` page holding entries `first..first + len`
pub fn transactions_page(first: usize, len: usize, num_pages: u64) -> String {
    let entries: Vec<String> = (first..first + len).map(transaction_entry).collect();
    format!(
        r#"{{"current_user": {{"id": "me"}}, "total_count": 0, "num_pages": {}, "current_page": 1, "transactions": [{}]}}"#,
        num_pages,
        entries.join(",")
    )
}

/// Transport that replays scripted responses and records every request
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<RawResponse, TransportError>>>,
    sent: Mutex<Vec<SignedRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a response
    pub fn reply(&self, status: u16, body: &str) -> &Self {
        self.responses
            .lock()
            .push_back(Ok(RawResponse::new(status, body.as_bytes())));
        self
    }

    /// Queue a transport failure
    pub fn fail(&self, err: TransportError) -> &Self {
        self.responses.lock().push_back(Err(err));
        self
    }

    /// Requests sent so far
    pub fn sent(&self) -> Vec<SignedRequest> {
        self.sent.lock().clone()
    }
}

impl Transport for MockTransport {
    fn send(&self, request: &SignedRequest) -> Result<RawResponse, TransportError> {
        self.sent.lock().push(request.clone());
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("no scripted response".to_string())))
    }
}

/// Client with key "K", secret "S" and nonces starting at 1000
pub fn api_key_client(transport: &Arc<MockTransport>) -> CoinbaseClient {
    init_tracing();
    let config = ClientConfig::new()
        .with_credentials(Credentials::api_key("K", "S").unwrap())
        .with_nonce_seed(1000);
    CoinbaseClient::with_transport(config, Arc::clone(transport)).unwrap()
}

/// Client authenticated with an OAuth access token
pub fn oauth_client(transport: &Arc<MockTransport>) -> CoinbaseClient {
    init_tracing();
    let config = ClientConfig::new()
        .with_credentials(Credentials::oauth("access-token", "refresh-token").unwrap())
        .with_nonce_seed(1000);
    CoinbaseClient::with_transport(config, Arc::clone(transport)).unwrap()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

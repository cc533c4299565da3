//! REST API client for the Coinbase v1 API
//!
//! This crate provides an authenticated client for account balances, price
//! quotes, buys and sells, money transfers, and user/transaction/transfer
//! retrieval.
//!
//! # Features
//!
//! - **Account**: Balance, receive addresses, contacts
//! - **Trading**: Buy/sell price quotes, buy and sell bitcoin
//! - **Transactions**: Send and request money, transaction history
//! - **Transfers**: Buy/sell history
//! - **Merchant**: Payment buttons
//!
//! # Authentication
//!
//! Either an API key/secret pair (each request HMAC-SHA256 signed with a
//! monotonic nonce) or an OAuth2 access/refresh token pair (bearer header).
//! Token refresh is explicit, via [`OAuthClient`].
//!
//! # Example
//!
//! ```no_run
//! use coinbase_rest::{CoinbaseClient, Credentials};
//! use rust_decimal::Decimal;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = CoinbaseClient::from_env()?;
//!
//!     let balance = client.balance()?;
//!     println!("Balance: {} {}", balance.amount, balance.currency);
//!
//!     let quote = client.trading().buy_price(Decimal::ONE)?;
//!     println!("1 BTC costs {} {}", quote.amount, quote.currency);
//!
//!     for tx in client.transactions().list(60)? {
//!         println!("{} {} {}", tx.created_at, tx.amount.amount, tx.status);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Errors
//!
//! Every call returns [`RestResult`]. Non-success statuses, malformed bodies,
//! API error payloads, authentication failures and transport failures are
//! distinct [`RestError`] variants; nothing is retried internally.

pub mod client;
pub mod endpoints;
pub mod error;
pub mod oauth;
pub mod response;
pub mod rpc;
pub mod transport;
pub mod types;

// Re-export main types
pub use client::{ClientConfig, CoinbaseClient, DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
pub use error::{ErrorKind, RestError, RestResult};
pub use oauth::OAuthClient;
pub use response::normalize;
pub use rpc::{CoinbaseRpc, NormalizedResult};
pub use transport::{HttpTransport, RawResponse, Transport, TransportError};

// Re-export authentication types
pub use coinbase_auth::{Credentials, Method, NonceSequencer, Params, RequestSigner, SignedRequest};

pub use types::{
    Amount, ButtonRequest, ButtonType, Contact, FeeAmount, OAuthTokens, PaymentButton,
    RecipientType, Transaction, Transfer, TransferFees, User,
};

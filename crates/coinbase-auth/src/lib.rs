//! Authentication and request signing for the Coinbase v1 API
//!
//! This crate turns a method, URL and parameter set into a fully
//! authenticated request envelope. Two mechanisms are supported:
//!
//! - **API key**: HMAC-SHA256 over `nonce + url [+ body]`, sent as the
//!   `ACCESS_KEY`, `ACCESS_SIGNATURE` and `ACCESS_NONCE` headers
//! - **OAuth2**: `Authorization: Bearer <access_token>`
//!
//! # Example
//!
//! ```no_run
//! use coinbase_auth::{Credentials, Method, RequestSigner};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let creds = Credentials::from_env()?;
//!     let signer = RequestSigner::new(creds);
//!
//!     let request = signer.sign(
//!         Method::Get,
//!         "https://coinbase.com/api/v1/account/balance",
//!         None,
//!     )?;
//!     println!("{} {}", request.method, request.url);
//!
//!     Ok(())
//! }
//! ```

mod credentials;
mod error;
mod nonce;
mod signer;

pub use credentials::Credentials;
pub use error::{AuthError, AuthResult};
pub use nonce::{Clock, NonceSequencer, SystemClock, MAX_NONCE_SEED};
pub use signer::{hmac_sha256_hex, Method, Params, RequestSigner, SignedRequest};

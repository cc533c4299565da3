//! Main REST client implementation

use coinbase_auth::{Credentials, Method, NonceSequencer, Params, RequestSigner};
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::info;

use crate::endpoints::{
    AccountEndpoints, ButtonEndpoints, TradingEndpoints, TransactionEndpoints, TransferEndpoints,
    UserEndpoints,
};
use crate::error::{RestError, RestResult};
use crate::rpc::{CoinbaseRpc, NormalizedResult};
use crate::transport::{HttpTransport, Transport};
use crate::types::{Amount, Transaction, Transfer, User};

/// Default API base endpoint
pub const DEFAULT_BASE_URL: &str = "https://coinbase.com/api/v1";

/// Default `User-Agent` header value
pub const DEFAULT_USER_AGENT: &str = concat!("coinbase-rest/", env!("CARGO_PKG_VERSION"));

/// Default request timeout
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Coinbase REST API client
///
/// Every call is authenticated with the credentials given at construction.
///
/// # Example
///
/// ```no_run
/// use coinbase_rest::{CoinbaseClient, Credentials};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let creds = Credentials::api_key("my-key", "my-secret")?;
///     let client = CoinbaseClient::new(creds)?;
///
///     let balance = client.balance()?;
///     println!("{} {}", balance.amount, balance.currency);
///
///     Ok(())
/// }
/// ```
pub struct CoinbaseClient {
    rpc: CoinbaseRpc,
}

impl CoinbaseClient {
    /// Create a client with default settings
    pub fn new(credentials: Credentials) -> RestResult<Self> {
        Self::with_config(ClientConfig::new().with_credentials(credentials))
    }

    /// Create a client from `COINBASE_*` environment variables
    pub fn from_env() -> RestResult<Self> {
        Self::new(Credentials::from_env()?)
    }

    /// Create a client with custom configuration over HTTP
    pub fn with_config(config: ClientConfig) -> RestResult<Self> {
        let transport = HttpTransport::new(Duration::from_secs(config.timeout_secs))?;
        Self::with_transport(config, transport)
    }

    /// Create a client that sends requests through `transport`
    ///
    /// # Errors
    /// [`RestError::Configuration`] if the config carries no credentials or
    /// its nonce seed is outside the signed 64-bit range.
    pub fn with_transport(config: ClientConfig, transport: impl Transport + 'static) -> RestResult<Self> {
        let credentials = config.credentials.ok_or_else(|| {
            RestError::Configuration("Either API key or OAuth credentials are required".to_string())
        })?;

        let nonces = match config.nonce_seed {
            Some(seed) => NonceSequencer::with_seed(seed)?,
            None => NonceSequencer::new(),
        };

        let oauth = credentials.is_oauth();
        let signer = RequestSigner::with_nonces(credentials, nonces).with_user_agent(
            config
                .user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        );

        info!(base_url = %config.base_url, oauth, "Created Coinbase REST client");

        Ok(Self {
            rpc: CoinbaseRpc::new(config.base_url, signer, transport),
        })
    }

    /// Underlying authenticated RPC client
    pub fn rpc(&self) -> &CoinbaseRpc {
        &self.rpc
    }

    /// Perform a raw authenticated call
    pub fn request(&self, method: Method, path: &str, params: Option<&Params>) -> NormalizedResult {
        self.rpc.request(method, path, params)
    }

    // ========================================================================
    // Endpoint Groups
    // ========================================================================

    /// Get account endpoints
    pub fn account(&self) -> AccountEndpoints<'_> {
        AccountEndpoints::new(&self.rpc)
    }

    /// Get trading endpoints
    pub fn trading(&self) -> TradingEndpoints<'_> {
        TradingEndpoints::new(&self.rpc)
    }

    /// Get transaction endpoints
    pub fn transactions(&self) -> TransactionEndpoints<'_> {
        TransactionEndpoints::new(&self.rpc)
    }

    /// Get transfer endpoints
    pub fn transfers(&self) -> TransferEndpoints<'_> {
        TransferEndpoints::new(&self.rpc)
    }

    /// Get user endpoints
    pub fn users(&self) -> UserEndpoints<'_> {
        UserEndpoints::new(&self.rpc)
    }

    /// Get button endpoints
    pub fn buttons(&self) -> ButtonEndpoints<'_> {
        ButtonEndpoints::new(&self.rpc)
    }

    // ========================================================================
    // Shortcuts
    // ========================================================================

    /// Get account balance
    pub fn balance(&self) -> RestResult<Amount> {
        self.account().balance()
    }

    /// Buy bitcoin
    pub fn buy(&self, qty: Decimal, agree_btc_amount_varies: bool) -> RestResult<Transfer> {
        self.trading().buy(qty, agree_btc_amount_varies)
    }

    /// Sell bitcoin
    pub fn sell(&self, qty: Decimal) -> RestResult<Transfer> {
        self.trading().sell(qty)
    }

    /// Send money to an email or bitcoin address
    pub fn send_money(
        &self,
        to: &str,
        amount: Decimal,
        notes: &str,
        currency: &str,
    ) -> RestResult<Transaction> {
        self.transactions().send_money(to, amount, notes, currency)
    }

    /// Get the authenticated user
    pub fn current_user(&self) -> RestResult<User> {
        self.users().current()
    }
}

impl std::fmt::Debug for CoinbaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoinbaseClient")
            .field("base_url", &self.rpc.base_url())
            .field("oauth", &self.rpc.signer().credentials().is_oauth())
            .finish()
    }
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API credentials
    pub credentials: Option<Credentials>,
    /// API base endpoint
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// User agent
    pub user_agent: Option<String>,
    /// Fixed first nonce instead of the current time in microseconds
    pub nonce_seed: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            credentials: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: None,
            nonce_seed: None,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set credentials
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set the API base endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set timeout
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Seed the nonce sequence
    pub fn with_nonce_seed(mut self, seed: u64) -> Self {
        self.nonce_seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_client_config_builder() {
        let config = ClientConfig::new()
            .with_timeout(60)
            .with_user_agent("test-agent")
            .with_base_url("https://sandbox.coinbase.com/api/v1")
            .with_nonce_seed(1000);

        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.user_agent, Some("test-agent".to_string()));
        assert_eq!(config.base_url, "https://sandbox.coinbase.com/api/v1");
        assert_eq!(config.nonce_seed, Some(1000));
        assert!(config.credentials.is_none());
    }

    #[test]
    fn test_missing_credentials_is_configuration_error() {
        let result = CoinbaseClient::with_config(ClientConfig::new());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigurationError);
    }

    #[test]
    fn test_oversized_nonce_seed_is_configuration_error() {
        let config = ClientConfig::new()
            .with_credentials(Credentials::api_key("K", "S").unwrap())
            .with_nonce_seed(u64::MAX);
        let err = CoinbaseClient::with_config(config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigurationError);
    }

    #[test]
    fn test_default_user_agent_names_this_crate() {
        let creds = Credentials::api_key("K", "S").unwrap();
        let client = CoinbaseClient::new(creds).unwrap();
        let request = client
            .rpc()
            .signer()
            .sign(Method::Get, DEFAULT_BASE_URL, None)
            .unwrap();
        assert_eq!(request.header("User-Agent"), Some(DEFAULT_USER_AGENT));
        assert!(DEFAULT_USER_AGENT.starts_with("coinbase-rest/"));
    }

    #[test]
    fn test_client_debug_hides_credentials() {
        let creds = Credentials::api_key("K", "very-secret").unwrap();
        let client = CoinbaseClient::new(creds).unwrap();
        let debug = format!("{:?}", client);
        assert!(!debug.contains("very-secret"));
        assert!(debug.contains(DEFAULT_BASE_URL));
    }
}

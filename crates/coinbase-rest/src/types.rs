//! Types for Coinbase REST API requests and responses

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Amounts
// ============================================================================

/// A monetary amount in some currency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    /// Decimal amount
    pub amount: Decimal,
    /// Currency code (e.g. "BTC", "USD")
    pub currency: String,
}

/// A fee expressed in minor units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeAmount {
    /// Amount in cents
    pub cents: i64,
    /// Currency code
    pub currency_iso: String,
}

impl FeeAmount {
    /// Convert to a decimal amount in major units
    pub fn to_amount(&self) -> Amount {
        Amount {
            amount: Decimal::new(self.cents, 2),
            currency: self.currency_iso.clone(),
        }
    }
}

// ============================================================================
// Contacts & Users
// ============================================================================

/// Counterparty of a transaction, or an address book entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Account holder details
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub time_zone: String,
    pub native_currency: String,
    pub balance: Amount,
    pub buy_level: u32,
    pub sell_level: u32,
    pub buy_limit: Amount,
    pub sell_limit: Amount,
}

// ============================================================================
// Transactions
// ============================================================================

/// Where a transaction's funds went
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipientType {
    /// Another Coinbase user
    Coinbase,
    /// A raw bitcoin address
    Bitcoin,
}

/// A send, receive or money request
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub created_at: DateTime<FixedOffset>,
    #[serde(default)]
    pub notes: Option<String>,
    pub amount: Amount,
    pub status: String,
    /// Whether this is a money request rather than a transfer
    #[serde(default)]
    pub request: bool,
    #[serde(default)]
    pub sender: Option<Contact>,
    #[serde(default)]
    pub recipient: Option<Contact>,
    #[serde(default)]
    pub recipient_address: Option<String>,
}

impl Transaction {
    /// Classify the recipient
    ///
    /// A recipient contact means a Coinbase user; otherwise a bare address
    /// means a bitcoin address.
    pub fn recipient_type(&self) -> Option<RecipientType> {
        if self.recipient.is_some() {
            Some(RecipientType::Coinbase)
        } else if self.recipient_address.is_some() {
            Some(RecipientType::Bitcoin)
        } else {
            None
        }
    }
}

// ============================================================================
// Transfers (buys & sells)
// ============================================================================

/// Fees charged on a transfer
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransferFees {
    pub coinbase: FeeAmount,
    pub bank: FeeAmount,
}

/// A bitcoin buy or sell
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Transfer {
    /// "Buy" or "Sell"
    #[serde(rename = "type")]
    pub transfer_type: String,
    pub code: String,
    pub created_at: DateTime<FixedOffset>,
    pub fees: TransferFees,
    #[serde(default)]
    pub payout_date: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub transaction_id: String,
    pub status: String,
    pub btc: Amount,
    pub subtotal: Amount,
    pub total: Amount,
    #[serde(default)]
    pub description: String,
}

// ============================================================================
// Payment Buttons
// ============================================================================

/// Kind of payment button
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonType {
    #[default]
    BuyNow,
    Donation,
    Subscription,
}

/// Parameters for creating a payment button
///
/// Fields not modelled here (style, text, description, custom, ...) go in
/// `extra` and are sent verbatim.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ButtonRequest {
    pub name: String,
    pub price_string: String,
    pub price_currency_iso: String,
    pub button_type: ButtonType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ButtonRequest {
    /// Create a buy-now button priced in BTC
    pub fn new(name: impl Into<String>, price: Decimal) -> Self {
        Self {
            name: name.into(),
            price_string: price.to_string(),
            price_currency_iso: "BTC".to_string(),
            button_type: ButtonType::BuyNow,
            callback_url: None,
            extra: Map::new(),
        }
    }

    /// Set the price currency
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.price_currency_iso = currency.into();
        self
    }

    /// Set the button type
    pub fn with_type(mut self, button_type: ButtonType) -> Self {
        self.button_type = button_type;
        self
    }

    /// Set the payment notification callback
    pub fn with_callback_url(mut self, url: impl Into<String>) -> Self {
        self.callback_url = Some(url.into());
        self
    }

    /// Set any other documented button field
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// A created payment button
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaymentButton {
    /// Code used to embed the button
    pub code: String,
    #[serde(rename = "type", default)]
    pub button_type: Option<ButtonType>,
    #[serde(default)]
    pub name: Option<String>,
    /// Every other field returned by the API
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ============================================================================
// OAuth
// ============================================================================

/// Tokens returned by the OAuth token endpoint
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct OAuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Access token lifetime in seconds
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl std::fmt::Debug for OAuthTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthTokens")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .finish()
    }
}

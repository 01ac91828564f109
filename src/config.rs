use crate::error::{CheckoutError, Result};
use std::time::Duration;

pub const DEFAULT_POS_API_URL: &str = "http://localhost:5173";
pub const DEFAULT_CURRENCY: &str = "GHS";

/// Runtime settings for a checkout.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// Base URL of the POS backend.
    pub pos_api_url: String,

    /// Public key for the hosted payment UI. `None` makes the gateway unavailable.
    pub payment_public_key: Option<String>,

    /// ISO currency code sent to the gateway.
    pub currency: String,

    /// Timeout applied to every POS request.
    pub request_timeout: Duration,

    /// Upper bound on the payment verification round-trip.
    pub verification_timeout: Duration,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            pos_api_url: DEFAULT_POS_API_URL.to_string(),
            payment_public_key: None,
            currency: DEFAULT_CURRENCY.to_string(),
            request_timeout: Duration::from_secs(10),
            verification_timeout: Duration::from_secs(30),
        }
    }
}

impl CheckoutConfig {
    /// Create config from environment variables.
    ///
    /// - `POS_API_URL`: POS backend base URL (default: `http://localhost:5173`)
    /// - `PAYSTACK_PUBLIC_KEY`: hosted payment public key (optional)
    /// - `CHECKOUT_CURRENCY`: currency code (default: `GHS`)
    /// - `CHECKOUT_HTTP_TIMEOUT`: request timeout in seconds (default: 10)
    /// - `CHECKOUT_VERIFY_TIMEOUT`: verification timeout in seconds (default: 30)
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let request_timeout = secs_from_env("CHECKOUT_HTTP_TIMEOUT")?
            .unwrap_or(defaults.request_timeout);
        let verification_timeout = secs_from_env("CHECKOUT_VERIFY_TIMEOUT")?
            .unwrap_or(defaults.verification_timeout);

        Ok(Self {
            pos_api_url: std::env::var("POS_API_URL").unwrap_or(defaults.pos_api_url),
            payment_public_key: std::env::var("PAYSTACK_PUBLIC_KEY")
                .ok()
                .filter(|key| !key.is_empty()),
            currency: std::env::var("CHECKOUT_CURRENCY").unwrap_or(defaults.currency),
            request_timeout,
            verification_timeout,
        })
    }

    pub fn with_pos_api_url(mut self, url: impl Into<String>) -> Self {
        self.pos_api_url = url.into();
        self
    }

    pub fn with_payment_public_key(mut self, key: impl Into<String>) -> Self {
        self.payment_public_key = Some(key.into());
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_verification_timeout(mut self, timeout: Duration) -> Self {
        self.verification_timeout = timeout;
        self
    }

    /// Endpoint URL joined onto the POS base, tolerating a trailing slash.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.pos_api_url.trim_end_matches('/'), path)
    }
}

fn secs_from_env(name: &str) -> Result<Option<Duration>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(|secs| Some(Duration::from_secs(secs)))
            .map_err(|e| CheckoutError::ConfigError(format!("{name}={raw}: {e}"))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let config = CheckoutConfig::default().with_pos_api_url("https://pos.example.com/");
        assert_eq!(
            config.endpoint("/api/cart"),
            "https://pos.example.com/api/cart"
        );
    }

    #[test]
    fn test_defaults() {
        let config = CheckoutConfig::default();
        assert_eq!(config.currency, "GHS");
        assert!(config.payment_public_key.is_none());
        assert_eq!(config.verification_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_builders() {
        let config = CheckoutConfig::default()
            .with_payment_public_key("pk_test_1")
            .with_currency("USD")
            .with_verification_timeout(Duration::from_millis(50));
        assert_eq!(config.payment_public_key.as_deref(), Some("pk_test_1"));
        assert_eq!(config.currency, "USD");
        assert_eq!(config.verification_timeout, Duration::from_millis(50));
    }
}

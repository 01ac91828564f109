use super::cart::CartItem;
use super::checkout::{Address, CustomerInfo};
use super::money::Money;
use super::pricing::ShippingMethod;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Processing,
    Success,
    Failed,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Processing => write!(f, "processing"),
            PaymentStatus::Success => write!(f, "success"),
            PaymentStatus::Failed => write!(f, "failed"),
        }
    }
}

/// How the hosted payment UI resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayOutcome {
    /// The shopper paid; the gateway handed back its own reference.
    Completed { reference: String },
    /// The shopper dismissed the payment UI.
    Closed,
    /// The gateway could not be reached or loaded.
    Unavailable,
}

/// Backend answer to a verification request.
///
/// Anything other than `Verified` keeps the order blocked.
#[derive(Debug, Clone, PartialEq)]
pub enum Verification {
    Verified { data: serde_json::Value },
    Unverified { message: Option<String> },
    TransportError(String),
}

impl Verification {
    pub fn is_verified(&self) -> bool {
        matches!(self, Verification::Verified { .. })
    }
}

/// Everything the hosted payment UI needs for one attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub reference: String,
    pub email: String,
    pub amount_minor: i64,
    pub currency: String,
    pub customer: CustomerInfo,
    pub shipping_address: Address,
    pub shipping_method: ShippingMethod,
    pub items: Vec<CartItem>,
    pub cart_id: String,
    pub order_total: Money,
}

/// A single try at collecting payment.
///
/// `status` can only become `Success` through [`PaymentAttempt::apply_verification`]
/// with a `Verification::Verified`; a gateway callback alone never gets there.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentAttempt {
    reference: String,
    gateway_reference: Option<String>,
    amount: Money,
    currency: String,
    status: PaymentStatus,
}

impl PaymentAttempt {
    /// Starts an attempt; it is `Processing` from the moment it exists.
    pub fn start(reference: String, amount: Money, currency: impl Into<String>) -> Self {
        Self {
            reference,
            gateway_reference: None,
            amount,
            currency: currency.into(),
            status: PaymentStatus::Processing,
        }
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn gateway_reference(&self) -> Option<&str> {
        self.gateway_reference.as_deref()
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn status(&self) -> PaymentStatus {
        self.status
    }

    /// Records the gateway outcome. Returns the reference to verify, if any.
    ///
    /// Only a `Processing` attempt reacts; the gateway fires at most once.
    pub fn apply_outcome(&mut self, outcome: GatewayOutcome) -> Option<String> {
        if self.status != PaymentStatus::Processing || self.gateway_reference.is_some() {
            return None;
        }
        match outcome {
            GatewayOutcome::Completed { reference } => {
                self.gateway_reference = Some(reference.clone());
                Some(reference)
            }
            GatewayOutcome::Closed => {
                self.status = PaymentStatus::Pending;
                None
            }
            GatewayOutcome::Unavailable => {
                self.status = PaymentStatus::Failed;
                None
            }
        }
    }

    /// Fails an attempt that never reached the gateway.
    pub fn abort(&mut self) -> PaymentStatus {
        if self.status == PaymentStatus::Processing && self.gateway_reference.is_none() {
            self.status = PaymentStatus::Failed;
        }
        self.status
    }

    /// Settles the attempt from the backend's verdict.
    pub fn apply_verification(&mut self, verification: &Verification) -> PaymentStatus {
        if self.status == PaymentStatus::Processing && self.gateway_reference.is_some() {
            self.status = if verification.is_verified() {
                PaymentStatus::Success
            } else {
                PaymentStatus::Failed
            };
        }
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn attempt() -> PaymentAttempt {
        PaymentAttempt::start("TXN_1_abc".to_string(), Money::new(dec!(49.99)), "GHS")
    }

    #[test]
    fn test_attempt_starts_processing() {
        let attempt = attempt();
        assert_eq!(attempt.status(), PaymentStatus::Processing);
        assert_eq!(attempt.currency(), "GHS");
        assert!(attempt.gateway_reference().is_none());
    }

    #[test]
    fn test_closed_reverts_to_pending() {
        let mut attempt = attempt();
        assert_eq!(attempt.apply_outcome(GatewayOutcome::Closed), None);
        assert_eq!(attempt.status(), PaymentStatus::Pending);
    }

    #[test]
    fn test_unavailable_fails() {
        let mut attempt = attempt();
        assert_eq!(attempt.apply_outcome(GatewayOutcome::Unavailable), None);
        assert_eq!(attempt.status(), PaymentStatus::Failed);
    }

    #[test]
    fn test_completed_stays_processing_until_verified() {
        let mut attempt = attempt();
        let reference = attempt.apply_outcome(GatewayOutcome::Completed {
            reference: "TXN_456".to_string(),
        });
        assert_eq!(reference.as_deref(), Some("TXN_456"));
        assert_eq!(attempt.status(), PaymentStatus::Processing);

        let status = attempt.apply_verification(&Verification::Verified {
            data: serde_json::json!({"amount": 4999}),
        });
        assert_eq!(status, PaymentStatus::Success);
    }

    #[test]
    fn test_unverified_and_transport_errors_fail_closed() {
        for verdict in [
            Verification::Unverified { message: None },
            Verification::TransportError("timeout".to_string()),
        ] {
            let mut attempt = attempt();
            attempt.apply_outcome(GatewayOutcome::Completed {
                reference: "TXN_123".to_string(),
            });
            assert_eq!(attempt.apply_verification(&verdict), PaymentStatus::Failed);
        }
    }

    #[test]
    fn test_verification_without_callback_is_ignored() {
        let mut attempt = attempt();
        let status = attempt.apply_verification(&Verification::Verified {
            data: serde_json::Value::Null,
        });
        assert_eq!(status, PaymentStatus::Processing);
    }

    #[test]
    fn test_abort_only_before_callback() {
        let mut attempt = attempt();
        assert_eq!(attempt.abort(), PaymentStatus::Failed);

        let mut called_back = self::attempt();
        called_back.apply_outcome(GatewayOutcome::Completed {
            reference: "TXN_456".to_string(),
        });
        assert_eq!(called_back.abort(), PaymentStatus::Processing);
    }

    #[test]
    fn test_gateway_fires_once() {
        let mut attempt = attempt();
        attempt.apply_outcome(GatewayOutcome::Completed {
            reference: "A".to_string(),
        });
        assert_eq!(attempt.apply_outcome(GatewayOutcome::Closed), None);
        assert_eq!(attempt.gateway_reference(), Some("A"));
        assert_eq!(attempt.status(), PaymentStatus::Processing);
    }
}

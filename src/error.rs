use crate::domain::checkout::StepError;
use crate::domain::money::Money;
use crate::domain::payment::PaymentStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    ValidationError(#[from] StepError),
    #[error("Backend error ({status}): {message}")]
    BackendError { status: u16, message: String },
    #[error("Cart is empty or unavailable")]
    EmptyCart,
    #[error("A payment attempt is already in progress")]
    PaymentInProgress,
    #[error("Payment not completed (status: {0})")]
    PaymentNotCompleted(PaymentStatus),
    #[error("Order total {due} differs from the verified payment of {paid}")]
    PaymentAmountChanged { paid: Money, due: Money },
    #[error("Order {0} has already been confirmed")]
    AlreadyConfirmed(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, CheckoutError>;

use super::payment::{PaymentAttempt, PaymentStatus};
use super::pricing::ShippingMethod;
use crate::error::{CheckoutError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

impl CustomerInfo {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

impl Default for Address {
    fn default() -> Self {
        Self {
            address: String::new(),
            city: String::new(),
            state: String::new(),
            zip_code: String::new(),
            country: "US".to_string(),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {} {}",
            self.address, self.city, self.state, self.zip_code
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    CustomerInfo,
    Shipping,
    Payment,
    Review,
}

impl Step {
    pub fn number(&self) -> u8 {
        match self {
            Step::CustomerInfo => 1,
            Step::Shipping => 2,
            Step::Payment => 3,
            Step::Review => 4,
        }
    }

    fn following(&self) -> Option<Step> {
        match self {
            Step::CustomerInfo => Some(Step::Shipping),
            Step::Shipping => Some(Step::Payment),
            Step::Payment => Some(Step::Review),
            Step::Review => None,
        }
    }

    fn preceding(&self) -> Option<Step> {
        match self {
            Step::CustomerInfo => None,
            Step::Shipping => Some(Step::CustomerInfo),
            Step::Payment => Some(Step::Shipping),
            Step::Review => Some(Step::Payment),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StepError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("payment has not been verified")]
    PaymentNotVerified,
    #[error("already on the last step")]
    LastStep,
    #[error("payment is only available from the payment step")]
    PaymentStepNotReached,
}

fn require(value: &str, field: &'static str) -> std::result::Result<(), StepError> {
    if value.is_empty() {
        Err(StepError::MissingField(field))
    } else {
        Ok(())
    }
}

/// In-memory state of one checkout visit.
///
/// Form fields are public and freely edited by the front-end. The current step
/// and the payment attempt only move through the methods below, which enforce
/// the step gates.
#[derive(Debug, Clone, Default)]
pub struct CheckoutSession {
    pub customer: CustomerInfo,
    pub shipping_address: Address,
    pub billing_address: Address,
    pub same_as_shipping: bool,
    pub shipping_method: ShippingMethod,
    step: Step,
    attempt: Option<PaymentAttempt>,
}

impl CheckoutSession {
    pub fn new() -> Self {
        Self {
            same_as_shipping: true,
            ..Self::default()
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn attempt(&self) -> Option<&PaymentAttempt> {
        self.attempt.as_ref()
    }

    pub(crate) fn attempt_mut(&mut self) -> Option<&mut PaymentAttempt> {
        self.attempt.as_mut()
    }

    pub fn payment_status(&self) -> PaymentStatus {
        self.attempt
            .as_ref()
            .map(PaymentAttempt::status)
            .unwrap_or_default()
    }

    /// The billing address in effect, honoring the "same as shipping" flag.
    pub fn effective_billing_address(&self) -> &Address {
        if self.same_as_shipping {
            &self.shipping_address
        } else {
            &self.billing_address
        }
    }

    /// Checks the gate for leaving `step`. Pure: reads form state only.
    pub fn validate_step(&self, step: Step) -> std::result::Result<(), StepError> {
        match step {
            Step::CustomerInfo => {
                require(&self.customer.first_name, "firstName")?;
                require(&self.customer.last_name, "lastName")?;
                require(&self.customer.email, "email")?;
                require(&self.customer.phone, "phone")
            }
            Step::Shipping => {
                require(&self.shipping_address.address, "address")?;
                require(&self.shipping_address.city, "city")?;
                require(&self.shipping_address.state, "state")?;
                require(&self.shipping_address.zip_code, "zipCode")
            }
            Step::Payment => {
                if self.payment_status() == PaymentStatus::Success {
                    Ok(())
                } else {
                    Err(StepError::PaymentNotVerified)
                }
            }
            Step::Review => Ok(()),
        }
    }

    pub fn is_step_valid(&self, step: Step) -> bool {
        self.validate_step(step).is_ok()
    }

    /// Validates both form steps that must be complete before paying.
    pub fn validate_details(&self) -> std::result::Result<(), StepError> {
        self.validate_step(Step::CustomerInfo)?;
        self.validate_step(Step::Shipping)
    }

    pub fn next(&mut self) -> std::result::Result<Step, StepError> {
        let target = self.step.following().ok_or(StepError::LastStep)?;
        self.validate_step(self.step)?;
        self.step = target;
        Ok(self.step)
    }

    /// Moves back one step. Form data and payment state are kept.
    pub fn previous(&mut self) -> Step {
        if let Some(step) = self.step.preceding() {
            self.step = step;
        }
        self.step
    }

    /// The confirm action on the review step.
    pub fn confirm_enabled(&self) -> bool {
        self.step == Step::Review && self.payment_status() == PaymentStatus::Success
    }

    /// Payment runs from the payment step, or from review on a retry.
    pub fn ensure_payment_step(&self) -> std::result::Result<(), StepError> {
        match self.step {
            Step::Payment | Step::Review => Ok(()),
            _ => Err(StepError::PaymentStepNotReached),
        }
    }

    /// Opens a new payment attempt, refusing while another is in flight.
    pub(crate) fn start_attempt(&mut self, attempt: PaymentAttempt) -> Result<&mut PaymentAttempt> {
        match self.payment_status() {
            PaymentStatus::Processing => Err(CheckoutError::PaymentInProgress),
            _ => Ok(self.attempt.insert(attempt)),
        }
    }

    /// Jumps to review once payment is verified; no-op otherwise.
    pub(crate) fn advance_to_review(&mut self) {
        if self.payment_status() == PaymentStatus::Success {
            self.step = Step::Review;
        }
    }
}

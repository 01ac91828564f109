use super::cart::{Cart, CartOwner};
use super::order::OrderDraft;
use super::payment::{GatewayOutcome, PaymentRequest, Verification};
use super::pricing::TaxConfig;
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait CartService: Send + Sync {
    /// Returns `None` when the backend has no cart for this owner.
    async fn fetch(&self, owner: &CartOwner) -> Result<Option<Cart>>;
    async fn clear(&self, owner: &CartOwner) -> Result<()>;
}

#[async_trait]
pub trait TaxConfigSource: Send + Sync {
    async fn tax_configuration(&self) -> Result<TaxConfig>;
}

/// Hosted payment UI. Resolves the success/close callbacks into one outcome.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn initiate(&self, request: &PaymentRequest) -> GatewayOutcome;
}

/// Backend confirmation of a gateway reference. Must fail closed.
#[async_trait]
pub trait PaymentVerifier: Send + Sync {
    async fn verify(&self, reference: &str, session_id: &str) -> Verification;
}

#[async_trait]
pub trait OrderService: Send + Sync {
    async fn create(&self, draft: &OrderDraft) -> Result<()>;
}

pub type CartServiceBox = Box<dyn CartService>;
pub type TaxConfigSourceBox = Box<dyn TaxConfigSource>;
pub type PaymentGatewayBox = Box<dyn PaymentGateway>;
pub type PaymentVerifierBox = Box<dyn PaymentVerifier>;
pub type OrderServiceBox = Box<dyn OrderService>;

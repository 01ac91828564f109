#![allow(dead_code)]

use rust_decimal::Decimal;
use shophub_checkout::application::checkout::{CheckoutOrchestrator, Collaborators};
use shophub_checkout::config::CheckoutConfig;
use shophub_checkout::domain::cart::{Cart, CartItem, CartOwner};
use shophub_checkout::domain::checkout::{Address, CustomerInfo};
use shophub_checkout::domain::money::Money;
use shophub_checkout::domain::payment::GatewayOutcome;
use shophub_checkout::domain::pricing::TaxConfig;
use shophub_checkout::error::Result;
use shophub_checkout::infrastructure::in_memory::{
    InMemoryCartService, InMemoryOrderService, ScriptedGateway, StaticTaxConfig, StaticVerifier,
};

pub const SESSION_ID: &str = "guest_1718000000000_k3j9x0a1b";

pub fn owner() -> CartOwner {
    CartOwner::guest(SESSION_ID)
}

pub fn item(id: &str, quantity: u32, unit_price: Decimal) -> CartItem {
    CartItem {
        product_id: id.to_string(),
        name: format!("Product {id}"),
        quantity,
        unit_price: Money::new(unit_price),
    }
}

pub fn customer() -> CustomerInfo {
    CustomerInfo {
        first_name: "Ama".to_string(),
        last_name: "Mensah".to_string(),
        email: "ama@example.com".to_string(),
        phone: "0551234987".to_string(),
    }
}

pub fn shipping_address() -> Address {
    Address {
        address: "12 Ring Road".to_string(),
        city: "Accra".to_string(),
        state: "Greater Accra".to_string(),
        zip_code: "00233".to_string(),
        country: "GH".to_string(),
    }
}

/// In-memory collaborators with handles kept for assertions.
#[derive(Clone, Default)]
pub struct Backend {
    pub carts: InMemoryCartService,
    pub gateway: ScriptedGateway,
    pub verifier: StaticVerifier,
    pub orders: InMemoryOrderService,
    pub tax: StaticTaxConfig,
}

impl Backend {
    pub async fn with_cart(items: Vec<CartItem>) -> Self {
        let backend = Self {
            tax: StaticTaxConfig::new(TaxConfig::disabled()),
            ..Self::default()
        };
        backend
            .carts
            .insert(&owner(), Cart::new("cart-1", items))
            .await;
        backend
    }

    pub fn with_tax(mut self, tax: StaticTaxConfig) -> Self {
        self.tax = tax;
        self
    }

    pub async fn script(&self, outcomes: impl IntoIterator<Item = GatewayOutcome>) {
        for outcome in outcomes {
            self.gateway.push(outcome).await;
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            carts: Box::new(self.carts.clone()),
            taxes: Box::new(self.tax.clone()),
            gateway: Box::new(self.gateway.clone()),
            verifier: Box::new(self.verifier.clone()),
            orders: Box::new(self.orders.clone()),
        }
    }

    pub async fn begin(&self) -> Result<CheckoutOrchestrator> {
        self.begin_with(CheckoutConfig::default()).await
    }

    pub async fn begin_with(&self, config: CheckoutConfig) -> Result<CheckoutOrchestrator> {
        CheckoutOrchestrator::begin(owner(), self.collaborators(), config).await
    }
}

/// Fills the form and walks to the payment step.
pub fn reach_payment(checkout: &mut CheckoutOrchestrator) {
    let session = checkout.session_mut();
    session.customer = customer();
    session.shipping_address = shipping_address();
    checkout.next().unwrap();
    checkout.next().unwrap();
}

use super::cart::CartItem;
use super::checkout::{Address, CustomerInfo};
use super::money::Money;
use super::pricing::{ShippingMethod, Totals};
use serde::Serialize;

/// Order payload handed to the order service once payment is verified.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub order_id: String,
    pub payment_reference: String,
    pub currency: String,
    pub customer: CustomerInfo,
    pub shipping_address: Address,
    pub billing_address: Address,
    pub shipping_method: ShippingMethod,
    pub items: Vec<CartItem>,
    pub totals: Totals,
    pub source: &'static str,
}

/// What the shopper sees after a successful checkout.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    pub order_id: String,
    pub payment_reference: String,
    pub total: Money,
    /// `false` when the post-order cart clear failed; the order still stands.
    pub cart_cleared: bool,
}

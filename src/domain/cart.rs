use super::money::Money;
use serde::{Deserialize, Serialize};

/// Identifies whose cart is being checked out.
///
/// The session id is always present (guest carts are keyed by it and the
/// payment backend uses it to correlate verification with the cart). A user id
/// is attached when the shopper is signed in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartOwner {
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl CartOwner {
    pub fn guest(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            user_id: None,
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    /// Unit price captured when the item was added.
    pub unit_price: Money,
}

impl CartItem {
    pub fn line_total(&self) -> Money {
        self.unit_price * self.quantity
    }
}

/// Snapshot of the shopper's cart as returned by the cart service.
///
/// Counts and totals are always derived from the line items; the backend's
/// cached `totalAmount` is never trusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub id: String,
    pub items: Vec<CartItem>,
}

impl Cart {
    pub fn new(id: impl Into<String>, items: Vec<CartItem>) -> Self {
        Self {
            id: id.into(),
            items,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.iter().all(|item| item.quantity == 0)
    }

    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    pub fn subtotal(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(id: &str, quantity: u32, unit: rust_decimal::Decimal) -> CartItem {
        CartItem {
            product_id: id.to_string(),
            name: format!("Product {id}"),
            quantity,
            unit_price: Money::new(unit),
        }
    }

    #[test]
    fn test_totals_derived_from_items() {
        let cart = Cart::new(
            "c1",
            vec![item("p1", 2, dec!(12.50)), item("p2", 1, dec!(15.00))],
        );
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.subtotal(), Money::new(dec!(40.00)));
        assert!(!cart.is_empty());
    }

    #[test]
    fn test_empty_cart() {
        assert!(Cart::new("c1", vec![]).is_empty());
        assert!(Cart::new("c1", vec![item("p1", 0, dec!(1))]).is_empty());
        assert_eq!(Cart::new("c1", vec![]).subtotal(), Money::ZERO);
    }

    #[test]
    fn test_owner_builder() {
        let owner = CartOwner::guest("guest_1_abc").with_user("u-7");
        assert_eq!(owner.session_id, "guest_1_abc");
        assert_eq!(owner.user_id.as_deref(), Some("u-7"));
    }
}

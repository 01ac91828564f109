use super::money::Money;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Orders strictly above this subtotal ship for free with the standard method.
pub const FREE_SHIPPING_THRESHOLD: Money = Money(dec!(50));
pub const STANDARD_SHIPPING: Money = Money(dec!(9.99));
pub const EXPRESS_SHIPPING: Money = Money(dec!(15.99));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShippingMethod {
    #[default]
    Standard,
    Express,
}

impl ShippingMethod {
    pub fn cost(&self, subtotal: Money) -> Money {
        match self {
            ShippingMethod::Express => EXPRESS_SHIPPING,
            ShippingMethod::Standard if subtotal > FREE_SHIPPING_THRESHOLD => Money::ZERO,
            ShippingMethod::Standard => STANDARD_SHIPPING,
        }
    }
}

impl fmt::Display for ShippingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShippingMethod::Standard => write!(f, "standard"),
            ShippingMethod::Express => write!(f, "express"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxKind {
    #[default]
    Percentage,
    Fixed,
}

/// Store tax settings.
///
/// For `Percentage` the rate is a fraction of the subtotal (`0.08` is 8%);
/// for `Fixed` it is an absolute amount added once per order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxConfig {
    pub rate: Decimal,
    pub kind: TaxKind,
    pub name: String,
}

impl Default for TaxConfig {
    fn default() -> Self {
        Self::disabled()
    }
}

impl TaxConfig {
    pub fn disabled() -> Self {
        Self {
            rate: Decimal::ZERO,
            kind: TaxKind::Percentage,
            name: "Tax".to_string(),
        }
    }

    pub fn enabled(&self) -> bool {
        self.rate > Decimal::ZERO
    }

    pub fn tax_for(&self, subtotal: Money) -> Money {
        if !self.enabled() {
            return Money::ZERO;
        }
        match self.kind {
            TaxKind::Fixed => Money::new(self.rate),
            TaxKind::Percentage => subtotal * self.rate,
        }
    }

    /// Line label, e.g. `VAT (12.5%)` or `Levy`.
    pub fn label(&self) -> String {
        match self.kind {
            TaxKind::Percentage => format!(
                "{} ({:.1}%)",
                self.name,
                self.rate * Decimal::ONE_HUNDRED
            ),
            TaxKind::Fixed => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Totals {
    pub subtotal: Money,
    pub shipping: Money,
    pub tax: Money,
    pub total: Money,
}

impl Totals {
    pub fn compute(subtotal: Money, method: ShippingMethod, tax: &TaxConfig) -> Self {
        let shipping = method.cost(subtotal);
        let tax = tax.tax_for(subtotal);
        Self {
            subtotal,
            shipping,
            tax,
            total: subtotal + shipping + tax,
        }
    }
}

use crate::domain::checkout::{Address, CheckoutSession, CustomerInfo};
use crate::domain::pricing::ShippingMethod;
use crate::error::Result;
use serde::Deserialize;
use std::io::Read;

/// Checkout details supplied up front, as the web form would collect them.
///
/// ```json
/// {
///   "customer": { "firstName": "Ama", "lastName": "Mensah", "email": "ama@example.com", "phone": "0551234987" },
///   "shippingAddress": { "address": "12 Ring Road", "city": "Accra", "state": "Greater Accra", "zipCode": "00233" },
///   "shippingMethod": "express"
/// }
/// ```
///
/// Omitting `billingAddress` means billing equals shipping.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckoutForm {
    pub customer: CustomerInfo,
    pub shipping_address: Address,
    pub billing_address: Option<Address>,
    pub shipping_method: ShippingMethod,
}

impl CheckoutForm {
    pub fn from_reader<R: Read>(source: R) -> Result<Self> {
        Ok(serde_json::from_reader(source)?)
    }

    /// Copies the form into a session without touching its step or payment.
    pub fn apply(&self, session: &mut CheckoutSession) {
        session.customer = self.customer.clone();
        session.shipping_address = self.shipping_address.clone();
        session.shipping_method = self.shipping_method;
        match &self.billing_address {
            Some(billing) => {
                session.same_as_shipping = false;
                session.billing_address = billing.clone();
            }
            None => session.same_as_shipping = true,
        }
    }
}

//! Checkout domain: value objects, the checkout state machine and the ports
//! the application layer talks to.

pub mod cart;
pub mod checkout;
pub mod identifiers;
pub mod money;
pub mod order;
pub mod payment;
pub mod ports;
pub mod pricing;

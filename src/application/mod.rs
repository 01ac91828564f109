//! Application layer containing the checkout orchestration.
//!
//! `CheckoutOrchestrator` composes the cart, tax, gateway, verifier and order
//! ports and sequences them so that an order is only confirmed after the
//! backend verified the payment.

pub mod checkout;

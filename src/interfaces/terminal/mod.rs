//! Terminal front-end: a JSON checkout form and a stdin-driven stand-in for
//! the hosted payment UI.

pub mod form;
pub mod gateway;

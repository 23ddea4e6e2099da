//! Hanbit Core - checkout domain library.
//!
//! This crate holds everything about a marketplace checkout that does not
//! touch the network: money, the cart, the step-by-step checkout state
//! machine and the order pricing calculator. The storefront crate drives it
//! from HTTP handlers and keeps the state in the buyer's session.
//!
//! # Modules
//!
//! - [`types`] - Money, ids and email
//! - [`checkout`] - Cart, buyer details, the checkout reducer and form validation
//! - [`pricing`] - Subtotal, shipping, customs and converted totals

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod checkout;
pub mod pricing;
pub mod types;

pub use checkout::*;
pub use pricing::{OrderSummary, PricingError, PricingTable, ShippingQuote};
pub use types::*;

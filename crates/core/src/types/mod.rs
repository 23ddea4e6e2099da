//! Value types shared across Hanbit crates.

pub mod email;
pub mod id;
pub mod money;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::{CurrencyCode, Money, MoneyError};

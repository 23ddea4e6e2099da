//! Session-related types.
//!
//! The checkout itself is stored whole under [`keys::CHECKOUT`]; the
//! serialized [`hanbit_core::CheckoutState`] is the only session data.

/// Session keys for checkout data.
pub mod keys {
    /// Key for the buyer's checkout state.
    pub const CHECKOUT: &str = "checkout";
}

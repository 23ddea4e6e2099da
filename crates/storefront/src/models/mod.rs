//! Storefront-side models.
//!
//! Domain types live in `hanbit-core`; this module only holds what is
//! specific to the web layer.

pub mod session;

pub use session::keys as session_keys;

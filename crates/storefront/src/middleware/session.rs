//! Session middleware configuration.
//!
//! Checkouts are held in an in-memory tower-sessions store. A restart drops
//! every open checkout, which is acceptable while orders live in the order
//! backend and carts are seeded.

use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "hanbit_session";

/// Abandoned checkouts expire after 30 minutes without a request.
const SESSION_INACTIVITY_SECONDS: i64 = 30 * 60;

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_INACTIVITY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

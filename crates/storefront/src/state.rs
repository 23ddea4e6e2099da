//! Application state shared across handlers.

use std::sync::Arc;

use hanbit_core::{Cart, PricingTable};

use crate::config::StorefrontConfig;
use crate::services::{OrderError, OrderGateway, SeedCart, SeedCartError};

/// Error creating the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("order gateway: {0}")]
    Orders(#[from] OrderError),
    #[error("seed cart: {0}")]
    SeedCart(#[from] SeedCartError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// configuration, the order gateway and the seed cart.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    orders: OrderGateway,
    seed_cart: SeedCart,
}

impl AppState {
    /// Create a new application state from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the order client cannot be built or the seed cart
    /// file cannot be loaded.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let orders = OrderGateway::from_config(&config.orders)?;
        let seed_cart = SeedCart::from_path(config.seed_cart_path.as_deref())?;
        Ok(Self::with_services(config, orders, seed_cart))
    }

    /// Create state around an explicit gateway and seed cart.
    #[must_use]
    pub fn with_services(config: StorefrontConfig, orders: OrderGateway, seed_cart: SeedCart) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                orders,
                seed_cart,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Shipping, customs and exchange rates.
    #[must_use]
    pub fn pricing(&self) -> &PricingTable {
        &self.inner.config.pricing
    }

    /// Get a reference to the order gateway.
    #[must_use]
    pub fn orders(&self) -> &OrderGateway {
        &self.inner.orders
    }

    /// The cart a new checkout starts with.
    #[must_use]
    pub fn fresh_cart(&self) -> Cart {
        self.inner.seed_cart.cart()
    }
}

//! Services the checkout talks to outside the request/response cycle.
//!
//! # Services
//!
//! - `orders` - Order submission (HTTP order backend or simulated)
//! - `cart_seed` - Initial cart contents for new checkouts

pub mod cart_seed;
pub mod orders;

pub use cart_seed::{SeedCart, SeedCartError};
pub use orders::{HttpOrderClient, OrderError, OrderGateway, OrderRequest, SimulatedOrderClient};

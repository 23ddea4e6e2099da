//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness check
//!
//! # Checkout (state held in the session)
//! GET  /checkout                    - Active step page with order summary
//! GET  /checkout/summary            - Order summary fragment (HTMX)
//! POST /checkout/cart/increment     - Add one to a line (form: item_id)
//! POST /checkout/cart/decrement     - Take one from a line, never below one
//! POST /checkout/cart/remove        - Remove a line
//! POST /checkout/cart/continue      - Leave the cart (rejected when empty)
//! POST /checkout/contact            - Contact form
//! POST /checkout/shipping           - Shipping address form
//! POST /checkout/delivery           - Shipping method (intent=select stays)
//! POST /checkout/payment            - Payment method (intent=select shows its sub-form)
//! POST /checkout/back               - Previous step
//! POST /checkout/edit/{step}        - Jump from review to contact..payment
//! POST /checkout/terms              - Save the terms checkbox without ordering
//! POST /checkout/place-order        - Submit the order (form: accept_terms)
//! POST /checkout/new                - Discard and start a fresh checkout
//! ```
//!
//! Accepted POSTs answer `303 See Other` to `/checkout`. Rejected forms
//! re-render with `422`; actions the current step does not allow get `409`.

pub mod checkout;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart step routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/increment", post(checkout::cart::increment))
        .route("/decrement", post(checkout::cart::decrement))
        .route("/remove", post(checkout::cart::remove))
        .route("/continue", post(checkout::cart::proceed))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show))
        .route("/summary", get(checkout::summary))
        .nest("/cart", cart_routes())
        .route("/contact", post(checkout::forms::contact))
        .route("/shipping", post(checkout::forms::shipping))
        .route("/delivery", post(checkout::forms::delivery))
        .route("/payment", post(checkout::forms::payment))
        .route("/back", post(checkout::back))
        .route("/edit/{step}", post(checkout::edit))
        .route("/terms", post(checkout::terms))
        .route("/place-order", post(checkout::order::place_order))
        .route("/new", post(checkout::start_new))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/", get(|| async { axum::response::Redirect::to("/checkout") }))
        .nest("/checkout", checkout_routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Holds no dependencies to check.
pub async fn health() -> &'static str {
    "ok"
}

//! Cart step handlers.
//!
//! Quantity changes stay on the cart step; decrement stops at one and only
//! "Remove" takes a line out.

use axum::{Form, extract::State, response::Response};
use hanbit_core::{Action, CartItemId};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::dispatch;
use crate::error::Result;
use crate::state::AppState;

/// Form data naming one cart line.
#[derive(Debug, Deserialize)]
pub struct CartLineForm {
    pub item_id: CartItemId,
}

/// Add one to a line's quantity.
#[instrument(skip(state, session))]
pub async fn increment(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CartLineForm>,
) -> Result<Response> {
    dispatch(&state, &session, Action::IncrementItem(form.item_id)).await
}

/// Take one from a line's quantity, never below one.
#[instrument(skip(state, session))]
pub async fn decrement(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CartLineForm>,
) -> Result<Response> {
    dispatch(&state, &session, Action::DecrementItem(form.item_id)).await
}

/// Remove a line entirely.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CartLineForm>,
) -> Result<Response> {
    dispatch(&state, &session, Action::RemoveItem(form.item_id)).await
}

/// Leave the cart for the contact step. Rejected while the cart is empty.
#[instrument(skip(state, session))]
pub async fn proceed(State(state): State<AppState>, session: Session) -> Result<Response> {
    dispatch(&state, &session, Action::ContinueFromCart).await
}

//! Place-order handler.
//!
//! The terms checkbox is part of the place-order form, so what the buyer
//! sees ticked is what the order is placed with.
//!
//! The checkout is marked as submitting and saved before the order backend
//! is called, so a second tab or a double click sees the lock. The backend
//! call runs in its own task that always records the outcome in the session,
//! even if the buyer's request is abandoned mid-flight.

use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use hanbit_core::{Action, CheckoutState, TermsInput};
use tower_sessions::Session;
use tracing::instrument;

use super::{CHECKOUT_PATH, load, store};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::services::OrderRequest;
use crate::state::AppState;

/// Place the order shown on the review step.
#[instrument(skip(state, session))]
pub async fn place_order(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<TermsInput>,
) -> Result<Response> {
    let mut checkout = load(&state, &session).await?;
    checkout.apply(Action::SetTermsAccepted(form.accept_terms))?;
    if let Err(e) = checkout.apply(Action::BeginSubmission { at: Utc::now() }) {
        // keep the checkbox as the buyer left it
        store(&session, &checkout).await?;
        return Err(e.into());
    }
    let order = OrderRequest::from_checkout(&checkout, state.pricing())?;

    store(&session, &checkout).await?;
    session.save().await?;
    add_breadcrumb("checkout", "place order", None);

    let task = tokio::spawn(submit(state.clone(), session.clone(), order));
    task.await
        .map_err(|e| AppError::Internal(format!("order submission task failed: {e}")))??;

    Ok(Redirect::to(CHECKOUT_PATH).into_response())
}

/// Send the order and record how it went.
///
/// A backend failure is a normal outcome: it is stored on the checkout for
/// the review page to show, not returned as an error.
async fn submit(state: AppState, session: Session, order: OrderRequest) -> Result<()> {
    let gateway = state.orders().kind();
    let total = order.summary.display_total.display();

    let action = match state.orders().submit(&order).await {
        Ok(reference) => {
            tracing::info!(
                order_reference = %reference,
                gateway,
                total = %total,
                "Order placed"
            );
            Action::SubmissionSucceeded(order.confirm(reference))
        }
        Err(e) => {
            let failure = e.to_submission_error();
            tracing::warn!(
                error = %e,
                kind = ?failure.kind,
                gateway,
                "Order submission failed"
            );
            Action::SubmissionFailed(failure)
        }
    };

    let mut checkout: CheckoutState = load(&state, &session).await?;
    checkout.apply(action)?;
    store(&session, &checkout).await?;
    session.save().await?;
    Ok(())
}

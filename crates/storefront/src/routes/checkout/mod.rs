//! Checkout route handlers.
//!
//! The whole checkout lives in the session as one [`CheckoutState`]. Every
//! POST loads it, applies exactly one reducer [`Action`], stores it back and
//! redirects to `GET /checkout`, which renders whichever step is active.
//! Form steps that fail validation re-render in place with a 422 instead.

pub mod cart;
pub mod forms;
pub mod order;
pub mod views;

use std::time::Duration;

use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::{DateTime, TimeDelta, Utc};
use hanbit_core::{
    Action, CheckoutState, Step, SubmissionError, SubmissionErrorKind, TermsInput,
};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::models::session_keys;
use crate::state::AppState;

pub use views::render_page;

/// Where every successful checkout POST sends the buyer.
pub const CHECKOUT_PATH: &str = "/checkout";

/// Time allowed past the order backend's own limit before a submission
/// lock counts as stale.
const SUBMISSION_GRACE: Duration = Duration::from_secs(30);

const STALE_SUBMISSION_MESSAGE: &str =
    "We could not confirm your order in time. Please check your email before trying again.";

// =============================================================================
// Session Helpers
// =============================================================================

/// Release a submission whose outcome never arrived, as a network failure.
///
/// Returns whether the checkout changed.
fn release_stale_submission(
    checkout: &mut CheckoutState,
    now: DateTime<Utc>,
    limit: Duration,
) -> bool {
    let limit = TimeDelta::from_std(limit).unwrap_or(TimeDelta::MAX);
    if !checkout.is_submission_stale(now, limit) {
        return false;
    }
    checkout
        .apply(Action::SubmissionFailed(SubmissionError::new(
            SubmissionErrorKind::Network,
            STALE_SUBMISSION_MESSAGE,
        )))
        .is_ok()
}

/// The checkout stored in the session, if any.
async fn stored(state: &AppState, session: &Session) -> Result<Option<CheckoutState>> {
    let Some(mut checkout) = session.get::<CheckoutState>(session_keys::CHECKOUT).await? else {
        return Ok(None);
    };

    let limit = state.orders().max_latency().saturating_add(SUBMISSION_GRACE);
    if release_stale_submission(&mut checkout, Utc::now(), limit) {
        tracing::warn!(
            gateway = state.orders().kind(),
            "Released stale order submission"
        );
        store(session, &checkout).await?;
    }
    Ok(Some(checkout))
}

/// Load the buyer's checkout, starting a fresh one from the seed cart if the
/// session has none (new visitor or expired session).
async fn load(state: &AppState, session: &Session) -> Result<CheckoutState> {
    let checkout = stored(state, session)
        .await?
        .unwrap_or_else(|| CheckoutState::new(state.fresh_cart()));
    Ok(checkout)
}

/// Persist the checkout in the session.
async fn store(session: &Session, checkout: &CheckoutState) -> Result<()> {
    session.insert(session_keys::CHECKOUT, checkout).await?;
    Ok(())
}

/// Apply one action to the stored checkout and redirect to the active step.
///
/// A rejected action leaves the stored checkout untouched.
async fn dispatch(state: &AppState, session: &Session, action: Action) -> Result<Response> {
    let mut checkout = load(state, session).await?;
    let from = checkout.step();
    let name = action.name();

    let to = checkout.apply(action)?;
    store(session, &checkout).await?;

    tracing::info!(action = name, from = %from, to = %to, "Checkout action applied");
    add_breadcrumb("checkout", name, Some(&[("from", from.as_str()), ("to", to.as_str())]));

    Ok(Redirect::to(CHECKOUT_PATH).into_response())
}

// =============================================================================
// Route Handlers
// =============================================================================

/// Display the active checkout step.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Response> {
    // Only a new checkout is written here; rewriting an existing one could
    // race with an order submission finishing in the background.
    let checkout = match stored(&state, &session).await? {
        Some(checkout) => checkout,
        None => {
            let checkout = CheckoutState::new(state.fresh_cart());
            store(&session, &checkout).await?;
            checkout
        }
    };
    tracing::debug!(step = %checkout.step(), "Rendering checkout step");
    render_page(&checkout, state.pricing(), None)
}

/// Order summary fragment (HTMX).
#[instrument(skip(state, session))]
pub async fn summary(
    State(state): State<AppState>,
    session: Session,
) -> Result<views::SummaryFragment> {
    let checkout = load(&state, &session).await?;
    Ok(views::SummaryFragment {
        summary: views::SummaryView::new(&checkout.summary(state.pricing())?, state.pricing()),
    })
}

/// Go back one step.
#[instrument(skip(state, session))]
pub async fn back(State(state): State<AppState>, session: Session) -> Result<Response> {
    dispatch(&state, &session, Action::Back).await
}

/// Jump from review to a step to change it.
#[instrument(skip(state, session))]
pub async fn edit(
    State(state): State<AppState>,
    session: Session,
    Path(step): Path<String>,
) -> Result<Response> {
    let step: Step = step.parse().map_err(AppError::NotFound)?;
    dispatch(&state, &session, Action::Edit(step)).await
}

/// Tick or untick the terms checkbox on review.
#[instrument(skip(state, session))]
pub async fn terms(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<TermsInput>,
) -> Result<Response> {
    dispatch(&state, &session, Action::SetTermsAccepted(form.accept_terms)).await
}

/// Discard the checkout and start over from the seed cart.
///
/// Refused while an order is being submitted, so the submission outcome
/// cannot land on a checkout it does not belong to.
#[instrument(skip(state, session))]
pub async fn start_new(State(state): State<AppState>, session: Session) -> Result<Response> {
    let current = load(&state, &session).await?;
    if current.is_submitting() {
        return Err(hanbit_core::CheckoutError::SubmissionInProgress.into());
    }

    let checkout = CheckoutState::new(state.fresh_cart());
    // New session id, so an old tab cannot keep writing to the fresh checkout
    session.cycle_id().await?;
    store(&session, &checkout).await?;

    tracing::info!("Started new checkout");
    add_breadcrumb("checkout", "start new", None);
    Ok(Redirect::to(CHECKOUT_PATH).into_response())
}

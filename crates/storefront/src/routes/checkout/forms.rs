//! Handlers for the form steps: contact, shipping address, shipping method
//! and payment.
//!
//! A valid form becomes one reducer action. An invalid one is rendered back
//! with its field errors and nothing in the session changes.

use axum::{Form, extract::State, response::Response};
use hanbit_core::{
    Action, AddressInput, CheckoutError, ContactInput, DeliveryInput, FieldErrors, PaymentInput,
    PaymentMethod,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::views::Rejected;
use super::{dispatch, load, render_page};
use crate::error::Result;
use crate::state::AppState;

/// Re-render the current step with a rejected form.
///
/// A form posted for a step the checkout is not on is a conflict, not a
/// validation failure.
async fn reject(state: &AppState, session: &Session, rejected: Rejected) -> Result<Response> {
    let checkout = load(state, session).await?;
    if checkout.is_complete() {
        return Err(CheckoutError::Completed.into());
    }
    if checkout.is_submitting() {
        return Err(CheckoutError::SubmissionInProgress.into());
    }
    if checkout.step() != rejected.step() {
        return Err(CheckoutError::InvalidTransition {
            step: checkout.step(),
            action: rejected.action(),
        }
        .into());
    }
    render_page(&checkout, state.pricing(), Some(rejected))
}

/// Submit contact details.
#[instrument(skip(state, session, input))]
pub async fn contact(
    State(state): State<AppState>,
    session: Session,
    Form(input): Form<ContactInput>,
) -> Result<Response> {
    match input.validate() {
        Ok(contact) => dispatch(&state, &session, Action::SubmitContact(contact)).await,
        Err(errors) => {
            tracing::debug!(fields = errors.len(), "Contact form rejected");
            reject(&state, &session, Rejected::Contact(input, errors)).await
        }
    }
}

/// Submit the shipping address.
#[instrument(skip(state, session, input))]
pub async fn shipping(
    State(state): State<AppState>,
    session: Session,
    Form(input): Form<AddressInput>,
) -> Result<Response> {
    match input.validate() {
        Ok(address) => dispatch(&state, &session, Action::SubmitShippingAddress(address)).await,
        Err(errors) => {
            tracing::debug!(fields = errors.len(), "Address form rejected");
            reject(&state, &session, Rejected::Shipping(input, errors)).await
        }
    }
}

/// Shipping method form: choose a method, then either stay to see the new
/// total or carry on to payment.
#[derive(Debug, Default, Deserialize)]
pub struct DeliveryForm {
    #[serde(default)]
    pub shipping_method: String,
    /// `select` stays on the step; anything else continues.
    #[serde(default)]
    pub intent: String,
}

/// Select a shipping method and optionally continue.
#[instrument(skip(state, session))]
pub async fn delivery(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<DeliveryForm>,
) -> Result<Response> {
    let input = DeliveryInput {
        shipping_method: form.shipping_method,
    };
    let method = match input.validate() {
        Ok(method) => method,
        Err(errors) => return reject(&state, &session, Rejected::Delivery(errors)).await,
    };

    let response = dispatch(&state, &session, Action::SelectShippingMethod(method)).await?;
    if form.intent == "select" {
        return Ok(response);
    }
    dispatch(&state, &session, Action::ContinueFromDelivery).await
}

/// Payment form: choose a method to see its sub-form, or submit the method
/// with its sub-form to continue to review.
#[derive(Debug, Default, Deserialize)]
pub struct PaymentForm {
    #[serde(flatten)]
    pub input: PaymentInput,
    /// `select` stays on the step; anything else continues.
    #[serde(default)]
    pub intent: String,
}

/// Submit the payment choice. Card and wallet details are checked for
/// presence and then dropped.
#[instrument(skip(state, session, form))]
pub async fn payment(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<PaymentForm>,
) -> Result<Response> {
    let PaymentForm { input, intent } = form;
    let selected = input.payment_method.parse::<PaymentMethod>().ok();

    if intent == "select" {
        return match selected {
            Some(method) => dispatch(&state, &session, Action::SelectPaymentMethod(method)).await,
            None => {
                let mut errors = FieldErrors::default();
                errors.insert("payment_method", "Choose a payment method");
                reject(&state, &session, Rejected::Payment(None, errors)).await
            }
        };
    }

    match input.validate() {
        Ok(method) => dispatch(&state, &session, Action::SubmitPayment(method)).await,
        Err(errors) => {
            tracing::debug!(fields = errors.len(), "Payment form rejected");
            reject(&state, &session, Rejected::Payment(selected, errors)).await
        }
    }
}

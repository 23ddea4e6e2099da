//! Checkout state and its reducer.
//!
//! [`CheckoutState::apply`] is the only way to change a checkout. Each
//! [`Action`] is checked against the current step and submission status
//! before anything is touched, so a rejected action leaves the state exactly
//! as it was.
//!
//! ```text
//! cart -> contact -> shipping -> delivery -> payment -> review -> confirmation
//!                \________ edit from review (contact..=payment) ______/
//! ```

use core::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::cart::{Cart, CartError};
use super::details::{Contact, PaymentMethod, ShippingAddress, ShippingMethod};
use super::step::Step;
use crate::pricing::{OrderSummary, PricingError, PricingTable, quote};
use crate::types::{CartItemId, Money, OrderReference};

/// Rejected checkout actions.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("cannot {action} while on the {step} step")]
    InvalidTransition { step: Step, action: &'static str },
    #[error("cart is empty")]
    EmptyCart,
    #[error(transparent)]
    Cart(#[from] CartError),
    #[error("the {0} step cannot be edited from review")]
    NotEditable(Step),
    #[error("terms and conditions must be accepted")]
    TermsNotAccepted,
    #[error("order is already being submitted")]
    SubmissionInProgress,
    #[error("no order submission is in progress")]
    NotSubmitting,
    #[error("checkout is already complete")]
    Completed,
}

/// Why an order submission failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionErrorKind {
    PaymentDeclined,
    Network,
    /// The order backend refused the order for another reason.
    Rejected,
}

/// A failed submission, kept on the review step so the buyer can retry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionError {
    pub kind: SubmissionErrorKind,
    pub message: String,
}

impl SubmissionError {
    #[must_use]
    pub fn new(kind: SubmissionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for SubmissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Order-placement status.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Submission {
    #[default]
    Idle,
    Submitting {
        started_at: DateTime<Utc>,
    },
    Failed {
        error: SubmissionError,
    },
}

/// What the order backend returned for a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    pub reference: OrderReference,
    pub placed_at: DateTime<Utc>,
    /// Amount charged, in the display currency.
    pub total: Money,
}

/// Everything a buyer can do to a checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    IncrementItem(CartItemId),
    DecrementItem(CartItemId),
    RemoveItem(CartItemId),
    ContinueFromCart,
    SubmitContact(Contact),
    SubmitShippingAddress(ShippingAddress),
    SelectShippingMethod(ShippingMethod),
    ContinueFromDelivery,
    /// Choose a payment method without leaving the step, to show its sub-form.
    SelectPaymentMethod(PaymentMethod),
    SubmitPayment(PaymentMethod),
    SetTermsAccepted(bool),
    Back,
    Edit(Step),
    BeginSubmission { at: DateTime<Utc> },
    SubmissionSucceeded(OrderConfirmation),
    SubmissionFailed(SubmissionError),
}

impl Action {
    /// Short name for logs and error messages.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::IncrementItem(_) => "increment item",
            Self::DecrementItem(_) => "decrement item",
            Self::RemoveItem(_) => "remove item",
            Self::ContinueFromCart => "continue from cart",
            Self::SubmitContact(_) => "submit contact",
            Self::SubmitShippingAddress(_) => "submit shipping address",
            Self::SelectShippingMethod(_) => "select shipping method",
            Self::ContinueFromDelivery => "continue from delivery",
            Self::SelectPaymentMethod(_) => "select payment method",
            Self::SubmitPayment(_) => "submit payment",
            Self::SetTermsAccepted(_) => "set terms accepted",
            Self::Back => "go back",
            Self::Edit(_) => "edit",
            Self::BeginSubmission { .. } => "place order",
            Self::SubmissionSucceeded(_) => "confirm order",
            Self::SubmissionFailed(_) => "fail order",
        }
    }

    const fn is_submission_outcome(&self) -> bool {
        matches!(self, Self::SubmissionSucceeded(_) | Self::SubmissionFailed(_))
    }
}

/// One buyer's checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutState {
    step: Step,
    cart: Cart,
    contact: Option<Contact>,
    shipping_address: Option<ShippingAddress>,
    shipping_method: ShippingMethod,
    payment_method: PaymentMethod,
    accept_terms: bool,
    submission: Submission,
    confirmation: Option<OrderConfirmation>,
}

impl CheckoutState {
    /// Start a checkout on the cart step with a seeded cart.
    #[must_use]
    pub fn new(cart: Cart) -> Self {
        Self {
            step: Step::Cart,
            cart,
            contact: None,
            shipping_address: None,
            shipping_method: ShippingMethod::default(),
            payment_method: PaymentMethod::default(),
            accept_terms: true,
            submission: Submission::Idle,
            confirmation: None,
        }
    }

    #[must_use]
    pub const fn step(&self) -> Step {
        self.step
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub const fn contact(&self) -> Option<&Contact> {
        self.contact.as_ref()
    }

    #[must_use]
    pub const fn shipping_address(&self) -> Option<&ShippingAddress> {
        self.shipping_address.as_ref()
    }

    #[must_use]
    pub const fn shipping_method(&self) -> ShippingMethod {
        self.shipping_method
    }

    #[must_use]
    pub const fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    #[must_use]
    pub const fn accept_terms(&self) -> bool {
        self.accept_terms
    }

    #[must_use]
    pub const fn submission(&self) -> &Submission {
        &self.submission
    }

    #[must_use]
    pub const fn confirmation(&self) -> Option<&OrderConfirmation> {
        self.confirmation.as_ref()
    }

    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        matches!(self.submission, Submission::Submitting { .. })
    }

    /// Whether a submission has been in flight for longer than `limit`.
    ///
    /// The outcome normally lands well within the order backend's timeout;
    /// past that the lock is stale and can be released as a network failure.
    #[must_use]
    pub fn is_submission_stale(&self, now: DateTime<Utc>, limit: TimeDelta) -> bool {
        match self.submission {
            Submission::Submitting { started_at } => now - started_at > limit,
            Submission::Idle | Submission::Failed { .. } => false,
        }
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self.step, Step::Confirmation)
    }

    /// Whether "Continue" is enabled on the cart step.
    #[must_use]
    pub fn can_leave_cart(&self) -> bool {
        !self.cart.is_empty()
    }

    /// Price the checkout as it stands.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the table cannot price this cart.
    pub fn summary(&self, pricing: &PricingTable) -> Result<OrderSummary, PricingError> {
        quote(&self.cart, self.shipping_method, self.step, pricing)
    }

    /// Apply an action, returning the step the checkout is on afterwards.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] when the action is not allowed in the
    /// current step or submission status. The state is unchanged on error.
    pub fn apply(&mut self, action: Action) -> Result<Step, CheckoutError> {
        if self.is_complete() {
            return Err(CheckoutError::Completed);
        }
        if self.is_submitting() && !action.is_submission_outcome() {
            return Err(CheckoutError::SubmissionInProgress);
        }

        let step = self.step;
        let invalid = |action: &Action| CheckoutError::InvalidTransition {
            step,
            action: action.name(),
        };

        match (step, action) {
            (Step::Cart, Action::IncrementItem(id)) => {
                self.cart.increment(id)?;
            }
            (Step::Cart, Action::DecrementItem(id)) => {
                self.cart.decrement(id)?;
            }
            (Step::Cart, Action::RemoveItem(id)) => {
                self.cart.remove(id)?;
            }
            (Step::Cart, Action::ContinueFromCart) => {
                if self.cart.is_empty() {
                    return Err(CheckoutError::EmptyCart);
                }
                self.advance();
            }
            (Step::Contact, Action::SubmitContact(contact)) => {
                self.contact = Some(contact);
                self.advance();
            }
            (Step::Shipping, Action::SubmitShippingAddress(address)) => {
                self.shipping_address = Some(address);
                self.advance();
            }
            (Step::Delivery, Action::SelectShippingMethod(method)) => {
                self.shipping_method = method;
            }
            (Step::Delivery, Action::ContinueFromDelivery) => {
                self.advance();
            }
            (Step::Payment, Action::SelectPaymentMethod(method)) => {
                self.payment_method = method;
            }
            (Step::Payment, Action::SubmitPayment(method)) => {
                self.payment_method = method;
                self.advance();
            }
            (Step::Review, Action::SetTermsAccepted(accepted)) => {
                self.accept_terms = accepted;
            }
            (_, Action::Back) => {
                let previous = step.previous().ok_or_else(|| invalid(&Action::Back))?;
                self.leave_review();
                self.step = previous;
            }
            (Step::Review, Action::Edit(target)) => {
                if !target.is_editable_from_review() {
                    return Err(CheckoutError::NotEditable(target));
                }
                self.leave_review();
                self.step = target;
            }
            (Step::Review, Action::BeginSubmission { at }) => {
                if !self.accept_terms {
                    return Err(CheckoutError::TermsNotAccepted);
                }
                self.submission = Submission::Submitting { started_at: at };
            }
            (_, Action::SubmissionSucceeded(confirmation)) => {
                if !self.is_submitting() {
                    return Err(CheckoutError::NotSubmitting);
                }
                self.submission = Submission::Idle;
                self.confirmation = Some(confirmation);
                self.advance();
            }
            (_, Action::SubmissionFailed(error)) => {
                if !self.is_submitting() {
                    return Err(CheckoutError::NotSubmitting);
                }
                self.submission = Submission::Failed { error };
            }
            (_, action) => return Err(invalid(&action)),
        }

        Ok(self.step)
    }

    /// Move to the next step in the fixed sequence. Never called on the
    /// terminal step, which rejects every action up front.
    fn advance(&mut self) {
        if let Some(next) = self.step.next() {
            self.step = next;
        }
    }

    /// A failed attempt belongs to the review page it was shown on.
    fn leave_review(&mut self) {
        if matches!(self.submission, Submission::Failed { .. }) {
            self.submission = Submission::Idle;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::checkout::cart::tests::{example_cart, item};
    use crate::types::{CurrencyCode, Email};

    fn contact() -> Contact {
        Contact {
            email: Email::parse("buyer@example.ng").unwrap(),
            phone: "8031234567".to_string(),
            country_code: "+234".to_string(),
            whatsapp_opt_in: false,
        }
    }

    fn address() -> ShippingAddress {
        ShippingAddress {
            first_name: "Ada".to_string(),
            last_name: "Okafor".to_string(),
            address1: "12 Marina Road".to_string(),
            address2: None,
            city: "Lagos".to_string(),
            state: "Lagos".to_string(),
            zip: String::new(),
            country: "Nigeria".to_string(),
        }
    }

    fn confirmation() -> OrderConfirmation {
        OrderConfirmation {
            reference: OrderReference::parse("HB-1001").unwrap(),
            placed_at: Utc::now(),
            total: Money::whole(1, CurrencyCode::NGN),
        }
    }

    /// Walk a fresh checkout forward to the review step.
    fn at_review() -> CheckoutState {
        let mut state = CheckoutState::new(example_cart());
        state.apply(Action::ContinueFromCart).unwrap();
        state.apply(Action::SubmitContact(contact())).unwrap();
        state.apply(Action::SubmitShippingAddress(address())).unwrap();
        state
            .apply(Action::SelectShippingMethod(ShippingMethod::Express))
            .unwrap();
        state.apply(Action::ContinueFromDelivery).unwrap();
        state.apply(Action::SubmitPayment(PaymentMethod::Mpesa)).unwrap();
        state
    }

    #[test]
    fn test_new_starts_on_cart_with_defaults() {
        let state = CheckoutState::new(example_cart());
        assert_eq!(state.step(), Step::Cart);
        assert_eq!(state.shipping_method(), ShippingMethod::Standard);
        assert_eq!(state.payment_method(), PaymentMethod::Card);
        assert!(state.accept_terms());
        assert_eq!(state.submission(), &Submission::Idle);
        assert!(state.contact().is_none());
    }

    #[test]
    fn test_forward_sequence_visits_every_step_in_order() {
        let mut state = CheckoutState::new(example_cart());
        let mut visited = vec![state.step()];

        for action in [
            Action::ContinueFromCart,
            Action::SubmitContact(contact()),
            Action::SubmitShippingAddress(address()),
            Action::ContinueFromDelivery,
            Action::SubmitPayment(PaymentMethod::Card),
            Action::BeginSubmission { at: Utc::now() },
            Action::SubmissionSucceeded(confirmation()),
        ] {
            let step = state.apply(action).unwrap();
            if visited.last() != Some(&step) {
                visited.push(step);
            }
        }

        assert_eq!(visited, Step::ALL.to_vec());
    }

    #[test]
    fn test_cannot_skip_steps() {
        let mut state = CheckoutState::new(example_cart());
        let before = state.clone();
        let err = state
            .apply(Action::SubmitShippingAddress(address()))
            .unwrap_err();
        assert_eq!(
            err,
            CheckoutError::InvalidTransition {
                step: Step::Cart,
                action: "submit shipping address",
            }
        );
        assert_eq!(state, before);
    }

    #[test]
    fn test_empty_cart_blocks_leaving_cart() {
        let mut state = CheckoutState::new(Cart::new(vec![item(1, 1_000, 1)]).unwrap());
        state.apply(Action::RemoveItem(CartItemId::new(1))).unwrap();
        assert!(!state.can_leave_cart());
        assert_eq!(state.apply(Action::ContinueFromCart), Err(CheckoutError::EmptyCart));
        assert_eq!(state.step(), Step::Cart);
    }

    #[test]
    fn test_cart_edits_only_on_cart_step() {
        let mut state = CheckoutState::new(example_cart());
        state.apply(Action::ContinueFromCart).unwrap();
        assert!(matches!(
            state.apply(Action::IncrementItem(CartItemId::new(1))),
            Err(CheckoutError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_unknown_cart_item_is_reported() {
        let mut state = CheckoutState::new(example_cart());
        assert_eq!(
            state.apply(Action::DecrementItem(CartItemId::new(42))),
            Err(CheckoutError::Cart(CartError::ItemNotFound(CartItemId::new(42))))
        );
    }

    #[test]
    fn test_edit_payment_from_review_preserves_other_fields() {
        let mut state = at_review();
        let before = state.clone();

        assert_eq!(state.apply(Action::Edit(Step::Payment)).unwrap(), Step::Payment);
        assert_eq!(state.cart(), before.cart());
        assert_eq!(state.contact(), before.contact());
        assert_eq!(state.shipping_address(), before.shipping_address());
        assert_eq!(state.shipping_method(), before.shipping_method());

        let next = state.apply(Action::SubmitPayment(PaymentMethod::Bank)).unwrap();
        assert_eq!(next, Step::Review);
        assert_eq!(state.payment_method(), PaymentMethod::Bank);
    }

    #[test]
    fn test_edit_contact_resumes_normal_chain() {
        let mut state = at_review();
        state.apply(Action::Edit(Step::Contact)).unwrap();
        assert_eq!(
            state.apply(Action::SubmitContact(contact())).unwrap(),
            Step::Shipping
        );
        // the previously chosen method survives the detour
        assert_eq!(state.shipping_method(), ShippingMethod::Express);
    }

    #[test]
    fn test_edit_rejects_cart_and_non_review_steps() {
        let mut state = at_review();
        assert_eq!(
            state.apply(Action::Edit(Step::Cart)),
            Err(CheckoutError::NotEditable(Step::Cart))
        );

        let mut state = CheckoutState::new(example_cart());
        state.apply(Action::ContinueFromCart).unwrap();
        assert!(matches!(
            state.apply(Action::Edit(Step::Cart)),
            Err(CheckoutError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_back_moves_one_step() {
        let mut state = at_review();
        assert_eq!(state.apply(Action::Back).unwrap(), Step::Payment);
        assert_eq!(state.apply(Action::Back).unwrap(), Step::Delivery);

        let mut fresh = CheckoutState::new(example_cart());
        assert!(fresh.apply(Action::Back).is_err());
    }

    #[test]
    fn test_place_order_requires_terms() {
        let mut state = at_review();
        state.apply(Action::SetTermsAccepted(false)).unwrap();
        assert!(!state.accept_terms());
        assert_eq!(
            state.apply(Action::BeginSubmission { at: Utc::now() }),
            Err(CheckoutError::TermsNotAccepted)
        );
        assert!(!state.is_submitting());
    }

    #[test]
    fn test_submitting_locks_everything_but_the_outcome() {
        let mut state = at_review();
        state.apply(Action::BeginSubmission { at: Utc::now() }).unwrap();
        assert!(state.is_submitting());

        for action in [
            Action::BeginSubmission { at: Utc::now() },
            Action::Edit(Step::Contact),
            Action::Back,
            Action::SetTermsAccepted(false),
        ] {
            assert_eq!(state.apply(action), Err(CheckoutError::SubmissionInProgress));
        }

        assert_eq!(
            state.apply(Action::SubmissionSucceeded(confirmation())).unwrap(),
            Step::Confirmation
        );
        assert_eq!(state.confirmation().unwrap().reference.as_str(), "HB-1001");
    }

    #[test]
    fn test_failed_submission_keeps_data_and_allows_retry() {
        let mut state = at_review();
        let before = state.clone();
        state.apply(Action::BeginSubmission { at: Utc::now() }).unwrap();
        state
            .apply(Action::SubmissionFailed(SubmissionError::new(
                SubmissionErrorKind::PaymentDeclined,
                "card declined",
            )))
            .unwrap();

        assert_eq!(state.step(), Step::Review);
        assert!(matches!(state.submission(), Submission::Failed { .. }));
        assert_eq!(state.contact(), before.contact());
        assert_eq!(state.cart(), before.cart());
        assert!(!state.is_submitting());

        state.apply(Action::BeginSubmission { at: Utc::now() }).unwrap();
        assert!(state.is_submitting());
    }

    #[test]
    fn test_leaving_review_clears_failure() {
        let mut state = at_review();
        state.apply(Action::BeginSubmission { at: Utc::now() }).unwrap();
        state
            .apply(Action::SubmissionFailed(SubmissionError::new(
                SubmissionErrorKind::Network,
                "timeout",
            )))
            .unwrap();
        state.apply(Action::Edit(Step::Delivery)).unwrap();
        assert_eq!(state.submission(), &Submission::Idle);
    }

    #[test]
    fn test_outcome_without_submission_is_rejected() {
        let mut state = at_review();
        assert_eq!(
            state.apply(Action::SubmissionSucceeded(confirmation())),
            Err(CheckoutError::NotSubmitting)
        );
    }

    #[test]
    fn test_confirmation_is_terminal() {
        let mut state = at_review();
        state.apply(Action::BeginSubmission { at: Utc::now() }).unwrap();
        state.apply(Action::SubmissionSucceeded(confirmation())).unwrap();

        for action in [Action::Back, Action::Edit(Step::Payment), Action::ContinueFromCart] {
            assert_eq!(state.apply(action), Err(CheckoutError::Completed));
        }
        assert!(state.is_complete());
    }

    #[test]
    fn test_select_payment_method_stays_on_payment() {
        let mut state = at_review();
        state.apply(Action::Back).unwrap();
        assert_eq!(
            state.apply(Action::SelectPaymentMethod(PaymentMethod::Bank)).unwrap(),
            Step::Payment
        );
        assert_eq!(state.payment_method(), PaymentMethod::Bank);

        state.apply(Action::Back).unwrap();
        assert!(matches!(
            state.apply(Action::SelectPaymentMethod(PaymentMethod::Card)),
            Err(CheckoutError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_forward_moves_follow_step_order() {
        let mut state = CheckoutState::new(example_cart());
        for expected in [Step::Contact, Step::Shipping, Step::Delivery] {
            let action = match state.step() {
                Step::Cart => Action::ContinueFromCart,
                Step::Contact => Action::SubmitContact(contact()),
                _ => Action::SubmitShippingAddress(address()),
            };
            let before = state.step();
            assert_eq!(state.apply(action).unwrap(), expected);
            assert_eq!(before.next(), Some(expected));
        }
    }

    #[test]
    fn test_submission_goes_stale_after_limit() {
        let mut state = at_review();
        let started = Utc::now();
        let limit = TimeDelta::seconds(30);
        assert!(!state.is_submission_stale(started + TimeDelta::hours(1), limit));

        state.apply(Action::BeginSubmission { at: started }).unwrap();
        assert!(!state.is_submission_stale(started + TimeDelta::seconds(10), limit));
        assert!(state.is_submission_stale(started + TimeDelta::seconds(31), limit));

        // a stale lock is released through the normal failure outcome
        state
            .apply(Action::SubmissionFailed(SubmissionError::new(
                SubmissionErrorKind::Network,
                "timed out",
            )))
            .unwrap();
        assert!(!state.is_submitting());
        assert_eq!(state.step(), Step::Review);
    }

    #[test]
    fn test_serde_round_trip_preserves_session_state() {
        let state = at_review();
        let json = serde_json::to_string(&state).unwrap();
        let restored: CheckoutState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, state);
    }
}

//! The checkout state machine.
//!
//! - [`step`] - the fixed step sequence
//! - [`cart`] - cart lines and quantity rules
//! - [`details`] - contact, address, shipping and payment choices
//! - [`state`] - [`CheckoutState`] and its reducer
//! - [`validation`] - step form inputs

pub mod cart;
pub mod details;
pub mod state;
pub mod step;
pub mod validation;

pub use cart::{Cart, CartError, CartItem};
pub use details::{Contact, PaymentMethod, ShippingAddress, ShippingMethod};
pub use state::{
    Action, CheckoutError, CheckoutState, OrderConfirmation, Submission, SubmissionError,
    SubmissionErrorKind,
};
pub use step::Step;
pub use validation::{
    AddressInput, ContactInput, DeliveryInput, FieldErrors, PaymentInput, TermsInput,
};

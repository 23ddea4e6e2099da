//! Checkout page templates and the view data they render.
//!
//! Every figure is formatted here, once, so templates only print strings.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use hanbit_core::{
    AddressInput, CartItem, CheckoutState, ContactInput, FieldErrors, OrderSummary,
    PaymentMethod, PricingTable, ShippingMethod, ShippingQuote, Step, Submission,
};

use crate::error::Result;

/// Shown in the shipping row before a method has been chosen.
pub const SHIPPING_PENDING: &str = "Calculated at shipping method";

// =============================================================================
// Shared Views
// =============================================================================

/// One entry in the step indicator.
#[derive(Clone)]
pub struct ProgressItem {
    pub number: u8,
    pub title: &'static str,
    /// `done`, `current` or `upcoming`.
    pub status: &'static str,
}

fn progress(current: Step) -> Vec<ProgressItem> {
    Step::ALL
        .into_iter()
        .map(|step| ProgressItem {
            number: step.number(),
            title: step.title(),
            status: match step.cmp(&current) {
                std::cmp::Ordering::Less => "done",
                std::cmp::Ordering::Equal => "current",
                std::cmp::Ordering::Greater => "upcoming",
            },
        })
        .collect()
}

/// Order summary sidebar.
#[derive(Clone)]
pub struct SummaryView {
    pub item_count: u32,
    pub subtotal: String,
    pub shipping: String,
    pub customs_estimate: String,
    pub total: String,
    pub display_total: String,
    pub exchange_note: String,
}

impl SummaryView {
    #[must_use]
    pub fn new(summary: &OrderSummary, pricing: &PricingTable) -> Self {
        let shipping = match summary.shipping {
            ShippingQuote::Pending => SHIPPING_PENDING.to_string(),
            ShippingQuote::Resolved(cost) => cost.display(),
        };
        Self {
            item_count: summary.item_count,
            subtotal: summary.subtotal.display(),
            shipping,
            customs_estimate: summary.customs_estimate.display(),
            total: summary.total.display(),
            display_total: summary.display_total.display(),
            exchange_note: format!(
                "Converted at a fixed rate of {} {} per {}",
                pricing.exchange_rate,
                pricing.display_currency,
                summary.total.currency
            ),
        }
    }
}

/// Field errors as templates read them.
#[derive(Clone, Default)]
pub struct ErrorsView(FieldErrors);

impl ErrorsView {
    /// Message for a field, or an empty string.
    #[must_use]
    pub fn of(&self, field: &str) -> &str {
        self.0.get(field).unwrap_or_default()
    }

    #[must_use]
    pub fn any(&self) -> bool {
        !self.0.is_empty()
    }
}

impl From<FieldErrors> for ErrorsView {
    fn from(errors: FieldErrors) -> Self {
        Self(errors)
    }
}

/// A radio option.
#[derive(Clone)]
pub struct ChoiceView {
    pub value: &'static str,
    pub label: &'static str,
    pub detail: String,
    pub checked: bool,
}

// =============================================================================
// Step Views
// =============================================================================

#[derive(Clone)]
pub struct CartLineView {
    pub id: i32,
    pub name: String,
    pub part_number: String,
    pub unit_price: String,
    pub quantity: u32,
    pub line_total: String,
    pub can_decrement: bool,
}

impl From<&CartItem> for CartLineView {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id.as_i32(),
            name: item.name.clone(),
            part_number: item.part_number.clone(),
            unit_price: item.unit_price.display(),
            quantity: item.quantity.get(),
            line_total: item.line_total().display(),
            can_decrement: item.quantity.get() > 1,
        }
    }
}

/// What the buyer has entered, shown on review.
#[derive(Clone)]
pub struct ReviewDetails {
    pub email: String,
    pub phone: String,
    pub whatsapp_opt_in: bool,
    pub recipient: String,
    pub address_lines: Vec<String>,
    pub shipping_method: String,
    pub shipping_estimate: &'static str,
    pub payment_method: &'static str,
}

impl ReviewDetails {
    fn new(checkout: &CheckoutState) -> Self {
        let contact = checkout.contact();
        let address = checkout.shipping_address();
        let method = checkout.shipping_method();
        Self {
            email: contact.map(|c| c.email.to_string()).unwrap_or_default(),
            phone: contact.map(hanbit_core::Contact::full_phone).unwrap_or_default(),
            whatsapp_opt_in: contact.is_some_and(|c| c.whatsapp_opt_in),
            recipient: address
                .map(hanbit_core::ShippingAddress::full_name)
                .unwrap_or_default(),
            address_lines: address
                .map(hanbit_core::ShippingAddress::lines)
                .unwrap_or_default(),
            shipping_method: method.label().to_string(),
            shipping_estimate: method.estimate(),
            payment_method: checkout.payment_method().label(),
        }
    }
}

/// A step whose form failed validation, with what was submitted.
pub enum Rejected {
    Contact(ContactInput, FieldErrors),
    Shipping(AddressInput, FieldErrors),
    Delivery(FieldErrors),
    /// Only the chosen method is echoed back; card and wallet numbers are not.
    Payment(Option<PaymentMethod>, FieldErrors),
}

impl Rejected {
    /// The step whose form this is.
    #[must_use]
    pub const fn step(&self) -> Step {
        match self {
            Self::Contact(..) => Step::Contact,
            Self::Shipping(..) => Step::Shipping,
            Self::Delivery(_) => Step::Delivery,
            Self::Payment(..) => Step::Payment,
        }
    }

    /// Name of the action the form would have produced.
    #[must_use]
    pub const fn action(&self) -> &'static str {
        match self {
            Self::Contact(..) => "submit contact",
            Self::Shipping(..) => "submit shipping address",
            Self::Delivery(_) => "select shipping method",
            Self::Payment(..) => "submit payment",
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template)]
#[template(path = "checkout/cart.html")]
pub struct CartPage {
    pub progress: Vec<ProgressItem>,
    pub summary: SummaryView,
    pub lines: Vec<CartLineView>,
    pub can_continue: bool,
}

#[derive(Template)]
#[template(path = "checkout/contact.html")]
pub struct ContactPage {
    pub progress: Vec<ProgressItem>,
    pub summary: SummaryView,
    pub input: ContactInput,
    pub errors: ErrorsView,
}

#[derive(Template)]
#[template(path = "checkout/shipping.html")]
pub struct ShippingPage {
    pub progress: Vec<ProgressItem>,
    pub summary: SummaryView,
    pub input: AddressInput,
    pub errors: ErrorsView,
}

#[derive(Template)]
#[template(path = "checkout/delivery.html")]
pub struct DeliveryPage {
    pub progress: Vec<ProgressItem>,
    pub summary: SummaryView,
    pub options: Vec<ChoiceView>,
    pub errors: ErrorsView,
}

#[derive(Template)]
#[template(path = "checkout/payment.html")]
pub struct PaymentPage {
    pub progress: Vec<ProgressItem>,
    pub summary: SummaryView,
    pub options: Vec<ChoiceView>,
    /// Sub-form shown for the selected method: `card`, `bank` or `wallet`.
    /// The others are not rendered.
    pub sub_form: &'static str,
    pub selected_label: &'static str,
    pub errors: ErrorsView,
}

#[derive(Template)]
#[template(path = "checkout/review.html")]
pub struct ReviewPage {
    pub progress: Vec<ProgressItem>,
    pub summary: SummaryView,
    pub lines: Vec<CartLineView>,
    pub details: ReviewDetails,
    pub accept_terms: bool,
    pub submitting: bool,
    pub failure: Option<String>,
}

#[derive(Template)]
#[template(path = "checkout/confirmation.html")]
pub struct ConfirmationPage {
    pub progress: Vec<ProgressItem>,
    pub summary: SummaryView,
    pub reference: String,
    pub placed_at: String,
    pub total: String,
    pub email: String,
}

/// Order summary fragment (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/summary.html")]
pub struct SummaryFragment {
    pub summary: SummaryView,
}

// =============================================================================
// Rendering
// =============================================================================

fn delivery_options(selected: ShippingMethod, pricing: &PricingTable) -> Vec<ChoiceView> {
    ShippingMethod::ALL
        .into_iter()
        .map(|method| ChoiceView {
            value: method.as_str(),
            label: method.label(),
            detail: format!(
                "{} ({})",
                pricing.shipping_cost(method).display(),
                method.estimate()
            ),
            checked: method == selected,
        })
        .collect()
}

fn payment_options(selected: PaymentMethod) -> Vec<ChoiceView> {
    PaymentMethod::ALL
        .into_iter()
        .map(|method| ChoiceView {
            value: method.as_str(),
            label: method.label(),
            detail: String::new(),
            checked: method == selected,
        })
        .collect()
}

const fn sub_form(method: PaymentMethod) -> &'static str {
    if method.uses_mobile_wallet() {
        "wallet"
    } else {
        method.as_str()
    }
}

/// Render the page for the checkout's current step.
///
/// With a rejected form the page is rendered with its inline errors and a
/// `422 Unprocessable Entity` status.
///
/// # Errors
///
/// Returns an error if the checkout cannot be priced or the template fails
/// to render.
pub fn render_page(
    checkout: &CheckoutState,
    pricing: &PricingTable,
    rejected: Option<Rejected>,
) -> Result<Response> {
    let step = checkout.step();
    let progress = progress(step);
    let summary = SummaryView::new(&checkout.summary(pricing)?, pricing);
    let status = if rejected.is_some() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::OK
    };

    let html = match (step, rejected) {
        (Step::Cart, _) => CartPage {
            progress,
            summary,
            lines: checkout.cart().items().iter().map(CartLineView::from).collect(),
            can_continue: checkout.can_leave_cart(),
        }
        .render()?,
        (Step::Contact, rejected) => {
            let (input, errors) = match rejected {
                Some(Rejected::Contact(input, errors)) => (input, errors),
                _ => (
                    checkout
                        .contact()
                        .map(ContactInput::from_contact)
                        .unwrap_or_default(),
                    FieldErrors::default(),
                ),
            };
            ContactPage {
                progress,
                summary,
                input,
                errors: errors.into(),
            }
            .render()?
        }
        (Step::Shipping, rejected) => {
            let (input, errors) = match rejected {
                Some(Rejected::Shipping(input, errors)) => (input, errors),
                _ => (
                    checkout
                        .shipping_address()
                        .map(AddressInput::from_address)
                        .unwrap_or_default(),
                    FieldErrors::default(),
                ),
            };
            ShippingPage {
                progress,
                summary,
                input,
                errors: errors.into(),
            }
            .render()?
        }
        (Step::Delivery, rejected) => {
            let errors = match rejected {
                Some(Rejected::Delivery(errors)) => errors,
                _ => FieldErrors::default(),
            };
            DeliveryPage {
                progress,
                summary,
                options: delivery_options(checkout.shipping_method(), pricing),
                errors: errors.into(),
            }
            .render()?
        }
        (Step::Payment, rejected) => {
            let (selected, errors) = match rejected {
                Some(Rejected::Payment(selected, errors)) => {
                    (selected.unwrap_or(checkout.payment_method()), errors)
                }
                _ => (checkout.payment_method(), FieldErrors::default()),
            };
            PaymentPage {
                progress,
                summary,
                options: payment_options(selected),
                sub_form: sub_form(selected),
                selected_label: selected.label(),
                errors: errors.into(),
            }
            .render()?
        }
        (Step::Review, _) => {
            let failure = match checkout.submission() {
                Submission::Failed { error } => Some(error.message.clone()),
                Submission::Idle | Submission::Submitting { .. } => None,
            };
            ReviewPage {
                progress,
                summary,
                lines: checkout.cart().items().iter().map(CartLineView::from).collect(),
                details: ReviewDetails::new(checkout),
                accept_terms: checkout.accept_terms(),
                submitting: checkout.is_submitting(),
                failure,
            }
            .render()?
        }
        (Step::Confirmation, _) => {
            let (reference, placed_at, total) = checkout.confirmation().map_or_else(
                || (String::new(), String::new(), String::new()),
                |c| {
                    (
                        c.reference.to_string(),
                        c.placed_at.format("%-d %B %Y, %H:%M UTC").to_string(),
                        c.total.display(),
                    )
                },
            );
            ConfirmationPage {
                progress,
                summary,
                reference,
                placed_at,
                total,
                email: checkout
                    .contact()
                    .map(|c| c.email.to_string())
                    .unwrap_or_default(),
            }
            .render()?
        }
    };

    Ok((status, Html(html)).into_response())
}

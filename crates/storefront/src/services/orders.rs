//! Order submission to the order/payment backend.
//!
//! The backend accepts the buyer's details, the cart and the computed total
//! and answers with an order reference or a failure reason. Without a
//! configured backend, orders go to [`SimulatedOrderClient`], which waits a
//! fixed delay and accepts everything.

use std::time::Duration;

use chrono::Utc;
use hanbit_core::{
    CartItem, CheckoutState, Contact, OrderConfirmation, OrderReference, OrderSummary,
    PaymentMethod, PricingError, PricingTable, ShippingAddress, ShippingMethod, SubmissionError,
    SubmissionErrorKind,
};
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::config::{OrderApiConfig, OrderBackendConfig};

/// Errors that can occur when placing an order.
#[derive(Debug, Error)]
pub enum OrderError {
    /// HTTP request failed (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The payment provider refused the charge.
    #[error("Payment declined: {0}")]
    PaymentDeclined(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The order could not be priced.
    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    /// The checkout is missing details an order needs.
    #[error("Checkout is missing {0}")]
    Incomplete(&'static str),

    /// Client could not be built.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl OrderError {
    /// Buyer-facing failure recorded on the review step.
    #[must_use]
    pub fn to_submission_error(&self) -> SubmissionError {
        match self {
            Self::PaymentDeclined(reason) => SubmissionError::new(
                SubmissionErrorKind::PaymentDeclined,
                format!("Your payment was declined: {reason}"),
            ),
            Self::Http(_) => SubmissionError::new(
                SubmissionErrorKind::Network,
                "We could not reach the payment service. Please try again.",
            ),
            Self::Api { .. }
            | Self::Parse(_)
            | Self::Pricing(_)
            | Self::Incomplete(_)
            | Self::Config(_) => {
                SubmissionError::new(
                    SubmissionErrorKind::Rejected,
                    "Your order could not be placed. Please try again or contact us.",
                )
            }
        }
    }
}

/// Body sent to the order backend.
#[derive(Debug, Clone, Serialize)]
pub struct OrderRequest {
    pub contact: Contact,
    pub shipping_address: ShippingAddress,
    pub shipping_method: ShippingMethod,
    pub payment_method: PaymentMethod,
    pub cart: Vec<CartItem>,
    pub summary: OrderSummary,
}

impl OrderRequest {
    /// Build the order from a checkout on the review step.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Incomplete`] if contact or address are missing,
    /// or [`OrderError::Pricing`] if the checkout cannot be priced.
    pub fn from_checkout(state: &CheckoutState, pricing: &PricingTable) -> Result<Self, OrderError> {
        let contact = state.contact().ok_or(OrderError::Incomplete("contact details"))?;
        let shipping_address = state
            .shipping_address()
            .ok_or(OrderError::Incomplete("shipping address"))?;

        Ok(Self {
            contact: contact.clone(),
            shipping_address: shipping_address.clone(),
            shipping_method: state.shipping_method(),
            payment_method: state.payment_method(),
            cart: state.cart().items().to_vec(),
            summary: state.summary(pricing)?,
        })
    }

    /// Confirmation for an accepted order.
    #[must_use]
    pub fn confirm(&self, reference: OrderReference) -> OrderConfirmation {
        OrderConfirmation {
            reference,
            placed_at: Utc::now(),
            total: self.summary.display_total,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OrderAccepted {
    order_id: String,
}

#[derive(Debug, Deserialize)]
struct OrderRefused {
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Order backend client.
#[derive(Clone)]
pub struct HttpOrderClient {
    client: reqwest::Client,
    orders_url: Url,
    timeout: Duration,
}

impl HttpOrderClient {
    /// Create a new order backend client.
    ///
    /// # Errors
    ///
    /// Returns error if the URL or API key are unusable or the HTTP client
    /// fails to build.
    pub fn new(config: &OrderApiConfig) -> Result<Self, OrderError> {
        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", config.api_key.expose_secret());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth_value)
                .map_err(|e| OrderError::Config(format!("Invalid API key format: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        let orders_url = config
            .base_url
            .join("orders")
            .map_err(|e| OrderError::Config(e.to_string()))?;

        Ok(Self {
            client,
            orders_url,
            timeout: config.timeout,
        })
    }

    /// Submit an order.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::PaymentDeclined`] for a 402 answer, `Api` for
    /// other non-success answers, `Http` for transport failures.
    pub async fn submit(&self, order: &OrderRequest) -> Result<OrderReference, OrderError> {
        let response = self
            .client
            .post(self.orders_url.clone())
            .json(order)
            .send()
            .await?;
        let status = response.status();

        if status == StatusCode::PAYMENT_REQUIRED {
            let refused: OrderRefused = response
                .json()
                .await
                .map_err(|e| OrderError::Parse(e.to_string()))?;
            let reason = refused
                .reason
                .or(refused.message)
                .unwrap_or_else(|| "no reason given".to_string());
            return Err(OrderError::PaymentDeclined(reason));
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(OrderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let accepted: OrderAccepted = response
            .json()
            .await
            .map_err(|e| OrderError::Parse(e.to_string()))?;
        OrderReference::parse(&accepted.order_id).map_err(OrderError::Parse)
    }
}

/// Stand-in backend: waits, then accepts (or declines, if told to).
#[derive(Debug, Clone)]
pub struct SimulatedOrderClient {
    delay: Duration,
    decline_reason: Option<String>,
}

impl SimulatedOrderClient {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            decline_reason: None,
        }
    }

    /// A simulated backend that declines every payment.
    #[must_use]
    pub fn declining(delay: Duration, reason: impl Into<String>) -> Self {
        Self {
            delay,
            decline_reason: Some(reason.into()),
        }
    }

    /// Wait out the simulated latency, then answer.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::PaymentDeclined`] only when built with
    /// [`SimulatedOrderClient::declining`].
    pub async fn submit(&self, _order: &OrderRequest) -> Result<OrderReference, OrderError> {
        tokio::time::sleep(self.delay).await;
        if let Some(reason) = &self.decline_reason {
            return Err(OrderError::PaymentDeclined(reason.clone()));
        }
        let simple = Uuid::new_v4().simple().to_string();
        let short = simple.get(..8).unwrap_or(&simple).to_ascii_uppercase();
        OrderReference::parse(&format!("HB-{short}")).map_err(OrderError::Parse)
    }
}

/// Where orders go.
#[derive(Clone)]
pub enum OrderGateway {
    Http(HttpOrderClient),
    Simulated(SimulatedOrderClient),
}

impl OrderGateway {
    /// Build the gateway the configuration asks for.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn from_config(config: &OrderBackendConfig) -> Result<Self, OrderError> {
        match config {
            OrderBackendConfig::Http(api) => Ok(Self::Http(HttpOrderClient::new(api)?)),
            OrderBackendConfig::Simulated { delay } => {
                Ok(Self::Simulated(SimulatedOrderClient::new(*delay)))
            }
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Http(_) => "http",
            Self::Simulated(_) => "simulated",
        }
    }

    /// Longest a submission can take before the backend call gives up.
    #[must_use]
    pub const fn max_latency(&self) -> Duration {
        match self {
            Self::Http(client) => client.timeout,
            Self::Simulated(client) => client.delay,
        }
    }

    /// Submit an order to whichever backend is configured.
    ///
    /// # Errors
    ///
    /// See [`HttpOrderClient::submit`] and [`SimulatedOrderClient::submit`].
    pub async fn submit(&self, order: &OrderRequest) -> Result<OrderReference, OrderError> {
        match self {
            Self::Http(client) => client.submit(order).await,
            Self::Simulated(client) => client.submit(order).await,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hanbit_core::{Action, AddressInput, Cart, ContactInput, Step};
    use secrecy::SecretString;

    use super::*;
    use crate::services::cart_seed::SeedCart;

    fn review_state() -> CheckoutState {
        let mut state = CheckoutState::new(SeedCart::builtin().cart());
        state.apply(Action::ContinueFromCart).unwrap();
        let contact = ContactInput {
            email: "buyer@example.ng".to_string(),
            phone: "8031234567".to_string(),
            ..ContactInput::default()
        };
        state
            .apply(Action::SubmitContact(contact.validate().unwrap()))
            .unwrap();
        let address = AddressInput {
            first_name: "Ada".to_string(),
            last_name: "Okafor".to_string(),
            address1: "12 Marina Road".to_string(),
            city: "Lagos".to_string(),
            state: "Lagos".to_string(),
            country: "Nigeria".to_string(),
            ..AddressInput::default()
        };
        state
            .apply(Action::SubmitShippingAddress(address.validate().unwrap()))
            .unwrap();
        state.apply(Action::ContinueFromDelivery).unwrap();
        state
            .apply(Action::SubmitPayment(PaymentMethod::Bank))
            .unwrap();
        assert_eq!(state.step(), Step::Review);
        state
    }

    #[test]
    fn test_request_from_review_state() {
        let pricing = PricingTable::default();
        let request = OrderRequest::from_checkout(&review_state(), &pricing).unwrap();
        assert_eq!(request.payment_method, PaymentMethod::Bank);
        assert_eq!(request.cart.len(), SeedCart::builtin().cart().len());
        assert!(request.summary.shipping.charged().is_some());

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["shipping_method"], "standard");
        assert_eq!(json["contact"]["email"], "buyer@example.ng");
    }

    #[test]
    fn test_request_requires_contact() {
        let state = CheckoutState::new(Cart::default());
        assert!(matches!(
            OrderRequest::from_checkout(&state, &PricingTable::default()),
            Err(OrderError::Incomplete(_))
        ));
    }

    #[tokio::test]
    async fn test_simulated_accepts() {
        let request = OrderRequest::from_checkout(&review_state(), &PricingTable::default()).unwrap();
        let gateway = OrderGateway::Simulated(SimulatedOrderClient::new(Duration::ZERO));
        let reference = gateway.submit(&request).await.unwrap();
        assert!(reference.as_str().starts_with("HB-"));
        assert_eq!(reference.as_str().len(), 11);
    }

    #[tokio::test]
    async fn test_simulated_declines() {
        let request = OrderRequest::from_checkout(&review_state(), &PricingTable::default()).unwrap();
        let client = SimulatedOrderClient::declining(Duration::ZERO, "insufficient funds");
        let err = client.submit(&request).await.unwrap_err();
        let submission = err.to_submission_error();
        assert_eq!(submission.kind, SubmissionErrorKind::PaymentDeclined);
        assert!(submission.message.contains("insufficient funds"));
    }

    #[test]
    fn test_submission_error_mapping() {
        let err = OrderError::Api {
            status: 500,
            message: "boom".to_string(),
        };
        let submission = err.to_submission_error();
        assert_eq!(submission.kind, SubmissionErrorKind::Rejected);
        assert!(!submission.message.contains("boom"));
    }

    #[test]
    fn test_http_client_joins_orders_path() {
        let config = OrderApiConfig {
            base_url: Url::parse("https://orders.hanbit.kr/v1/").unwrap(),
            api_key: SecretString::from("k9$Jx2!pQ7@zR4#m"),
            timeout: Duration::from_secs(1),
        };
        let client = HttpOrderClient::new(&config).unwrap();
        assert_eq!(client.orders_url.as_str(), "https://orders.hanbit.kr/v1/orders");
        assert_eq!(OrderGateway::Http(client).max_latency(), Duration::from_secs(1));
    }

    #[test]
    fn test_simulated_latency_is_its_delay() {
        let gateway = OrderGateway::Simulated(SimulatedOrderClient::new(Duration::from_millis(1500)));
        assert_eq!(gateway.max_latency(), Duration::from_millis(1500));
    }
}

//! End-to-end test harness for the checkout storefront.
//!
//! [`TestApp`] drives the real router in-process with
//! `tower::ServiceExt::oneshot`, carrying the session cookie between
//! requests the way a browser would.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p hanbit-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::IpAddr;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use hanbit_core::PricingTable;
use hanbit_storefront::config::{OrderBackendConfig, StorefrontConfig};
use hanbit_storefront::middleware::session::SESSION_COOKIE_NAME;
use hanbit_storefront::services::{OrderGateway, SeedCart, SimulatedOrderClient};
use hanbit_storefront::state::AppState;
use tower::ServiceExt;

/// Largest response body the harness reads.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Page headings that identify each step.
pub mod headings {
    pub const CART: &str = "<h1>Your cart</h1>";
    pub const CONTACT: &str = "<h1>Contact details</h1>";
    pub const SHIPPING: &str = "<h1>Shipping address</h1>";
    pub const DELIVERY: &str = "<h1>Shipping method</h1>";
    pub const PAYMENT: &str = "<h1>Payment</h1>";
    pub const REVIEW: &str = "<h1>Review your order</h1>";
    pub const CONFIRMATION: &str = "<h1>Thank you for your order</h1>";
}

/// A response with its body read into a string.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    /// Assert a `303 See Other` back to the checkout page.
    #[track_caller]
    pub fn assert_redirect_to_checkout(&self) {
        assert_eq!(self.status, StatusCode::SEE_OTHER, "body: {}", self.body);
        assert_eq!(self.location(), Some("/checkout"));
    }
}

/// Configuration for an in-process storefront.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        host: IpAddr::from([127, 0, 0, 1]),
        port: 0,
        base_url: "http://localhost:3000".to_string(),
        pricing: PricingTable::default(),
        seed_cart_path: None,
        orders: OrderBackendConfig::Simulated {
            delay: Duration::ZERO,
        },
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// The cart used for arithmetic checks: 89,000 x 1 and 12,000 x 2.
#[must_use]
pub fn worked_example_cart() -> SeedCart {
    SeedCart::from_json(
        r#"[
            {"id":1,"name":"Hyundai Tucson front brake pad set","part_number":"58101-D3A10","unit_price":{"amount":"89000","currency":"KRW"},"quantity":1},
            {"id":2,"name":"Kia Sportage oil filter","part_number":"26300-35505","unit_price":{"amount":"12000","currency":"KRW"},"quantity":2}
        ]"#,
    )
    .expect("worked example cart is valid")
}

/// One buyer's browser against a fresh storefront.
pub struct TestApp {
    router: Router,
    cookie: Option<String>,
}

impl TestApp {
    /// Storefront with the built-in seed cart and an accepting order backend.
    #[must_use]
    pub fn new() -> Self {
        Self::with_services(
            OrderGateway::Simulated(SimulatedOrderClient::new(Duration::ZERO)),
            SeedCart::builtin(),
        )
    }

    #[must_use]
    pub fn with_services(orders: OrderGateway, seed_cart: SeedCart) -> Self {
        let state = AppState::with_services(test_config(), orders, seed_cart);
        Self {
            router: hanbit_storefront::app(state),
            cookie: None,
        }
    }

    pub async fn get(&mut self, path: &str) -> TestResponse {
        let request = Request::builder().method("GET").uri(path);
        self.send(request, Body::empty()).await
    }

    pub async fn post(&mut self, path: &str, form: &[(&str, &str)]) -> TestResponse {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(form)
            .finish();
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        self.send(request, Body::from(body)).await
    }

    /// The checkout page as it stands.
    pub async fn page(&mut self) -> String {
        let response = self.get("/checkout").await;
        assert_eq!(response.status, StatusCode::OK, "body: {}", response.body);
        response.body
    }

    async fn send(&mut self, mut request: axum::http::request::Builder, body: Body) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let request = request.body(body).expect("valid request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        for value in response.headers().get_all(header::SET_COOKIE) {
            let Ok(value) = value.to_str() else { continue };
            let pair = value.split(';').next().unwrap_or_default();
            if pair.starts_with(&format!("{SESSION_COOKIE_NAME}=")) {
                self.cookie = Some(pair.to_string());
            }
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), MAX_BODY_BYTES)
            .await
            .expect("read body");

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    // =========================================================================
    // Step Helpers
    // =========================================================================

    pub async fn submit_contact(&mut self) -> TestResponse {
        self.post(
            "/checkout/contact",
            &[
                ("email", "ada.okafor@example.ng"),
                ("country_code", "+234"),
                ("phone", "8031234567"),
                ("whatsapp_opt_in", "on"),
            ],
        )
        .await
    }

    pub async fn submit_address(&mut self) -> TestResponse {
        self.post(
            "/checkout/shipping",
            &[
                ("first_name", "Ada"),
                ("last_name", "Okafor"),
                ("address1", "12 Marina Road"),
                ("address2", ""),
                ("city", "Lagos"),
                ("state", "Lagos"),
                ("zip", ""),
                ("country", "Nigeria"),
            ],
        )
        .await
    }

    pub async fn submit_card(&mut self) -> TestResponse {
        self.post(
            "/checkout/payment",
            &[
                ("payment_method", "card"),
                ("card_number", "4242 4242 4242 4242"),
                ("card_expiry", "12/29"),
                ("card_cvc", "123"),
                ("card_name", "Ada Okafor"),
            ],
        )
        .await
    }

    /// Place the order from review with the terms box ticked.
    pub async fn place_order(&mut self) -> TestResponse {
        self.post("/checkout/place-order", &[("accept_terms", "on")])
            .await
    }

    /// Walk a fresh checkout to the review step with the given shipping method.
    pub async fn advance_to_review(&mut self, shipping_method: &str) {
        self.page().await;
        self.post("/checkout/cart/continue", &[])
            .await
            .assert_redirect_to_checkout();
        self.submit_contact().await.assert_redirect_to_checkout();
        self.submit_address().await.assert_redirect_to_checkout();
        self.post(
            "/checkout/delivery",
            &[("shipping_method", shipping_method), ("intent", "continue")],
        )
        .await
        .assert_redirect_to_checkout();
        self.submit_card().await.assert_redirect_to_checkout();
        assert!(self.page().await.contains(headings::REVIEW));
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

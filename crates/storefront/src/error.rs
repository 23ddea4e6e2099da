//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. Route handlers return `Result<T, AppError>`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use hanbit_core::{CheckoutError, PricingError};
use thiserror::Error;

use crate::services::orders::OrderError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Reading or writing the session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// The checkout rejected an action.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Order backend failed outside the normal submission flow.
    #[error("Order backend error: {0}")]
    Orders(#[from] OrderError),

    /// The configured pricing table cannot price the checkout.
    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    /// Template rendering failed.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Session(_) | Self::Pricing(_) | Self::Template(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Orders(_) => StatusCode::BAD_GATEWAY,
            Self::Checkout(err) => match err {
                CheckoutError::Cart(_) => StatusCode::NOT_FOUND,
                CheckoutError::TermsNotAccepted | CheckoutError::EmptyCart => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                _ => StatusCode::CONFLICT,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(
            self,
            Self::Session(_)
                | Self::Pricing(_)
                | Self::Template(_)
                | Self::Internal(_)
                | Self::Orders(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, "Rejected request");
        }

        let status = self.status();

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Session(_) | Self::Pricing(_) | Self::Template(_) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
            Self::Orders(_) => "Order service unavailable".to_string(),
            Self::Checkout(err) => capitalize(&err.to_string()),
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for buyer actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of checkout
/// steps leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

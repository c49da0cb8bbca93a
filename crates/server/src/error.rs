//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`; responses are JSON bodies of the form
//! `{"error": "..."}` so the client can show a corrective message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use orchard_core::InvalidOrderStatus;

use crate::checkout::CheckoutError;
use crate::db::RepositoryError;
use crate::services::payments::PaymentError;

/// Application-level error type for the server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Checkout failed; carries the user-visible reason.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Payment collaborator failed.
    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),

    /// Cart quantity below 1.
    #[error("Invalid quantity")]
    InvalidQuantity,

    /// Status outside the allowed set.
    #[error("Invalid order status: {0}")]
    InvalidStatus(String),

    /// Cart item expected but absent.
    #[error("Item not in cart")]
    ItemNotFound,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// No authenticated principal on the request.
    #[error("Unauthorized")]
    Unauthorized,

    /// Principal is not an admin.
    #[error("Forbidden")]
    Forbidden,

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<InvalidOrderStatus> for AppError {
    fn from(err: InvalidOrderStatus) -> Self {
        Self::InvalidStatus(err.0)
    }
}

impl AppError {
    /// Whether this error indicates a server-side fault worth tracking.
    const fn is_server_fault(&self) -> bool {
        matches!(
            self,
            Self::Database(_)
                | Self::Internal(_)
                | Self::Payment(_)
                | Self::Checkout(CheckoutError::Store(_))
        )
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Internal(_) | Self::Checkout(CheckoutError::Store(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Checkout(CheckoutError::EmptyCart) | Self::InvalidQuantity => {
                StatusCode::BAD_REQUEST
            }
            // The cart no longer matches what the catalog can fulfill.
            Self::Checkout(
                CheckoutError::ProductNotFound(_) | CheckoutError::InsufficientStock { .. },
            ) => StatusCode::CONFLICT,
            Self::Payment(_) => StatusCode::BAD_GATEWAY,
            Self::InvalidStatus(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::ItemNotFound | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
        }
    }

    /// Client-facing message. Internal detail is never exposed.
    fn client_message(&self) -> String {
        match self {
            Self::Database(_) | Self::Internal(_) | Self::Checkout(CheckoutError::Store(_)) => {
                "Internal server error".to_string()
            }
            Self::Checkout(err) => match err {
                CheckoutError::EmptyCart => "Your cart is empty".to_string(),
                CheckoutError::ProductNotFound(id) => {
                    format!("Product {id} is no longer available")
                }
                CheckoutError::InsufficientStock {
                    product_id,
                    available,
                    requested,
                } => format!(
                    "Not enough stock for product {product_id}: {available} available, {requested} requested"
                ),
                CheckoutError::Store(_) => "Internal server error".to_string(),
            },
            Self::Payment(_) => "Payment setup failed".to_string(),
            Self::InvalidQuantity => "Quantity must be at least 1".to_string(),
            Self::InvalidStatus(status) => format!("Invalid order status: {status}"),
            Self::ItemNotFound => "Item not in cart".to_string(),
            Self::NotFound(what) => format!("Not found: {what}"),
            Self::Unauthorized => "Authentication required".to_string(),
            Self::Forbidden => "Admin access required".to_string(),
            Self::BadRequest(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_fault() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = Json(json!({ "error": self.client_message() }));
        (self.status_code(), body).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

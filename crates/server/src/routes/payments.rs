//! Payment intent route.

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde_json::{Value, json};

use crate::checkout::CheckoutError;
use crate::db::CartRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::state::AppState;

/// `POST /api/create-payment-intent` - create a Stripe payment intent for
/// the caller's current cart.
///
/// The amount is always derived server-side from the cart; a client-sent
/// amount is never trusted. Payment setup is decoupled from order
/// creation: a failure here has no effect on cart or stock state.
pub async fn create_intent(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
) -> Result<Json<Value>> {
    let lines = CartRepository::new(state.pool())
        .list_lines(principal.user_id)
        .await?;
    let total: Decimal = lines.iter().map(|line| line.subtotal).sum();
    if lines.is_empty() || total <= Decimal::ZERO {
        return Err(AppError::Checkout(CheckoutError::EmptyCart));
    }

    let intent = state
        .payments()
        .create_payment_intent(total, principal.user_id)
        .await?;
    Ok(Json(json!({ "clientSecret": intent.client_secret })))
}

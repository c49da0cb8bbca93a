//! Cart routes, including checkout.

use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use orchard_core::ProductId;

use crate::db::{self, CartRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::routes::orders::OrderView;
use crate::state::AppState;

/// `GET /api/cart` - the caller's cart lines and running total.
pub async fn list(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
) -> Result<Json<Value>> {
    let lines = CartRepository::new(state.pool())
        .list_lines(principal.user_id)
        .await?;
    let total: Decimal = lines.iter().map(|line| line.subtotal).sum();
    Ok(Json(json!({ "cart": lines, "total": total })))
}

/// `GET /api/cart/count` - total quantity across the caller's cart.
pub async fn count(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
) -> Result<Json<Value>> {
    let count = CartRepository::new(state.pool())
        .count(principal.user_id)
        .await?;
    Ok(Json(json!({ "count": count })))
}

/// `POST /api/cart/add/{product_id}` - add one unit of a product.
///
/// No stock check happens here; an over-added cart is caught at checkout.
pub async fn add(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
    Path(product_id): Path<i32>,
) -> Result<Json<Value>> {
    let product_id = ProductId::new(product_id);
    let product = ProductRepository::new(state.pool())
        .get(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;

    CartRepository::new(state.pool())
        .add_item(principal.user_id, product_id)
        .await?;
    Ok(Json(
        json!({ "message": format!("{} added to cart", product.name) }),
    ))
}

/// `POST /api/cart/remove/{product_id}` - remove a product.
///
/// Idempotent: removing an absent item still succeeds.
pub async fn remove(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
    Path(product_id): Path<i32>,
) -> Result<Json<Value>> {
    CartRepository::new(state.pool())
        .remove_item(principal.user_id, ProductId::new(product_id))
        .await?;
    Ok(Json(json!({ "message": "Item removed from cart" })))
}

/// Request body for quantity updates.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantity {
    pub quantity: i32,
}

/// `POST /api/cart/update/{product_id}` - set an existing line's quantity.
///
/// Fails with `InvalidQuantity` below 1 and `ItemNotFound` when the line
/// does not exist (removal goes through the remove endpoint instead).
pub async fn update(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
    Path(product_id): Path<i32>,
    Json(body): Json<UpdateQuantity>,
) -> Result<Json<Value>> {
    if body.quantity < 1 {
        return Err(AppError::InvalidQuantity);
    }

    let updated = CartRepository::new(state.pool())
        .set_quantity(principal.user_id, ProductId::new(product_id), body.quantity)
        .await?;
    if !updated {
        return Err(AppError::ItemNotFound);
    }
    Ok(Json(json!({ "message": "Cart updated" })))
}

/// `POST /api/cart/checkout` - convert the cart into an order.
///
/// Runs the checkout engine in a single transaction; any failure leaves
/// cart, stock and orders untouched.
#[instrument(skip_all)]
pub async fn checkout(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
) -> Result<Json<Value>> {
    let receipt = db::checkout::checkout(state.pool(), principal.user_id).await?;
    let order = OrderView::from(&receipt);
    Ok(Json(json!({ "message": "Order placed", "order": order })))
}

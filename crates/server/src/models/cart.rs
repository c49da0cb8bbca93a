//! Cart domain types.

use rust_decimal::Decimal;
use serde::Serialize;

use orchard_core::{ProductId, UserId};

/// A raw persisted cart row: one (user, product) pair and its quantity.
///
/// The store keys rows by (user, product), but the checkout engine never
/// assumes that and re-aggregates quantities per product id before use.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct CartRow {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: i32,
}

/// A cart line joined against the current catalog, for display.
///
/// `subtotal` reflects the product's *current* price; the price is only
/// locked in at checkout time.
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub quantity: i32,
    pub subtotal: Decimal,
}

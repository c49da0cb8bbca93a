//! Catalog domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use orchard_core::ProductId;

/// A catalog product.
///
/// `stock` is only ever decremented by a successful checkout; the schema
/// backs the non-negativity invariant with a `CHECK` constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Longer text description.
    pub description: String,
    /// Unit price in the store currency.
    pub price: Decimal,
    /// Units available for purchase.
    pub stock: i32,
}

/// Fields accepted when creating or updating a product.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub stock: i32,
}

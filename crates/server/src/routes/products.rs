//! Public product routes.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};

use orchard_core::ProductId;

use crate::db::{ProductFilter, ProductRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::state::AppState;

/// Search parameters for the product listing.
///
/// Everything arrives as a string from the query form; price bounds that
/// fail to parse are ignored rather than rejected, matching the listing's
/// permissive search behavior.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    #[serde(default)]
    pub search_name: Option<String>,
    #[serde(default)]
    pub search_description: Option<String>,
    #[serde(default)]
    pub min_price: Option<String>,
    #[serde(default)]
    pub max_price: Option<String>,
}

impl ProductQuery {
    fn into_filter(self) -> ProductFilter {
        ProductFilter {
            name: non_empty(self.search_name),
            description: non_empty(self.search_description),
            min_price: parse_price(self.min_price),
            max_price: parse_price(self.max_price),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_price(value: Option<String>) -> Option<Decimal> {
    value.and_then(|v| v.trim().parse().ok())
}

/// `GET /api/products` - list products with optional search filters.
pub async fn list(
    State(state): State<AppState>,
    RequireUser(_): RequireUser,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Value>> {
    let products = ProductRepository::new(state.pool())
        .list(&query.into_filter())
        .await?;
    Ok(Json(json!({ "products": products })))
}

/// `GET /api/products/{id}` - a single product.
pub async fn get(
    State(state): State<AppState>,
    RequireUser(_): RequireUser,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    let product = ProductRepository::new(state.pool())
        .get(ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
    Ok(Json(json!({ "product": product })))
}

//! Admin routes: catalog CRUD and order status management.
//!
//! Every handler takes [`RequireAdmin`]; that extractor is the single
//! authorization check for admin operations.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::{Value, json};

use orchard_core::{OrderId, OrderStatus, ProductId};

use crate::db::{OrderRepository, ProductFilter, ProductRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::NewProduct;
use crate::routes::orders::OrderView;
use crate::state::AppState;

fn validate_product(new: &NewProduct) -> Result<()> {
    if new.name.trim().is_empty() {
        return Err(AppError::BadRequest("Product name is required".to_string()));
    }
    if new.price.is_sign_negative() {
        return Err(AppError::BadRequest(
            "Price must be non-negative".to_string(),
        ));
    }
    if new.stock < 0 {
        return Err(AppError::BadRequest(
            "Stock must be non-negative".to_string(),
        ));
    }
    Ok(())
}

/// `GET /api/admin/products` - the full catalog.
pub async fn list_products(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<Value>> {
    let products = ProductRepository::new(state.pool())
        .list(&ProductFilter::default())
        .await?;
    Ok(Json(json!({ "products": products })))
}

/// `POST /api/admin/products` - create a product.
pub async fn create_product(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Json(new): Json<NewProduct>,
) -> Result<Json<Value>> {
    validate_product(&new)?;
    let product = ProductRepository::new(state.pool()).create(&new).await?;
    Ok(Json(
        json!({ "message": "Product created", "product": product }),
    ))
}

/// `PUT /api/admin/products/{id}` - update all fields of a product.
pub async fn update_product(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<i32>,
    Json(new): Json<NewProduct>,
) -> Result<Json<Value>> {
    validate_product(&new)?;
    let product = ProductRepository::new(state.pool())
        .update(ProductId::new(id), &new)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
    Ok(Json(
        json!({ "message": "Product updated", "product": product }),
    ))
}

/// `DELETE /api/admin/products/{id}` - delete a product.
///
/// Cart rows referencing the product are removed with it; order items are
/// historical records and keep their weak reference.
pub async fn delete_product(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    let deleted = ProductRepository::new(state.pool())
        .delete(ProductId::new(id))
        .await?;
    if !deleted {
        return Err(AppError::NotFound(format!("product {id}")));
    }
    Ok(Json(json!({ "message": "Product deleted" })))
}

/// `GET /api/admin/orders` - every order in the system.
pub async fn list_orders(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<Value>> {
    let orders = OrderRepository::new(state.pool()).list_all().await?;
    let views: Vec<OrderView> = orders.iter().map(OrderView::from).collect();
    Ok(Json(json!({ "orders": views })))
}

/// Request body for status updates.
#[derive(Debug, Deserialize)]
pub struct UpdateStatus {
    pub status: String,
}

/// `PUT /api/admin/orders/{id}` - set an order's status.
///
/// The new value must parse as a member of the status set (case
/// normalized); direction of the transition is not constrained.
pub async fn update_order_status(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<i32>,
    Json(body): Json<UpdateStatus>,
) -> Result<Json<Value>> {
    let status: OrderStatus = body.status.parse()?;
    let updated = OrderRepository::new(state.pool())
        .update_status(OrderId::new(id), status)
        .await?;
    if !updated {
        return Err(AppError::NotFound(format!("order {id}")));
    }
    Ok(Json(
        json!({ "message": "Order status updated", "status": status }),
    ))
}

//! Order routes and view types.

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Value, json};

use orchard_core::{OrderId, ProductId, UserId};

use crate::checkout::CheckoutReceipt;
use crate::db::OrderRepository;
use crate::error::Result;
use crate::middleware::RequireUser;
use crate::models::{OrderItem, OrderWithItems};
use crate::state::AppState;

/// One order line as shown to clients.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItemView {
    pub product_id: ProductId,
    pub quantity: i32,
    pub price_at_purchase: Decimal,
    pub subtotal: Decimal,
}

impl From<&OrderItem> for OrderItemView {
    fn from(item: &OrderItem) -> Self {
        Self {
            product_id: item.product_id,
            quantity: item.quantity,
            price_at_purchase: item.price_at_purchase,
            subtotal: item.subtotal(),
        }
    }
}

/// An order as shown to clients. Field names match what the web client
/// consumes (`order_id`, `date_created`, numeric `total`).
#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub date_created: DateTime<Utc>,
    pub status: String,
    pub total: Decimal,
    pub items: Vec<OrderItemView>,
}

impl From<&OrderWithItems> for OrderView {
    fn from(order: &OrderWithItems) -> Self {
        Self {
            order_id: order.order.id,
            user_id: order.order.user_id,
            date_created: order.order.created_at,
            status: order.order.status.to_string(),
            total: order.total(),
            items: order.items.iter().map(OrderItemView::from).collect(),
        }
    }
}

impl From<&CheckoutReceipt> for OrderView {
    fn from(receipt: &CheckoutReceipt) -> Self {
        Self {
            order_id: receipt.order.id,
            user_id: receipt.order.user_id,
            date_created: receipt.order.created_at,
            status: receipt.order.status.to_string(),
            total: receipt.total,
            items: receipt.items.iter().map(OrderItemView::from).collect(),
        }
    }
}

/// `GET /api/orders` - the caller's orders, newest first.
pub async fn list_mine(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
) -> Result<Json<Value>> {
    let orders = OrderRepository::new(state.pool())
        .list_by_user(principal.user_id)
        .await?;
    let views: Vec<OrderView> = orders.iter().map(OrderView::from).collect();
    Ok(Json(json!({ "orders": views })))
}

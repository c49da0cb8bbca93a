//! Order domain types.
//!
//! Orders are immutable after creation except for their status. Order items
//! reference products by plain id and carry `price_at_purchase`, so
//! historical totals stay computable after a product is deleted or repriced.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use orchard_core::{OrderId, OrderItemId, OrderStatus, ProductId, UserId};

/// A completed order header.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Owner; never changes after creation.
    pub user_id: UserId,
    /// Lifecycle status, transitioned by admin action only.
    pub status: OrderStatus,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    /// Weak reference: the product may no longer exist.
    pub product_id: ProductId,
    pub quantity: i32,
    /// Unit price captured at checkout, never recomputed.
    pub price_at_purchase: Decimal,
}

impl OrderItem {
    /// Line subtotal at the locked-in price.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.price_at_purchase * Decimal::from(self.quantity)
    }
}

/// An order header with its items.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

impl OrderWithItems {
    /// Order total, derived from the items rather than stored.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(OrderItem::subtotal).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orchard_core::{OrderId, OrderItemId, ProductId, UserId};
    use rust_decimal::dec;

    fn item(id: i32, quantity: i32, price: Decimal) -> OrderItem {
        OrderItem {
            id: OrderItemId::new(id),
            order_id: OrderId::new(1),
            product_id: ProductId::new(id),
            quantity,
            price_at_purchase: price,
        }
    }

    #[test]
    fn test_total_is_derived_from_items() {
        let order = OrderWithItems {
            order: Order {
                id: OrderId::new(1),
                user_id: UserId::new(1),
                status: OrderStatus::Pending,
                created_at: Utc::now(),
            },
            items: vec![item(1, 3, dec!(9.99)), item(2, 1, dec!(0.05))],
        };
        assert_eq!(order.total(), dec!(30.02));
    }

    #[test]
    fn test_empty_order_totals_zero() {
        let order = OrderWithItems {
            order: Order {
                id: OrderId::new(2),
                user_id: UserId::new(1),
                status: OrderStatus::Pending,
                created_at: Utc::now(),
            },
            items: vec![],
        };
        assert_eq!(order.total(), Decimal::ZERO);
    }
}

//! `PostgreSQL` implementation of the checkout store.
//!
//! The whole checkout (read cart, validate products, write order rows,
//! deduct stock, clear cart) runs inside one transaction. The engine sees
//! the transaction through the [`CheckoutStore`] trait; commit happens only
//! after the engine returns `Ok`, and dropping the transaction on `Err`
//! rolls every mutation back.

use sqlx::{PgPool, Postgres, Transaction};

use orchard_core::{OrderId, OrderStatus, ProductId, UserId};

use super::RepositoryError;
use crate::checkout::{self, CheckoutError, CheckoutReceipt, CheckoutStore, OrderLine};
use crate::models::{CartRow, Order, OrderItem, Product};

impl CheckoutStore for Transaction<'_, Postgres> {
    async fn cart_rows(&mut self, user_id: UserId) -> Result<Vec<CartRow>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartRow>(
            r"
            SELECT user_id, product_id, quantity
            FROM cart_items
            WHERE user_id = $1
            ORDER BY product_id
            ",
        )
        .bind(user_id)
        .fetch_all(&mut **self)
        .await?;
        Ok(rows)
    }

    async fn product(
        &mut self,
        product_id: ProductId,
    ) -> Result<Option<Product>, RepositoryError> {
        // FOR UPDATE serializes concurrent checkouts touching the same
        // product; without it two transactions could both read the last
        // unit as available.
        let product = sqlx::query_as::<_, Product>(
            r"
            SELECT id, name, description, price, stock
            FROM products
            WHERE id = $1
            FOR UPDATE
            ",
        )
        .bind(product_id)
        .fetch_optional(&mut **self)
        .await?;
        Ok(product)
    }

    async fn insert_order(&mut self, user_id: UserId) -> Result<Order, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(
            r"
            INSERT INTO orders (user_id, status)
            VALUES ($1, $2)
            RETURNING id, user_id, status, created_at
            ",
        )
        .bind(user_id)
        .bind(OrderStatus::Pending)
        .fetch_one(&mut **self)
        .await?;
        Ok(order)
    }

    async fn insert_order_item(
        &mut self,
        order_id: OrderId,
        line: &OrderLine,
    ) -> Result<OrderItem, RepositoryError> {
        let item = sqlx::query_as::<_, OrderItem>(
            r"
            INSERT INTO order_items (order_id, product_id, quantity, price_at_purchase)
            VALUES ($1, $2, $3, $4)
            RETURNING id, order_id, product_id, quantity, price_at_purchase
            ",
        )
        .bind(order_id)
        .bind(line.product_id)
        .bind(line.quantity)
        .bind(line.price_at_purchase)
        .fetch_one(&mut **self)
        .await?;
        Ok(item)
    }

    async fn deduct_stock(
        &mut self,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<bool, RepositoryError> {
        // Conditional update: applies only while enough stock remains, so
        // the stock >= 0 invariant holds even under concurrent checkouts.
        let result = sqlx::query(
            "UPDATE products SET stock = stock - $2 WHERE id = $1 AND stock >= $2",
        )
        .bind(product_id)
        .bind(quantity)
        .execute(&mut **self)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear_cart(&mut self, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut **self)
            .await?;
        Ok(())
    }
}

/// Run a checkout for `user_id` as a single database transaction.
///
/// # Errors
///
/// Returns [`CheckoutError`]; on error the transaction is rolled back and
/// no persisted state changes.
pub async fn checkout(pool: &PgPool, user_id: UserId) -> Result<CheckoutReceipt, CheckoutError> {
    let mut tx = pool.begin().await.map_err(RepositoryError::from)?;
    let receipt = checkout::run(&mut tx, user_id).await?;
    tx.commit().await.map_err(RepositoryError::from)?;
    Ok(receipt)
}

//! Cart repository.
//!
//! The cart is a per-user mapping of product to quantity, enforced
//! structurally by the `(user_id, product_id)` primary key. Mutations are
//! deliberately permissive: adding never checks stock (over-adding is
//! caught at checkout) and removing an absent item is a no-op.

use rust_decimal::Decimal;
use sqlx::PgPool;

use orchard_core::{ProductId, UserId};

use super::RepositoryError;
use crate::models::CartLine;

#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    product_id: ProductId,
    name: String,
    price: Decimal,
    quantity: i32,
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Add one unit of a product to the user's cart.
    ///
    /// Creates the row with quantity 1, or increments the existing row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails (including
    /// a foreign key violation for a product that does not exist).
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO cart_items (user_id, product_id, quantity)
            VALUES ($1, $2, 1)
            ON CONFLICT (user_id, product_id)
            DO UPDATE SET quantity = cart_items.quantity + 1
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Remove a product from the user's cart. Idempotent: removing an
    /// absent item succeeds and changes nothing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn remove_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2")
            .bind(user_id)
            .bind(product_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Set the quantity of an existing cart row.
    ///
    /// Returns `false` if the row does not exist; the caller decides how to
    /// report that. Quantity validation (>= 1) happens at the API boundary.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn set_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("UPDATE cart_items SET quantity = $3 WHERE user_id = $1 AND product_id = $2")
                .bind(user_id)
                .bind(product_id)
                .bind(quantity)
                .execute(self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List the user's cart joined against the current catalog.
    ///
    /// The inner join silently drops rows whose product no longer exists;
    /// stale references are a display-path tolerance only (checkout treats
    /// them as a hard failure).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_lines(&self, user_id: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineRow>(
            r"
            SELECT c.product_id, p.name, p.price, c.quantity
            FROM cart_items c
            JOIN products p ON p.id = c.product_id
            WHERE c.user_id = $1
            ORDER BY c.product_id
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| CartLine {
                product_id: row.product_id,
                name: row.name,
                price: row.price,
                quantity: row.quantity,
                subtotal: row.price * Decimal::from(row.quantity),
            })
            .collect())
    }

    /// Total quantity across all of the user's cart rows.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(quantity), 0)::BIGINT FROM cart_items WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;
        Ok(count)
    }

    /// Delete every cart row for the user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn clear(&self, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}

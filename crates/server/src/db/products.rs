//! Product repository: catalog CRUD and stock adjustments.

use rust_decimal::Decimal;
use sqlx::{PgPool, QueryBuilder};

use orchard_core::ProductId;

use super::RepositoryError;
use crate::models::{NewProduct, Product};

/// Optional filters for product listings.
///
/// Matches the search form of the storefront: substring match on name and
/// description, inclusive price bounds.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub name: Option<String>,
    pub description: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

/// Repository for catalog database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products matching the filter, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let mut query = QueryBuilder::new(
            "SELECT id, name, description, price, stock FROM products WHERE TRUE",
        );
        if let Some(name) = &filter.name {
            query.push(" AND name ILIKE ");
            query.push_bind(format!("%{name}%"));
        }
        if let Some(description) = &filter.description {
            query.push(" AND description ILIKE ");
            query.push_bind(format!("%{description}%"));
        }
        if let Some(min_price) = filter.min_price {
            query.push(" AND price >= ");
            query.push_bind(min_price);
        }
        if let Some(max_price) = filter.max_price {
            query.push(" AND price <= ");
            query.push_bind(max_price);
        }
        query.push(" ORDER BY id");

        let products = query
            .build_query_as::<Product>()
            .fetch_all(self.pool)
            .await?;
        Ok(products)
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, description, price, stock FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(product)
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, new: &NewProduct) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            r"
            INSERT INTO products (name, description, price, stock)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, price, stock
            ",
        )
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.price)
        .bind(new.stock)
        .fetch_one(self.pool)
        .await?;
        Ok(product)
    }

    /// Update all fields of a product. Returns `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &self,
        id: ProductId,
        new: &NewProduct,
    ) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            r"
            UPDATE products
            SET name = $2, description = $3, price = $4, stock = $5
            WHERE id = $1
            RETURNING id, name, description, price, stock
            ",
        )
        .bind(id)
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.price)
        .bind(new.stock)
        .fetch_optional(self.pool)
        .await?;
        Ok(product)
    }

    /// Delete a product, removing any cart rows that reference it first.
    ///
    /// Cart rows must not dangle on a deleted product; order items keep
    /// their plain-id reference and are untouched. Returns `false` if the
    /// product did not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either delete fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM cart_items WHERE product_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    /// Adjust stock by a signed delta (restock or manual correction).
    ///
    /// The update is conditional: it refuses to take stock below zero, in
    /// which case (or if the product is missing) `None` is returned.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update_stock(
        &self,
        id: ProductId,
        delta: i32,
    ) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            r"
            UPDATE products
            SET stock = stock + $2
            WHERE id = $1 AND stock + $2 >= 0
            RETURNING id, name, description, price, stock
            ",
        )
        .bind(id)
        .bind(delta)
        .fetch_optional(self.pool)
        .await?;
        Ok(product)
    }
}

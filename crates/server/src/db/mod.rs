//! Database operations for the Orchard `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `users` - Identity rows referenced by carts and orders
//! - `products` - Catalog
//! - `cart_items` - Per-user cart, keyed by (user, product)
//! - `orders` / `order_items` - Completed checkouts
//! - `tower_sessions` - Session storage (managed by tower-sessions)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p orchard-cli -- migrate
//! ```

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub mod cart;
pub mod checkout;
pub mod orders;
pub mod products;

pub use cart::CartRepository;
pub use orders::OrderRepository;
pub use products::{ProductFilter, ProductRepository};

/// Errors from the repository layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A persisted value failed to decode into its domain type.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

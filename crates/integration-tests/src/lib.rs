//! Integration tests for Orchard.
//!
//! The tests under `tests/` run the repository layer against a real
//! `PostgreSQL` database and are ignored by default.
//!
//! # Running Tests
//!
//! ```bash
//! # Point at a migrated test database
//! export ORCHARD_DATABASE_URL=postgres://localhost/orchard_test
//! cargo run -p orchard-cli -- migrate
//!
//! # Run the ignored tests
//! cargo test -p orchard-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `cart_store` - Cart repository behavior
//! - `catalog_store` - Product repository behavior
//!
//! Every test creates its own uniquely-named fixtures and removes them on
//! the way out, so the suite can run repeatedly against a shared database.

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use orchard_core::{ProductId, UserId};
use orchard_server::db::ProductRepository;
use orchard_server::models::{NewProduct, Product};

/// Connect to the test database named by `ORCHARD_DATABASE_URL`.
///
/// # Panics
///
/// Panics when the variable is unset or the database is unreachable; the
/// tests cannot do anything useful without it.
pub async fn test_pool() -> PgPool {
    let url = std::env::var("ORCHARD_DATABASE_URL")
        .expect("ORCHARD_DATABASE_URL must point at a migrated test database");
    PgPool::connect(&url)
        .await
        .expect("Failed to connect to test database")
}

fn unique_suffix() -> String {
    let mut suffix = Uuid::new_v4().simple().to_string();
    suffix.truncate(12);
    suffix
}

/// Insert a throwaway user row. The username fits the 20-character column.
pub async fn create_test_user(pool: &PgPool) -> UserId {
    let username = format!("it-{}", unique_suffix());
    let email = format!("{username}@test.invalid");
    sqlx::query_scalar::<_, UserId>(
        "INSERT INTO users (username, email) VALUES ($1, $2) RETURNING id",
    )
    .bind(&username)
    .bind(&email)
    .fetch_one(pool)
    .await
    .expect("Failed to create test user")
}

/// Insert a throwaway product through the repository under test.
pub async fn create_test_product(pool: &PgPool, price: Decimal, stock: i32) -> Product {
    ProductRepository::new(pool)
        .create(&NewProduct {
            name: format!("it-product-{}", unique_suffix()),
            description: "integration test fixture".to_string(),
            price,
            stock,
        })
        .await
        .expect("Failed to create test product")
}

/// Best-effort cleanup: cart rows go with the user via `ON DELETE CASCADE`.
pub async fn remove_test_user(pool: &PgPool, user_id: UserId) {
    let _ = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await;
}

/// Best-effort cleanup through the repository's cascading delete.
pub async fn remove_test_product(pool: &PgPool, product_id: ProductId) {
    let _ = ProductRepository::new(pool).delete(product_id).await;
}

//! Demo data seeding for local development.

use rust_decimal::dec;

use super::{CommandError, connect};

/// Insert a small demo catalog. No-op if any products already exist.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or an insert
/// fails.
pub async fn products() -> Result<(), CommandError> {
    let pool = connect().await?;

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(&pool)
        .await?;
    if existing > 0 {
        tracing::info!(existing, "catalog already seeded, skipping");
        return Ok(());
    }

    let demo = [
        ("Canvas Tote", "Heavy cotton tote bag", dec!(14.50), 40),
        ("Enamel Mug", "12 oz camping mug", dec!(9.99), 25),
        ("Field Notebook", "48-page dot grid", dec!(6.00), 100),
        ("Beeswax Candle", "Hand-poured, 20 hour burn", dec!(12.25), 18),
    ];

    for (name, description, price, stock) in demo {
        sqlx::query("INSERT INTO products (name, description, price, stock) VALUES ($1, $2, $3, $4)")
            .bind(name)
            .bind(description)
            .bind(price)
            .bind(stock)
            .execute(&pool)
            .await?;
    }

    tracing::info!(count = demo.len(), "demo catalog seeded");
    Ok(())
}

//! CLI command implementations.

use thiserror::Error;

pub mod admin;
pub mod migrate;
pub mod seed;

/// Errors shared by all CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Connect to the database named by `ORCHARD_DATABASE_URL`.
pub(crate) async fn connect() -> Result<sqlx::PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("ORCHARD_DATABASE_URL")
        .map_err(|_| CommandError::MissingEnvVar("ORCHARD_DATABASE_URL"))?;

    Ok(sqlx::PgPool::connect(&database_url).await?)
}

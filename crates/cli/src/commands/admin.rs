//! Admin user management.
//!
//! Credentials are owned by the external identity layer; this command only
//! maintains the identity row and its admin flag.

use super::{CommandError, connect};

/// Create an admin user, or promote an existing user with the same email.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or the upsert
/// fails.
pub async fn create_user(username: &str, email: &str) -> Result<(), CommandError> {
    let pool = connect().await?;

    let id: i32 = sqlx::query_scalar(
        r"
        INSERT INTO users (username, email, is_admin)
        VALUES ($1, $2, TRUE)
        ON CONFLICT (email) DO UPDATE SET is_admin = TRUE
        RETURNING id
        ",
    )
    .bind(username)
    .bind(email)
    .fetch_one(&pool)
    .await?;

    tracing::info!(user_id = id, email, "admin user ready");
    Ok(())
}

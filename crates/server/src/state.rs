//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::services::PaymentClient;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pool: PgPool,
    payments: PaymentClient,
}

impl AppState {
    /// Create a new application state. Only what handlers actually reach
    /// for is held here; the rest of the config stays with `main`.
    #[must_use]
    pub fn new(config: &ServerConfig, pool: PgPool) -> Self {
        let payments = PaymentClient::new(&config.stripe);
        Self {
            inner: Arc::new(AppStateInner { pool, payments }),
        }
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the Stripe payment client.
    #[must_use]
    pub fn payments(&self) -> &PaymentClient {
        &self.inner.payments
    }
}

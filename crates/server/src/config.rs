//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ORCHARD_DATABASE_URL` - `PostgreSQL` connection string
//! - `STRIPE_SECRET_KEY` - Stripe API secret key
//!
//! ## Optional
//! - `ORCHARD_HOST` - Bind address (default: 127.0.0.1)
//! - `ORCHARD_PORT` - Listen port (default: 5000)
//! - `ORCHARD_BASE_URL` - Public URL (default: http://localhost:5000)
//! - `STRIPE_CURRENCY` - ISO 4217 currency code, lowercase (default: usd)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the server
    pub base_url: String,
    /// Stripe payment configuration
    pub stripe: StripeConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Stripe payment collaborator configuration.
///
/// Implements `Debug` manually to redact the secret key.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe API secret key (server-side only)
    pub secret_key: SecretString,
    /// Currency every payment intent is created in (lowercase ISO 4217)
    pub currency: String,
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("secret_key", &"[REDACTED]")
            .field("currency", &self.currency)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = SecretString::from(require("ORCHARD_DATABASE_URL")?);

        let host: IpAddr = optional("ORCHARD_HOST")
            .unwrap_or_else(|| "127.0.0.1".to_string())
            .parse()
            .map_err(|e| invalid("ORCHARD_HOST", &e))?;

        let port: u16 = optional("ORCHARD_PORT")
            .unwrap_or_else(|| "5000".to_string())
            .parse()
            .map_err(|e| invalid("ORCHARD_PORT", &e))?;

        let base_url =
            optional("ORCHARD_BASE_URL").unwrap_or_else(|| "http://localhost:5000".to_string());

        let stripe = StripeConfig {
            secret_key: SecretString::from(require("STRIPE_SECRET_KEY")?),
            currency: optional("STRIPE_CURRENCY").unwrap_or_else(|| "usd".to_string()),
        };

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            stripe,
            sentry_dsn: optional("SENTRY_DSN"),
            sentry_environment: optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Socket address the server binds to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Read a required environment variable.
fn require(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

/// Read an optional environment variable, treating empty values as unset.
fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn invalid(name: &str, err: &impl std::fmt::Display) -> ConfigError {
    ConfigError::InvalidEnvVar(name.to_string(), err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> ServerConfig {
        ServerConfig {
            database_url: SecretString::from("postgres://localhost/orchard_test"),
            host: "0.0.0.0".parse().expect("valid addr"),
            port: 8080,
            base_url: "http://localhost:8080".to_string(),
            stripe: StripeConfig {
                secret_key: SecretString::from("sk_test_123"),
                currency: "usd".to_string(),
            },
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    #[test]
    fn test_socket_addr() {
        assert_eq!(test_config().socket_addr().to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn test_stripe_debug_redacts_secret() {
        let output = format!("{:?}", test_config().stripe);
        assert!(output.contains("[REDACTED]"));
        assert!(!output.contains("sk_test_123"));
    }
}

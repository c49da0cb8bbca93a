//! Stripe `PaymentIntent` client.
//!
//! The payment collaborator is consulted by the checkout flow but owns no
//! part of it: a failure here never touches cart, stock or order state.
//! Amounts are always derived server-side and converted to minor units
//! through [`orchard_core::to_minor_units`].

use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use orchard_core::{UserId, to_minor_units};

use crate::config::StripeConfig;

/// Stripe API base URL.
const BASE_URL: &str = "https://api.stripe.com/v1";

/// Errors that can occur when creating a payment intent.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Amount is not a positive whole number of minor units.
    #[error("invalid payment amount: {0}")]
    InvalidAmount(Decimal),

    /// Failed to parse the API response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// A created payment intent. `client_secret` goes to the browser to
/// complete the payment; nothing else from the response is needed.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

/// Stripe API client.
#[derive(Clone)]
pub struct PaymentClient {
    client: reqwest::Client,
    secret_key: SecretString,
    currency: String,
}

impl PaymentClient {
    /// Create a new payment client.
    #[must_use]
    pub fn new(config: &StripeConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key: config.secret_key.clone(),
            currency: config.currency.clone(),
        }
    }

    /// Create a payment intent for `amount` (in the configured currency).
    ///
    /// The amount must be positive; the caller's user id is attached as
    /// metadata so payments can be traced back to an account. Each call
    /// carries a fresh idempotency key.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::InvalidAmount` without any network call if
    /// the amount does not convert to a positive number of minor units;
    /// otherwise `PaymentError::Http`/`Api`/`Parse` for request failures.
    pub async fn create_payment_intent(
        &self,
        amount: Decimal,
        user_id: UserId,
    ) -> Result<PaymentIntent, PaymentError> {
        let minor_units = to_minor_units(amount)
            .filter(|cents| *cents > 0)
            .ok_or(PaymentError::InvalidAmount(amount))?;

        let params = [
            ("amount", minor_units.to_string()),
            ("currency", self.currency.clone()),
            ("metadata[user_id]", user_id.to_string()),
        ];

        let response = self
            .client
            .post(format!("{BASE_URL}/payment_intents"))
            .basic_auth(self.secret_key.expose_secret(), None::<&str>)
            .header("Idempotency-Key", Uuid::new_v4().to_string())
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<PaymentIntent>()
            .await
            .map_err(|e| PaymentError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::dec;

    use super::*;

    fn test_client() -> PaymentClient {
        PaymentClient::new(&StripeConfig {
            secret_key: SecretString::from("sk_test_000"),
            currency: "usd".to_string(),
        })
    }

    #[tokio::test]
    async fn test_rejects_zero_amount() {
        let err = test_client()
            .create_payment_intent(Decimal::ZERO, UserId::new(1))
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::InvalidAmount(_)));
    }

    #[tokio::test]
    async fn test_rejects_negative_amount() {
        let err = test_client()
            .create_payment_intent(dec!(-5.00), UserId::new(1))
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::InvalidAmount(_)));
    }

    #[tokio::test]
    async fn test_rejects_sub_cent_amount() {
        let err = test_client()
            .create_payment_intent(dec!(1.005), UserId::new(1))
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::InvalidAmount(_)));
    }
}

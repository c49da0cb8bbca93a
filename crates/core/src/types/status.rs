//! Order status.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when parsing an unknown order status value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid order status: {0}")]
pub struct InvalidOrderStatus(pub String);

/// Lifecycle status of an order.
///
/// New orders start as `Pending`. Transitions are admin-only and
/// deliberately unconstrained in direction: fulfillment corrections
/// (e.g. a mis-clicked `Delivered` rolled back to `Shipped`) are routine,
/// so no ordering is enforced beyond membership in this set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    Pending,
    Shipped,
    Delivered,
}

impl OrderStatus {
    /// Canonical string form, as persisted and as shown to clients.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = InvalidOrderStatus;

    /// Parse a status, normalizing case ("shipped", "SHIPPED" and
    /// "Shipped" are all accepted).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            _ => Err(InvalidOrderStatus(s.to_string())),
        }
    }
}

// Persisted as TEXT; decode goes through the case-normalizing parser so a
// hand-edited row with odd casing still loads.
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for OrderStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <&str as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <&str as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for OrderStatus {
    fn decode(
        value: sqlx::postgres::PgValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(raw.parse::<Self>()?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for OrderStatus {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_parse_is_case_normalized() {
        assert_eq!(OrderStatus::from_str("Pending"), Ok(OrderStatus::Pending));
        assert_eq!(OrderStatus::from_str("shipped"), Ok(OrderStatus::Shipped));
        assert_eq!(
            OrderStatus::from_str("  DELIVERED  "),
            Ok(OrderStatus::Delivered)
        );
    }

    #[test]
    fn test_parse_rejects_unknown_status() {
        let err = OrderStatus::from_str("Cancelled").unwrap_err();
        assert_eq!(err, InvalidOrderStatus("Cancelled".to_string()));
    }

    #[test]
    fn test_display_roundtrip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ] {
            assert_eq!(OrderStatus::from_str(&status.to_string()), Ok(status));
        }
    }
}

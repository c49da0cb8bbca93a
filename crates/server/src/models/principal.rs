//! Authenticated principal.
//!
//! Authentication itself lives outside this service: the identity layer
//! writes the principal into the session, and every handler here only ever
//! sees the result. See `middleware::auth` for the extractors.

use serde::{Deserialize, Serialize};

use orchard_core::UserId;

/// The authenticated caller for a request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Principal {
    /// The caller's user id.
    pub user_id: UserId,
    /// Whether the caller may perform admin-only operations.
    pub is_admin: bool,
}

/// Session storage keys.
pub mod session_keys {
    /// The serialized [`Principal`](super::Principal) for the session.
    pub const PRINCIPAL: &str = "principal";
}

//! Request middleware: sessions and principal extraction.

pub mod auth;
pub mod session;

pub use auth::{RequireAdmin, RequireUser};
pub use session::create_session_layer;

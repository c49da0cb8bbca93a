//! Core types for Orchard.

pub mod id;
pub mod money;
pub mod status;

pub use id::*;
pub use money::to_minor_units;
pub use status::{InvalidOrderStatus, OrderStatus};

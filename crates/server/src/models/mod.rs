//! Domain types for the server.

pub mod cart;
pub mod order;
pub mod principal;
pub mod product;

pub use cart::{CartLine, CartRow};
pub use order::{Order, OrderItem, OrderWithItems};
pub use principal::{Principal, session_keys};
pub use product::{NewProduct, Product};

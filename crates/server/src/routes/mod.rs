//! Route handlers for the JSON API.
//!
//! All routes live under `/api`. User routes require an authenticated
//! principal; `/api/admin` routes additionally require the admin flag.

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

pub mod admin;
pub mod cart;
pub mod orders;
pub mod payments;
pub mod products;

/// Build the API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(products::list))
        .route("/api/products/{id}", get(products::get))
        .route("/api/cart", get(cart::list))
        .route("/api/cart/count", get(cart::count))
        .route("/api/cart/add/{product_id}", post(cart::add))
        .route("/api/cart/remove/{product_id}", post(cart::remove))
        .route("/api/cart/update/{product_id}", post(cart::update))
        .route("/api/cart/checkout", post(cart::checkout))
        .route("/api/create-payment-intent", post(payments::create_intent))
        .route("/api/orders", get(orders::list_mine))
        .route(
            "/api/admin/products",
            get(admin::list_products).post(admin::create_product),
        )
        .route(
            "/api/admin/products/{id}",
            put(admin::update_product).delete(admin::delete_product),
        )
        .route("/api/admin/orders", get(admin::list_orders))
        .route("/api/admin/orders/{id}", put(admin::update_order_status))
}

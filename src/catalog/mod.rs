//! Product catalog and cart routes
//!
//! Just enough of the shop to drive checkout: products carry the stock
//! counters the order workflow reserves from, carts are what orders are
//! placed from.

pub mod handlers;

use crate::server::AppState;
use axum::{Router, routing::get};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/products",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route("/products/{id}", get(handlers::get_product))
        .route("/carts", axum::routing::post(handlers::create_cart))
        .route("/carts/{id}", get(handlers::get_cart))
}

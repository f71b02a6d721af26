//! Order workflow and its HTTP routes
//!
//! - POST /orders - Place an order from a cart
//! - POST /orders/capture - Mark an order as paid and confirmed
//! - GET /orders/user/{user_id} - Orders of a user, newest first
//! - GET /orders/{id} - Order details
//! - POST /orders/{id}/cancel - Cancel a pending, unpaid order
//! - POST /orders/status - Admin status update

pub mod handlers;
pub mod workflow;

pub use workflow::OrderWorkflow;

use crate::server::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", post(handlers::create_order))
        .route("/orders/capture", post(handlers::capture_payment))
        .route("/orders/status", post(handlers::update_order_status))
        .route("/orders/user/{user_id}", get(handlers::list_user_orders))
        .route("/orders/{id}", get(handlers::get_order))
        .route("/orders/{id}/cancel", post(handlers::cancel_order))
}

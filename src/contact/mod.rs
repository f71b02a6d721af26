//! Contact form messages

pub mod handlers;

use crate::server::AppState;
use axum::{Router, routing::post};

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/contact",
        post(handlers::submit_message).get(handlers::list_messages),
    )
}

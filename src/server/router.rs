//! Route assembly and HTTP middleware

use super::state::AppState;
use crate::core::error::ConfigError;
use crate::{catalog, contact, orders};
use anyhow::Result;
use axum::{
    Json, Router,
    http::{HeaderValue, Method, header},
    routing::get,
};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the complete application router
///
/// Merges health, order, catalog and contact routes with any custom routes,
/// then wraps everything in request tracing and, when an origin is given,
/// a credentialed CORS policy for that origin.
pub fn build_router(
    state: AppState,
    custom_routes: Vec<Router>,
    cors_origin: Option<&str>,
) -> Result<Router> {
    let mut app = health_routes()
        .merge(orders::routes())
        .merge(catalog::routes())
        .merge(contact::routes())
        .with_state(state);

    for custom_router in custom_routes {
        app = app.merge(custom_router);
    }

    if let Some(origin) = cors_origin {
        app = app.layer(cors_layer(origin)?);
    }

    Ok(app.layer(TraceLayer::new_for_http()))
}

/// CORS policy for the storefront frontend
pub fn cors_layer(origin: &str) -> Result<CorsLayer> {
    let origin = origin
        .parse::<HeaderValue>()
        .map_err(|_| ConfigError::InvalidValue {
            field: "server.cors_origin".to_string(),
            value: origin.to_string(),
            message: "not a valid origin header value".to_string(),
        })?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::CACHE_CONTROL,
            header::EXPIRES,
            header::PRAGMA,
        ]))
}

fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "storefront"
    }))
}

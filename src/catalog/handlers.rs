//! HTTP handlers for products and carts

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::{Value, json};

use crate::core::entity::Entity;
use crate::core::error::{EntityError, StorefrontError};
use crate::core::extractors::{ValidJson, parse_id};
use crate::entities::{Cart, NewCart, NewProduct, Product};
use crate::server::AppState;

pub async fn list_products(State(state): State<AppState>) -> Result<Json<Value>, StorefrontError> {
    let products = state.storage.products.list().await?;

    Ok(Json(json!({
        "success": true,
        "data": products,
    })))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, StorefrontError> {
    let id = parse_id(&id)?;
    let product = state
        .storage
        .products
        .get(&id)
        .await?
        .ok_or_else(|| EntityError::not_found(Product::resource_name_singular(), id))?;

    Ok(Json(json!({
        "success": true,
        "data": product,
    })))
}

pub async fn create_product(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<NewProduct>,
) -> Result<(StatusCode, Json<Value>), StorefrontError> {
    let product = state.storage.products.insert(Product::new(payload)).await?;

    tracing::info!(product_id = %product.id, stock = product.total_stock, "Product created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": product,
        })),
    ))
}

pub async fn create_cart(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<NewCart>,
) -> Result<(StatusCode, Json<Value>), StorefrontError> {
    let cart = state.storage.carts.insert(Cart::new(payload)).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": cart,
        })),
    ))
}

pub async fn get_cart(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, StorefrontError> {
    let id = parse_id(&id)?;
    let cart = state
        .storage
        .carts
        .get(&id)
        .await?
        .ok_or_else(|| EntityError::not_found(Cart::resource_name_singular(), id))?;

    Ok(Json(json!({
        "success": true,
        "data": cart,
    })))
}

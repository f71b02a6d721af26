//! HTTP handlers for the order workflow

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::StorefrontError;
use crate::core::extractors::{ValidJson, parse_id};
use crate::core::status::OrderStatus;
use crate::entities::NewOrder;
use crate::server::AppState;

/// Request body for `POST /orders/capture`
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CaptureRequest {
    pub order_id: Uuid,
}

/// Request body for `POST /orders/status`
///
/// Unknown status strings fail to deserialize and are rejected with 400.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    pub order_id: Uuid,
    pub status: OrderStatus,
}

pub async fn create_order(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<NewOrder>,
) -> Result<(StatusCode, Json<Value>), StorefrontError> {
    let order = state.workflow.create_order(payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Order created successfully and cart cleared.",
            "orderId": order.id,
        })),
    ))
}

pub async fn capture_payment(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<CaptureRequest>,
) -> Result<Json<Value>, StorefrontError> {
    let order = state.workflow.capture_payment(payload.order_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Order confirmed",
        "data": order,
    })))
}

pub async fn list_user_orders(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, StorefrontError> {
    let orders = state.workflow.orders_for_user(&user_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": orders,
    })))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, StorefrontError> {
    let order = state.workflow.order_details(parse_id(&id)?).await?;

    Ok(Json(json!({
        "success": true,
        "data": order,
    })))
}

pub async fn cancel_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, StorefrontError> {
    let order = state.workflow.cancel_order(parse_id(&id)?).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Order canceled successfully!",
        "data": order,
    })))
}

pub async fn update_order_status(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<StatusUpdateRequest>,
) -> Result<Json<Value>, StorefrontError> {
    let order = state
        .workflow
        .update_status(payload.order_id, payload.status)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("Order status updated to {}", order.order_status),
        "data": order,
    })))
}

//! HTTP handlers for the contact form

use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};

use crate::core::error::StorefrontError;
use crate::core::extractors::ValidJson;
use crate::entities::{ContactMessage, NewContactMessage};
use crate::server::AppState;

const SEND_FAILED: &str = "Failed to send message.";
const FETCH_FAILED: &str = "Failed to fetch messages.";

pub async fn submit_message(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<NewContactMessage>,
) -> Result<(StatusCode, Json<Value>), StorefrontError> {
    let message = state
        .storage
        .contacts
        .insert(ContactMessage::new(payload))
        .await
        .map_err(|e| StorefrontError::from(e).reported_as(SEND_FAILED))?;

    tracing::info!(message_id = %message.id, "Contact message received");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Message sent successfully!",
        })),
    ))
}

pub async fn list_messages(State(state): State<AppState>) -> Result<Json<Value>, StorefrontError> {
    let messages = state
        .storage
        .contacts
        .list()
        .await
        .map_err(|e| StorefrontError::from(e).reported_as(FETCH_FAILED))?;

    Ok(Json(json!({
        "success": true,
        "data": messages,
    })))
}

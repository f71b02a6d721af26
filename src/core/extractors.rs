//! Axum extractors for validated request payloads and path identifiers

use crate::core::error::{StorefrontError, ValidationError};
use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use uuid::Uuid;
use validator::Validate;

/// Axum extractor that deserializes and validates a JSON body
///
/// # Usage
///
/// ```rust,ignore
/// pub async fn submit(
///     ValidJson(payload): ValidJson<NewContactMessage>,
/// ) -> Result<Json<Value>, StorefrontError> {
///     // payload passed every #[validate] rule
/// }
/// ```
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = StorefrontError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state).await.map_err(|e| {
            ValidationError::InvalidJson {
                message: e.body_text(),
            }
        })?;

        payload.validate()?;

        Ok(ValidJson(payload))
    }
}

/// Parse a path segment as a UUID
pub fn parse_id(raw: &str) -> Result<Uuid, StorefrontError> {
    Uuid::parse_str(raw).map_err(|_| {
        ValidationError::InvalidUuid {
            value: raw.to_string(),
        }
        .into()
    })
}

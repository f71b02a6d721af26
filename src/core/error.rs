//! Typed error handling for the storefront backend
//!
//! Handlers and the order workflow return [`StorefrontError`], which knows its
//! HTTP status, a stable machine-readable code and how to render itself as a
//! JSON body. Store implementations stay on `anyhow::Result` and are lifted
//! into [`StorageError`] at the workflow boundary.
//!
//! # Error Categories
//!
//! - [`EntityError`]: a referenced order, product or cart does not exist
//! - [`OrderError`]: a business rule of the order workflow was violated
//! - [`ValidationError`]: the request payload or path was malformed
//! - [`StorageError`]: the backing store failed
//! - [`ConfigError`]: configuration could not be loaded
//!
//! # Example
//!
//! ```rust,ignore
//! match workflow.cancel_order(id).await {
//!     Ok(order) => println!("canceled {}", order.id),
//!     Err(StorefrontError::Order(OrderError::InvalidState { .. })) => {
//!         println!("order is no longer cancelable");
//!     }
//!     Err(e) => eprintln!("other error: {}", e),
//! }
//! ```

use crate::core::status::{OrderStatus, PaymentStatus};
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Message shown to clients for every server-side failure
pub const GENERIC_FAILURE_MESSAGE: &str = "Some error occurred!";

/// The main error type of the storefront backend
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// A referenced entity does not exist
    #[error(transparent)]
    Entity(#[from] EntityError),

    /// Order workflow rule violations
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Request validation errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Storage backend errors
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A server-side failure reported to clients under its own message
    #[error("{source}")]
    Reported {
        message: &'static str,
        source: Box<StorefrontError>,
    },
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Always `false`, mirrors the `success` flag of successful responses
    pub success: bool,
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Underlying failure text for server-side errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl StorefrontError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            StorefrontError::Entity(e) => e.status_code(),
            StorefrontError::Order(e) => e.status_code(),
            StorefrontError::Validation(_) => StatusCode::BAD_REQUEST,
            StorefrontError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            StorefrontError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            StorefrontError::Reported { source, .. } => source.status_code(),
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            StorefrontError::Entity(e) => e.error_code(),
            StorefrontError::Order(e) => e.error_code(),
            StorefrontError::Validation(e) => e.error_code(),
            StorefrontError::Storage(_) => "STORAGE_ERROR",
            StorefrontError::Config(_) => "CONFIG_ERROR",
            StorefrontError::Reported { source, .. } => source.error_code(),
        }
    }

    /// Whether the failure is on the server side (5xx)
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Report a server-side failure under `message` instead of
    /// [`GENERIC_FAILURE_MESSAGE`]; client errors are returned unchanged
    pub fn reported_as(self, message: &'static str) -> Self {
        if self.is_server_error() {
            StorefrontError::Reported {
                message,
                source: Box::new(self),
            }
        } else {
            self
        }
    }

    fn failure_message(&self) -> &'static str {
        match self {
            StorefrontError::Reported { message, .. } => message,
            _ => GENERIC_FAILURE_MESSAGE,
        }
    }

    /// Convert to an error response
    ///
    /// Server-side failures never leak their text into `message`; it is
    /// attached under `error` instead.
    pub fn to_response(&self) -> ErrorResponse {
        let (message, error) = if self.is_server_error() {
            (self.failure_message().to_string(), Some(self.to_string()))
        } else {
            (self.to_string(), None)
        };

        ErrorResponse {
            success: false,
            code: self.error_code().to_string(),
            message,
            error,
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            StorefrontError::Reported { source, .. } => source.details(),
            StorefrontError::Entity(EntityError::NotFound { entity_type, id }) => {
                Some(serde_json::json!({
                    "entity_type": entity_type,
                    "id": id.to_string()
                }))
            }
            StorefrontError::Order(OrderError::InsufficientStock {
                order_id,
                product_id,
                available,
                requested,
            }) => Some(serde_json::json!({
                "order_id": order_id.to_string(),
                "product_id": product_id.to_string(),
                "available": available,
                "requested": requested
            })),
            StorefrontError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for StorefrontError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        } else {
            tracing::debug!(code = self.error_code(), error = %self, "request rejected");
        }
        (status, Json(self.to_response())).into_response()
    }
}

/// Lift a store failure into the generic storage catch-all
impl From<anyhow::Error> for StorefrontError {
    fn from(err: anyhow::Error) -> Self {
        StorefrontError::Storage(StorageError::Backend {
            message: format!("{:#}", err),
        })
    }
}

// =============================================================================
// Entity Errors
// =============================================================================

/// Errors related to looking up stored entities
#[derive(Debug, Error)]
pub enum EntityError {
    /// Entity was not found
    #[error("{entity_type} with id '{id}' not found")]
    NotFound { entity_type: String, id: Uuid },
}

impl EntityError {
    /// Shorthand for a missing entity of the given type
    pub fn not_found(entity_type: &str, id: Uuid) -> Self {
        EntityError::NotFound {
            entity_type: entity_type.to_string(),
            id,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            EntityError::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            EntityError::NotFound { .. } => "ENTITY_NOT_FOUND",
        }
    }
}

// =============================================================================
// Order Errors
// =============================================================================

/// Business rule violations raised by the order workflow
#[derive(Debug, Error)]
pub enum OrderError {
    /// Cancel attempted on an order that is not pending or already paid
    #[error(
        "Only unpaid and pending orders can be canceled (order '{id}' is {status} / {payment_status})"
    )]
    InvalidState {
        id: Uuid,
        status: OrderStatus,
        payment_status: PaymentStatus,
    },

    /// Delivery attempted without enough inventory
    #[error(
        "Not enough stock to deliver order '{order_id}': product '{product_id}' has {available}, {requested} requested"
    )]
    InsufficientStock {
        order_id: Uuid,
        product_id: Uuid,
        available: i64,
        requested: i64,
    },

    /// The order changed between read and write
    #[error("Order '{id}' was modified concurrently (expected status {expected})")]
    Conflict { id: Uuid, expected: OrderStatus },
}

impl OrderError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            OrderError::InvalidState { .. } => StatusCode::BAD_REQUEST,
            OrderError::InsufficientStock { .. } => StatusCode::BAD_REQUEST,
            OrderError::Conflict { .. } => StatusCode::CONFLICT,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            OrderError::InvalidState { .. } => "ORDER_INVALID_STATE",
            OrderError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            OrderError::Conflict { .. } => "ORDER_CONFLICT",
        }
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Multiple field validation errors
    #[error("Validation errors: {}", format_field_errors(.0))]
    FieldErrors(Vec<FieldValidationError>),

    /// Invalid JSON format
    #[error("Invalid JSON: {message}")]
    InvalidJson { message: String },

    /// Invalid UUID format
    #[error("Invalid UUID format: '{value}'")]
    InvalidUuid { value: String },
}

/// A single field validation error
#[derive(Debug, Clone, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

fn format_field_errors(errors: &[FieldValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::FieldErrors(_) => "VALIDATION_ERROR",
            ValidationError::InvalidJson { .. } => "INVALID_JSON",
            ValidationError::InvalidUuid { .. } => "INVALID_UUID",
        }
    }
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldValidationError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| FieldValidationError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        ValidationError::FieldErrors(fields)
    }
}

impl From<validator::ValidationErrors> for StorefrontError {
    fn from(errors: validator::ValidationErrors) -> Self {
        StorefrontError::Validation(errors.into())
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to storage backends
#[derive(Debug, Error)]
pub enum StorageError {
    /// Any failure reported by a store call
    #[error("Storage error: {message}")]
    Backend { message: String },

    /// Connection error
    #[error("Failed to connect to {backend}: {message}")]
    Connection { backend: String, message: String },
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse configuration file
    #[error("Failed to parse config{}: {message}", describe_file(.file))]
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    /// Invalid value in configuration
    #[error("Invalid value '{value}' for field '{field}': {message}")]
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },
}

fn describe_file(file: &Option<String>) -> String {
    file.as_ref()
        .map(|f| format!(" file '{}'", f))
        .unwrap_or_default()
}

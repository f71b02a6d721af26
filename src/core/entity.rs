//! Entity trait shared by every stored document type

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Base trait for all stored documents.
///
/// All entities have:
/// - id: Unique identifier
/// - a resource name used for collection names and error messages
/// - a creation timestamp used for newest-first ordering
pub trait Entity: Clone + Send + Sync + 'static {
    /// The plural resource name (e.g., "orders", "products")
    fn resource_name() -> &'static str;

    /// The singular resource name (e.g., "order", "product")
    fn resource_name_singular() -> &'static str;

    /// Get the unique identifier for this entity instance
    fn id(&self) -> Uuid;

    /// Get the creation timestamp
    fn created_at(&self) -> DateTime<Utc>;
}

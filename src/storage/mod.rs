//! Store implementations for the supported backends

pub mod in_memory;
#[cfg(feature = "mongodb_backend")]
pub mod mongodb;

pub use in_memory::{InMemoryCartStore, InMemoryContactStore, InMemoryOrderStore, InMemoryProductStore};
#[cfg(feature = "mongodb_backend")]
pub use mongodb::{MongoCartStore, MongoContactStore, MongoOrderStore, MongoProductStore};

use crate::config::{StorageBackend, StorageConfig};
use crate::core::service::{CartStore, ContactStore, OrderStore, ProductStore};
use anyhow::Result;
use std::sync::Arc;

/// The set of stores the application runs on
///
/// Cloning is cheap; all clones share the same backends.
#[derive(Clone)]
pub struct Storage {
    pub orders: Arc<dyn OrderStore>,
    pub products: Arc<dyn ProductStore>,
    pub carts: Arc<dyn CartStore>,
    pub contacts: Arc<dyn ContactStore>,
}

impl Storage {
    /// Fresh, empty in-memory stores
    pub fn in_memory() -> Self {
        Self {
            orders: Arc::new(InMemoryOrderStore::new()),
            products: Arc::new(InMemoryProductStore::new()),
            carts: Arc::new(InMemoryCartStore::new()),
            contacts: Arc::new(InMemoryContactStore::new()),
        }
    }

    /// Stores backed by collections of the given MongoDB database
    #[cfg(feature = "mongodb_backend")]
    pub fn mongodb(database: ::mongodb::Database) -> Self {
        Self {
            orders: Arc::new(MongoOrderStore::new(database.clone())),
            products: Arc::new(MongoProductStore::new(database.clone())),
            carts: Arc::new(MongoCartStore::new(database.clone())),
            contacts: Arc::new(MongoContactStore::new(database)),
        }
    }

    /// Build the stores selected by the configuration
    ///
    /// For MongoDB the connection is verified with a `ping` before returning.
    pub async fn from_config(config: &StorageConfig) -> Result<Self> {
        match config.backend {
            StorageBackend::InMemory => {
                tracing::info!("Using in-memory storage");
                Ok(Self::in_memory())
            }
            #[cfg(feature = "mongodb_backend")]
            StorageBackend::MongoDb => {
                use crate::core::error::StorageError;
                use ::mongodb::bson::doc;

                let connection_error = |e: ::mongodb::error::Error| StorageError::Connection {
                    backend: "MongoDB".to_string(),
                    message: e.to_string(),
                };

                let client = ::mongodb::Client::with_uri_str(&config.mongodb.uri)
                    .await
                    .map_err(connection_error)?;
                let database = client.database(&config.mongodb.database);
                database
                    .run_command(doc! { "ping": 1 })
                    .await
                    .map_err(connection_error)?;

                tracing::info!(database = %config.mongodb.database, "Connected to MongoDB");
                Ok(Self::mongodb(database))
            }
            #[cfg(not(feature = "mongodb_backend"))]
            StorageBackend::MongoDb => Err(crate::core::error::ConfigError::InvalidValue {
                field: "storage.backend".to_string(),
                value: "mongodb".to_string(),
                message: "built without the `mongodb_backend` feature".to_string(),
            }
            .into()),
        }
    }
}

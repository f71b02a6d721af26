//! # Storefront
//!
//! REST backend for a small online shop: checkout, payment capture,
//! cancellation and admin status updates for orders, with stock bookkeeping on
//! the product catalog.
//!
//! ## Layout
//!
//! - [`orders`]: the order workflow and its routes
//! - [`catalog`]: products (stock counters) and carts
//! - [`contact`]: contact form messages
//! - [`storage`]: in-memory and MongoDB stores behind the [`core::service`] traits
//! - [`server`]: router assembly and the [`server::ServerBuilder`]
//! - [`config`]: YAML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use storefront::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     ServerBuilder::new()
//!         .with_storage(Storage::in_memory())
//!         .serve("127.0.0.1:5000")
//!         .await
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod contact;
pub mod core;
pub mod entities;
pub mod orders;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        entity::Entity,
        error::{StorefrontError, ValidationError},
        service::{CartStore, ContactStore, OrderStore, ProductStore, StockCheck, StockDelta},
        status::{OrderStatus, PaymentStatus, Transition},
    };

    // === Entities ===
    pub use crate::entities::{
        AddressInfo, Cart, CartItem, ContactMessage, LineItem, NewCart, NewContactMessage,
        NewOrder, NewProduct, Order, Product,
    };

    // === Workflow ===
    pub use crate::orders::OrderWorkflow;

    // === Storage ===
    pub use crate::storage::{
        InMemoryCartStore, InMemoryContactStore, InMemoryOrderStore, InMemoryProductStore,
        Storage,
    };
    #[cfg(feature = "mongodb_backend")]
    pub use crate::storage::{MongoCartStore, MongoContactStore, MongoOrderStore, MongoProductStore};

    // === Config ===
    pub use crate::config::{StorageBackend, StorefrontConfig};

    // === Server ===
    pub use crate::server::{AppState, ServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use uuid::Uuid;
}

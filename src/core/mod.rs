//! Core module containing the fundamental traits and types of the backend

pub mod entity;
pub mod error;
pub mod extractors;
pub mod service;
pub mod status;

pub use entity::Entity;
pub use error::{
    ConfigError, EntityError, OrderError, StorageError, StorefrontError, ValidationError,
};
pub use extractors::{ValidJson, parse_id};
pub use service::{CartStore, ContactStore, OrderStore, ProductStore, StockCheck, StockDelta};
pub use status::{OrderStatus, PaymentStatus, Transition};

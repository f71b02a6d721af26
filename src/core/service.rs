//! Store traits for orders, products, carts and contact messages
//!
//! The workflow and the HTTP handlers only talk to these traits; the
//! backends live in [`crate::storage`].

use crate::core::status::OrderStatus;
use crate::entities::{Cart, ContactMessage, Order, Product};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A relative stock change for one product
///
/// The workflow builds one delta per line item and never merges deltas for
/// the same product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockDelta {
    pub product_id: Uuid,
    pub quantity: i64,
}

impl StockDelta {
    pub fn new(product_id: Uuid, quantity: i64) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

/// Outcome of an all-or-nothing stock reservation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockCheck {
    /// Every delta was applied
    Reserved,
    /// Nothing was applied; `product_id` could not cover its cumulative demand
    Short {
        product_id: Uuid,
        available: i64,
        requested: i64,
    },
}

/// A status write for one stored order
///
/// Only `orderStatus` and, when `touched_at` is set, `orderUpdateDate` are
/// written. Every other field keeps its stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub status: OrderStatus,
    /// New `orderUpdateDate`
    pub touched_at: Option<DateTime<Utc>>,
    /// Write only while the stored status is still this one
    pub expected: Option<OrderStatus>,
}

impl StatusChange {
    pub fn to(status: OrderStatus) -> Self {
        Self {
            status,
            touched_at: None,
            expected: None,
        }
    }

    pub fn touched(mut self, at: DateTime<Utc>) -> Self {
        self.touched_at = Some(at);
        self
    }

    pub fn when(mut self, expected: OrderStatus) -> Self {
        self.expected = Some(expected);
        self
    }
}

/// Storage for order documents
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert a new order
    async fn insert(&self, order: Order) -> Result<Order>;

    /// Get an order by ID
    async fn get(&self, id: &Uuid) -> Result<Option<Order>>;

    /// All orders of a user, most recent `order_date` first
    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Order>>;

    /// Set `paymentStatus: paid` and `orderStatus: confirmed` in place
    ///
    /// Returns the stored order after the write, or `None` if it is gone.
    async fn mark_paid(&self, id: &Uuid) -> Result<Option<Order>>;

    /// Apply a [`StatusChange`] in place
    ///
    /// Returns the stored order after the write. Returns `None` (and writes
    /// nothing) when the order is gone or its stored status differs from
    /// `change.expected`.
    async fn set_status(&self, id: &Uuid, change: StatusChange) -> Result<Option<Order>>;

    /// Delete an order (idempotent)
    async fn delete(&self, id: &Uuid) -> Result<()>;
}

/// Storage for products and their `total_stock` counters
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Insert a new product
    async fn insert(&self, product: Product) -> Result<Product>;

    /// Get a product by ID
    async fn get(&self, id: &Uuid) -> Result<Option<Product>>;

    /// List all products, newest first
    async fn list(&self) -> Result<Vec<Product>>;

    /// Fetch every existing product among `ids` in one call
    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Product>>;

    /// Decrement stock for every delta, or for none of them
    ///
    /// Deltas are applied in order, so repeated products accumulate their
    /// demand. A product that does not exist counts as zero stock. Stock can
    /// never be driven below zero through this call.
    async fn reserve(&self, deltas: &[StockDelta]) -> Result<StockCheck>;

    /// Increment stock for every delta
    ///
    /// Deltas naming a product that no longer exists are skipped.
    async fn restock(&self, deltas: &[StockDelta]) -> Result<()>;
}

/// Storage for shopping carts
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Insert a new cart
    async fn insert(&self, cart: Cart) -> Result<Cart>;

    /// Get a cart by ID
    async fn get(&self, id: &Uuid) -> Result<Option<Cart>>;

    /// Delete a cart, returning whether one was removed
    async fn delete(&self, id: &Uuid) -> Result<bool>;
}

/// Storage for contact form messages
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Insert a new message
    async fn insert(&self, message: ContactMessage) -> Result<ContactMessage>;

    /// List all messages, newest first
    async fn list(&self) -> Result<Vec<ContactMessage>>;
}

/// Total demand per product, in first-seen order
pub fn cumulative_demand(deltas: &[StockDelta]) -> Vec<(Uuid, i64)> {
    let mut demand: Vec<(Uuid, i64)> = Vec::new();
    for delta in deltas {
        match demand.iter_mut().find(|(id, _)| *id == delta.product_id) {
            Some((_, total)) => *total += delta.quantity,
            None => demand.push((delta.product_id, delta.quantity)),
        }
    }
    demand
}

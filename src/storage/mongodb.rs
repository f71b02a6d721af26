//! MongoDB store implementations using the official MongoDB async driver.
//!
//! # Feature flag
//!
//! This module is gated behind the `mongodb_backend` feature flag:
//! ```toml
//! [dependencies]
//! storefront-rs = { version = "0.1", features = ["mongodb_backend"] }
//! ```
//!
//! # Storage model
//!
//! One collection per entity type, named after `T::resource_name()`
//! ("orders", "products", "carts", "contact_messages").
//!
//! # Serialization strategy
//!
//! Entities are serialized via `serde_json::Value` as an intermediate format,
//! then converted to BSON documents. UUIDs and timestamps are therefore stored
//! as strings, and the `id` field is mapped to MongoDB's `_id` convention.
//!
//! # Stock updates
//!
//! `reserve` decrements each line item with a conditional
//! `{ _id, totalStock: { $gte: qty } }` update, which MongoDB applies
//! atomically per document. When one of them does not match, the decrements
//! already applied are given back before `Short` is returned. `restock`
//! takes back its own increments when one of them fails.
//!
//! # Order updates
//!
//! Payment captures and status changes `$set` only the fields they own, so a
//! capture and a status write racing on the same order never overwrite each
//! other.

use crate::core::entity::Entity;
use crate::core::service::{
    CartStore, ContactStore, OrderStore, ProductStore, StatusChange, StockCheck, StockDelta,
};
use crate::core::status::{OrderStatus, PaymentStatus};
use crate::entities::{Cart, ContactMessage, Order, Product};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::Database;
use mongodb::bson::{Bson, Document, doc};
use mongodb::options::ReturnDocument;
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

/// Convert a serde_json::Value (expected to be an Object) into a BSON Document,
/// renaming `id` → `_id` for MongoDB convention.
fn json_to_document(json: serde_json::Value) -> Result<Document> {
    let bson_val = mongodb::bson::to_bson(&json)
        .map_err(|e| anyhow!("Failed to convert JSON to BSON: {}", e))?;

    let mut doc = match bson_val {
        Bson::Document(d) => d,
        _ => return Err(anyhow!("Expected BSON document, got non-object")),
    };

    if let Some(id) = doc.remove("id") {
        doc.insert("_id", id);
    }

    Ok(doc)
}

/// Convert a BSON Document back into a serde_json::Value,
/// renaming `_id` → `id` for domain entity convention.
fn document_to_json(mut doc: Document) -> serde_json::Value {
    if let Some(id) = doc.remove("_id") {
        doc.insert("id", id);
    }

    Bson::Document(doc).into_relaxed_extjson()
}

/// Convert a UUID to its BSON string representation for queries.
fn uuid_bson(id: &Uuid) -> Bson {
    Bson::String(id.to_string())
}

/// Convert a single field value the same way whole entities are converted,
/// so `$set` writes match what `insert` stored.
fn field_bson<V: Serialize>(value: &V) -> Result<Bson> {
    let json = serde_json::to_value(value).map_err(|e| anyhow!("Failed to serialize field: {}", e))?;
    mongodb::bson::to_bson(&json).map_err(|e| anyhow!("Failed to convert JSON to BSON: {}", e))
}

/// Typed access to the collection of one entity type
#[derive(Clone, Debug)]
struct MongoCollection<T> {
    database: Database,
    _marker: std::marker::PhantomData<T>,
}

impl<T: Entity + Serialize + DeserializeOwned> MongoCollection<T> {
    fn new(database: Database) -> Self {
        Self {
            database,
            _marker: std::marker::PhantomData,
        }
    }

    fn collection(&self) -> mongodb::Collection<Document> {
        self.database.collection(T::resource_name())
    }

    fn to_document(entity: &T) -> Result<Document> {
        let json = serde_json::to_value(entity)
            .map_err(|e| anyhow!("Failed to serialize {}: {}", T::resource_name_singular(), e))?;
        json_to_document(json)
    }

    fn from_document(doc: Document) -> Result<T> {
        serde_json::from_value(document_to_json(doc)).map_err(|e| {
            anyhow!(
                "Failed to deserialize {} from document: {}",
                T::resource_name_singular(),
                e
            )
        })
    }

    async fn insert(&self, entity: T) -> Result<T> {
        let doc = Self::to_document(&entity)?;

        self.collection()
            .insert_one(doc)
            .await
            .map_err(|e| anyhow!("Failed to create {}: {}", T::resource_name_singular(), e))?;

        Ok(entity)
    }

    async fn get(&self, id: &Uuid) -> Result<Option<T>> {
        let doc = self
            .collection()
            .find_one(doc! { "_id": uuid_bson(id) })
            .await
            .map_err(|e| anyhow!("Failed to get {}: {}", T::resource_name_singular(), e))?;

        doc.map(Self::from_document).transpose()
    }

    async fn find(&self, filter: Document) -> Result<Vec<T>> {
        let cursor = self
            .collection()
            .find(filter)
            .await
            .map_err(|e| anyhow!("Failed to query {}: {}", T::resource_name(), e))?;

        let docs: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| anyhow!("Failed to collect {}: {}", T::resource_name(), e))?;

        docs.into_iter().map(Self::from_document).collect()
    }

    /// Matching entities, newest first
    ///
    /// Timestamps are stored as RFC 3339 strings whose fractional part varies
    /// in length, so ordering happens after decoding.
    async fn find_newest_first(&self, filter: Document) -> Result<Vec<T>> {
        let mut items = self.find(filter).await?;
        items.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(items)
    }

    /// Apply `update` to the document matching `filter`, returning it as
    /// stored afterwards
    async fn update_one(&self, filter: Document, update: Document) -> Result<Option<T>> {
        let doc = self
            .collection()
            .find_one_and_update(filter, update)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| anyhow!("Failed to update {}: {}", T::resource_name_singular(), e))?;

        doc.map(Self::from_document).transpose()
    }

    async fn delete(&self, id: &Uuid) -> Result<bool> {
        let result = self
            .collection()
            .delete_one(doc! { "_id": uuid_bson(id) })
            .await
            .map_err(|e| anyhow!("Failed to delete {}: {}", T::resource_name_singular(), e))?;

        Ok(result.deleted_count > 0)
    }
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// Order store backed by the `orders` collection
///
/// # Example
///
/// ```rust,ignore
/// use mongodb::Client;
/// use storefront::storage::MongoOrderStore;
///
/// let client = Client::with_uri_str("mongodb://localhost:27017").await?;
/// let store = MongoOrderStore::new(client.database("storefront"));
/// let order = store.insert(order).await?;
/// ```
#[derive(Clone, Debug)]
pub struct MongoOrderStore {
    orders: MongoCollection<Order>,
}

impl MongoOrderStore {
    pub fn new(database: Database) -> Self {
        Self {
            orders: MongoCollection::new(database),
        }
    }
}

#[async_trait]
impl OrderStore for MongoOrderStore {
    async fn insert(&self, order: Order) -> Result<Order> {
        self.orders.insert(order).await
    }

    async fn get(&self, id: &Uuid) -> Result<Option<Order>> {
        self.orders.get(id).await
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Order>> {
        self.orders
            .find_newest_first(doc! { "userId": user_id })
            .await
    }

    async fn mark_paid(&self, id: &Uuid) -> Result<Option<Order>> {
        self.orders
            .update_one(
                doc! { "_id": uuid_bson(id) },
                doc! {
                    "$set": {
                        "paymentStatus": PaymentStatus::Paid.as_str(),
                        "orderStatus": OrderStatus::Confirmed.as_str()
                    }
                },
            )
            .await
    }

    async fn set_status(&self, id: &Uuid, change: StatusChange) -> Result<Option<Order>> {
        let mut filter = doc! { "_id": uuid_bson(id) };
        if let Some(expected) = change.expected {
            filter.insert("orderStatus", expected.as_str());
        }

        let mut fields = doc! { "orderStatus": change.status.as_str() };
        if let Some(at) = change.touched_at {
            fields.insert("orderUpdateDate", field_bson(&at)?);
        }

        self.orders.update_one(filter, doc! { "$set": fields }).await
    }

    async fn delete(&self, id: &Uuid) -> Result<()> {
        self.orders.delete(id).await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

/// Product store backed by the `products` collection
#[derive(Clone, Debug)]
pub struct MongoProductStore {
    products: MongoCollection<Product>,
}

impl MongoProductStore {
    pub fn new(database: Database) -> Self {
        Self {
            products: MongoCollection::new(database),
        }
    }

    /// Apply `$inc` to one product, returning whether the filter matched
    async fn increment(&self, filter: Document, by: i64) -> Result<bool> {
        let result = self
            .products
            .collection()
            .update_one(filter, doc! { "$inc": { "totalStock": by } })
            .await
            .map_err(|e| anyhow!("Failed to adjust stock: {}", e))?;

        Ok(result.matched_count > 0)
    }

    async fn available(&self, id: &Uuid) -> Result<i64> {
        Ok(self.products.get(id).await?.map_or(0, |p| p.total_stock))
    }

    /// Unconditionally subtract increments that were already applied
    async fn take_back(&self, applied: &[StockDelta]) {
        for delta in applied {
            if let Err(e) = self
                .increment(doc! { "_id": uuid_bson(&delta.product_id) }, -delta.quantity)
                .await
            {
                tracing::error!(product_id = %delta.product_id, error = %e, "failed to roll back partial restock");
            }
        }
    }
}

#[async_trait]
impl ProductStore for MongoProductStore {
    async fn insert(&self, product: Product) -> Result<Product> {
        self.products.insert(product).await
    }

    async fn get(&self, id: &Uuid) -> Result<Option<Product>> {
        self.products.get(id).await
    }

    async fn list(&self) -> Result<Vec<Product>> {
        self.products.find_newest_first(doc! {}).await
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Product>> {
        let ids: Vec<Bson> = ids.iter().map(uuid_bson).collect();
        self.products.find(doc! { "_id": { "$in": ids } }).await
    }

    async fn reserve(&self, deltas: &[StockDelta]) -> Result<StockCheck> {
        let mut applied: Vec<StockDelta> = Vec::with_capacity(deltas.len());

        for delta in deltas {
            let filter = doc! {
                "_id": uuid_bson(&delta.product_id),
                "totalStock": { "$gte": delta.quantity },
            };

            match self.increment(filter, -delta.quantity).await {
                Ok(true) => applied.push(*delta),
                Ok(false) => {
                    self.restock(&applied).await?;

                    let already: i64 = applied
                        .iter()
                        .filter(|d| d.product_id == delta.product_id)
                        .map(|d| d.quantity)
                        .sum();

                    return Ok(StockCheck::Short {
                        product_id: delta.product_id,
                        available: self.available(&delta.product_id).await?,
                        requested: already + delta.quantity,
                    });
                }
                Err(e) => {
                    if let Err(undo) = self.restock(&applied).await {
                        tracing::error!(error = %undo, "failed to roll back partial stock reservation");
                    }
                    return Err(e);
                }
            }
        }

        Ok(StockCheck::Reserved)
    }

    async fn restock(&self, deltas: &[StockDelta]) -> Result<()> {
        let mut applied: Vec<StockDelta> = Vec::with_capacity(deltas.len());

        for delta in deltas {
            match self
                .increment(doc! { "_id": uuid_bson(&delta.product_id) }, delta.quantity)
                .await
            {
                Ok(true) => applied.push(*delta),
                Ok(false) => {}
                Err(e) => {
                    self.take_back(&applied).await;
                    return Err(e);
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Carts
// ---------------------------------------------------------------------------

/// Cart store backed by the `carts` collection
#[derive(Clone, Debug)]
pub struct MongoCartStore {
    carts: MongoCollection<Cart>,
}

impl MongoCartStore {
    pub fn new(database: Database) -> Self {
        Self {
            carts: MongoCollection::new(database),
        }
    }
}

#[async_trait]
impl CartStore for MongoCartStore {
    async fn insert(&self, cart: Cart) -> Result<Cart> {
        self.carts.insert(cart).await
    }

    async fn get(&self, id: &Uuid) -> Result<Option<Cart>> {
        self.carts.get(id).await
    }

    async fn delete(&self, id: &Uuid) -> Result<bool> {
        self.carts.delete(id).await
    }
}

// ---------------------------------------------------------------------------
// Contact messages
// ---------------------------------------------------------------------------

/// Contact message store backed by the `contact_messages` collection
#[derive(Clone, Debug)]
pub struct MongoContactStore {
    messages: MongoCollection<ContactMessage>,
}

impl MongoContactStore {
    pub fn new(database: Database) -> Self {
        Self {
            messages: MongoCollection::new(database),
        }
    }
}

#[async_trait]
impl ContactStore for MongoContactStore {
    async fn insert(&self, message: ContactMessage) -> Result<ContactMessage> {
        self.messages.insert(message).await
    }

    async fn list(&self) -> Result<Vec<ContactMessage>> {
        self.messages.find_newest_first(doc! {}).await
    }
}

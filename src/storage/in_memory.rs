//! In-memory store implementations for tests, development and demos

use crate::core::entity::Entity;
use crate::core::service::{
    CartStore, ContactStore, OrderStore, ProductStore, StatusChange, StockCheck, StockDelta,
    cumulative_demand,
};
use crate::core::status::{OrderStatus, PaymentStatus};
use crate::entities::{Cart, ContactMessage, Order, Product};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// Thread-safe map of entities keyed by id
///
/// Clones share the same underlying map.
#[derive(Clone)]
struct Collection<T> {
    items: Arc<RwLock<HashMap<Uuid, T>>>,
}

impl<T: Entity> Collection<T> {
    fn new() -> Self {
        Self {
            items: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<Uuid, T>>> {
        self.items
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<Uuid, T>>> {
        self.items
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))
    }

    fn insert(&self, item: T) -> Result<T> {
        self.write()?.insert(item.id(), item.clone());
        Ok(item)
    }

    fn get(&self, id: &Uuid) -> Result<Option<T>> {
        Ok(self.read()?.get(id).cloned())
    }

    /// All items, newest first
    fn list_newest_first(&self) -> Result<Vec<T>> {
        let mut items: Vec<T> = self.read()?.values().cloned().collect();
        items.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(items)
    }
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// In-memory order store
#[derive(Clone)]
pub struct InMemoryOrderStore {
    orders: Collection<Order>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self {
            orders: Collection::new(),
        }
    }
}

impl Default for InMemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: Order) -> Result<Order> {
        self.orders.insert(order)
    }

    async fn get(&self, id: &Uuid) -> Result<Option<Order>> {
        self.orders.get(id)
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Order>> {
        Ok(self
            .orders
            .list_newest_first()?
            .into_iter()
            .filter(|order| order.user_id == user_id)
            .collect())
    }

    async fn mark_paid(&self, id: &Uuid) -> Result<Option<Order>> {
        let mut orders = self.orders.write()?;

        Ok(orders.get_mut(id).map(|stored| {
            stored.payment_status = PaymentStatus::Paid;
            stored.order_status = OrderStatus::Confirmed;
            stored.clone()
        }))
    }

    async fn set_status(&self, id: &Uuid, change: StatusChange) -> Result<Option<Order>> {
        let mut orders = self.orders.write()?;

        let Some(stored) = orders.get_mut(id) else {
            return Ok(None);
        };
        if change.expected.is_some_and(|expected| stored.order_status != expected) {
            return Ok(None);
        }

        stored.order_status = change.status;
        if let Some(at) = change.touched_at {
            stored.order_update_date = at;
        }
        Ok(Some(stored.clone()))
    }

    async fn delete(&self, id: &Uuid) -> Result<()> {
        self.orders.write()?.remove(id);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

/// In-memory product store
///
/// `reserve` checks and decrements under one write lock, which makes it the
/// serialization point for concurrent stock changes.
#[derive(Clone)]
pub struct InMemoryProductStore {
    products: Collection<Product>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self {
            products: Collection::new(),
        }
    }
}

impl Default for InMemoryProductStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn insert(&self, product: Product) -> Result<Product> {
        self.products.insert(product)
    }

    async fn get(&self, id: &Uuid) -> Result<Option<Product>> {
        self.products.get(id)
    }

    async fn list(&self) -> Result<Vec<Product>> {
        self.products.list_newest_first()
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Product>> {
        let products = self.products.read()?;
        Ok(ids.iter().filter_map(|id| products.get(id).cloned()).collect())
    }

    async fn reserve(&self, deltas: &[StockDelta]) -> Result<StockCheck> {
        let mut products = self.products.write()?;

        for (product_id, requested) in cumulative_demand(deltas) {
            let available = products.get(&product_id).map_or(0, |p| p.total_stock);
            if available < requested {
                return Ok(StockCheck::Short {
                    product_id,
                    available,
                    requested,
                });
            }
        }

        for delta in deltas {
            if let Some(product) = products.get_mut(&delta.product_id) {
                product.total_stock -= delta.quantity;
            }
        }

        Ok(StockCheck::Reserved)
    }

    async fn restock(&self, deltas: &[StockDelta]) -> Result<()> {
        let mut products = self.products.write()?;

        for delta in deltas {
            if let Some(product) = products.get_mut(&delta.product_id) {
                product.total_stock += delta.quantity;
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Carts
// ---------------------------------------------------------------------------

/// In-memory cart store
#[derive(Clone)]
pub struct InMemoryCartStore {
    carts: Collection<Cart>,
}

impl InMemoryCartStore {
    pub fn new() -> Self {
        Self {
            carts: Collection::new(),
        }
    }
}

impl Default for InMemoryCartStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn insert(&self, cart: Cart) -> Result<Cart> {
        self.carts.insert(cart)
    }

    async fn get(&self, id: &Uuid) -> Result<Option<Cart>> {
        self.carts.get(id)
    }

    async fn delete(&self, id: &Uuid) -> Result<bool> {
        Ok(self.carts.write()?.remove(id).is_some())
    }
}

// ---------------------------------------------------------------------------
// Contact messages
// ---------------------------------------------------------------------------

/// In-memory contact message store
#[derive(Clone)]
pub struct InMemoryContactStore {
    messages: Collection<ContactMessage>,
}

impl InMemoryContactStore {
    pub fn new() -> Self {
        Self {
            messages: Collection::new(),
        }
    }
}

impl Default for InMemoryContactStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContactStore for InMemoryContactStore {
    async fn insert(&self, message: ContactMessage) -> Result<ContactMessage> {
        self.messages.insert(message)
    }

    async fn list(&self) -> Result<Vec<ContactMessage>> {
        self.messages.list_newest_first()
    }
}

//! Order workflow: checkout, payment capture, cancellation and status updates
//!
//! Every operation is a short sequence of store calls. Where a sequence spans
//! two stores, a failure of the second step undoes the first one:
//!
//! | operation            | step 1            | step 2                         | undo of step 1         |
//! |----------------------|-------------------|--------------------------------|------------------------|
//! | `create_order`       | insert order      | delete cart                    | delete order           |
//! | `cancel_order`       | restock items     | status `pending → canceled`    | reserve items again    |
//! | `update_status` (→ delivered) | reserve items | status write (compare-and-set) | restock items    |
//!
//! Stock is only ever decremented through [`ProductStore::reserve`], which
//! checks and decrements atomically per store. Order writes go through
//! [`OrderStore::mark_paid`] and [`OrderStore::set_status`], which touch only
//! their own fields, so a capture racing a status update survives it.

use crate::core::entity::Entity;
use crate::core::error::{EntityError, OrderError, StorefrontError};
use crate::core::service::{
    CartStore, OrderStore, ProductStore, StatusChange, StockCheck, StockDelta, cumulative_demand,
};
use crate::core::status::{OrderStatus, Transition};
use crate::entities::{NewOrder, Order};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

type Result<T> = std::result::Result<T, StorefrontError>;

/// Orchestrates the order, product and cart stores
#[derive(Clone)]
pub struct OrderWorkflow {
    orders: Arc<dyn OrderStore>,
    products: Arc<dyn ProductStore>,
    carts: Arc<dyn CartStore>,
}

impl OrderWorkflow {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        products: Arc<dyn ProductStore>,
        carts: Arc<dyn CartStore>,
    ) -> Self {
        Self {
            orders,
            products,
            carts,
        }
    }

    /// Place a pending, unpaid order and delete the cart it came from
    ///
    /// No stock is touched. A missing cart is not an error.
    pub async fn create_order(&self, new: NewOrder) -> Result<Order> {
        let order = self.orders.insert(Order::place(new)).await?;

        match self.carts.delete(&order.cart_id).await {
            Ok(removed) => {
                tracing::info!(
                    order_id = %order.id,
                    user_id = %order.user_id,
                    cart_id = %order.cart_id,
                    cart_removed = removed,
                    "Order created"
                );
                Ok(order)
            }
            Err(e) => {
                tracing::warn!(order_id = %order.id, error = %e, "Cart delete failed, removing order");
                if let Err(undo) = self.orders.delete(&order.id).await {
                    tracing::error!(order_id = %order.id, error = %undo, "Failed to remove order after cart delete failure");
                }
                Err(e.into())
            }
        }
    }

    /// Mark an order as paid and confirmed
    ///
    /// Not guarded by the current status; capturing twice yields the same
    /// result.
    pub async fn capture_payment(&self, order_id: Uuid) -> Result<Order> {
        let order = self
            .orders
            .mark_paid(&order_id)
            .await?
            .ok_or_else(|| not_found(order_id))?;

        tracing::info!(order_id = %order.id, "Payment captured");
        Ok(order)
    }

    /// All orders of a user, most recent first
    pub async fn orders_for_user(&self, user_id: &str) -> Result<Vec<Order>> {
        Ok(self.orders.find_by_user(user_id).await?)
    }

    pub async fn order_details(&self, order_id: Uuid) -> Result<Order> {
        self.load(order_id).await
    }

    /// Cancel a pending, unpaid order and give its stock back
    pub async fn cancel_order(&self, order_id: Uuid) -> Result<Order> {
        let order = self.load(order_id).await?;

        if !order.order_status.is_cancelable(order.payment_status) {
            tracing::warn!(
                order_id = %order.id,
                status = %order.order_status,
                payment_status = %order.payment_status,
                "Rejected cancel of non-cancelable order"
            );
            return Err(OrderError::InvalidState {
                id: order.id,
                status: order.order_status,
                payment_status: order.payment_status,
            }
            .into());
        }

        let deltas = order.stock_deltas();
        self.products.restock(&deltas).await?;

        let change = StatusChange::to(OrderStatus::Canceled).when(OrderStatus::Pending);
        match self.orders.set_status(&order.id, change).await {
            Ok(Some(canceled)) => {
                tracing::info!(order_id = %order.id, items = deltas.len(), "Order canceled, stock restored");
                Ok(canceled)
            }
            Ok(None) => {
                self.undo_restock(order.id, &deltas).await;
                Err(OrderError::Conflict {
                    id: order.id,
                    expected: OrderStatus::Pending,
                }
                .into())
            }
            Err(e) => {
                self.undo_restock(order.id, &deltas).await;
                Err(e.into())
            }
        }
    }

    /// Move an order to `status`
    ///
    /// Entering `delivered` first reserves stock for every line item and fails
    /// with [`OrderError::InsufficientStock`] without changing anything when a
    /// product cannot cover its demand. Every other move only writes the
    /// status and refreshes the update timestamp.
    pub async fn update_status(&self, order_id: Uuid, status: OrderStatus) -> Result<Order> {
        let order = self.load(order_id).await?;
        let current = order.order_status;
        let change = StatusChange::to(status).touched(Utc::now());

        match current.transition_to(status) {
            Transition::StatusOnly => {
                let updated = self
                    .orders
                    .set_status(&order.id, change)
                    .await?
                    .ok_or_else(|| not_found(order.id))?;
                tracing::info!(order_id = %order.id, from = %current, to = %status, "Order status updated");
                Ok(updated)
            }
            Transition::ReserveStock => {
                let deltas = order.stock_deltas();
                self.check_stock(&order, &deltas).await?;

                match self.products.reserve(&deltas).await? {
                    StockCheck::Reserved => {}
                    StockCheck::Short {
                        product_id,
                        available,
                        requested,
                    } => {
                        return Err(self.insufficient(&order, product_id, available, requested));
                    }
                }

                match self.orders.set_status(&order.id, change.when(current)).await {
                    Ok(Some(updated)) => {
                        tracing::info!(order_id = %order.id, from = %current, to = %status, items = deltas.len(), "Order delivered, stock deducted");
                        Ok(updated)
                    }
                    Ok(None) => {
                        self.undo_reservation(order.id, &deltas).await;
                        Err(OrderError::Conflict {
                            id: order.id,
                            expected: current,
                        }
                        .into())
                    }
                    Err(e) => {
                        self.undo_reservation(order.id, &deltas).await;
                        Err(e.into())
                    }
                }
            }
        }
    }

    async fn load(&self, order_id: Uuid) -> Result<Order> {
        self.orders
            .get(&order_id)
            .await?
            .ok_or_else(|| not_found(order_id))
    }

    /// Fail fast when the current stock cannot cover the order
    ///
    /// Reads every referenced product in one call; nothing is written.
    async fn check_stock(&self, order: &Order, deltas: &[StockDelta]) -> Result<()> {
        let products = self.products.find_many(&order.product_ids()).await?;

        for (product_id, requested) in cumulative_demand(deltas) {
            let available = products
                .iter()
                .find(|p| p.id == product_id)
                .map_or(0, |p| p.total_stock);
            if available < requested {
                return Err(self.insufficient(order, product_id, available, requested));
            }
        }
        Ok(())
    }

    fn insufficient(
        &self,
        order: &Order,
        product_id: Uuid,
        available: i64,
        requested: i64,
    ) -> StorefrontError {
        tracing::warn!(
            order_id = %order.id,
            product_id = %product_id,
            available,
            requested,
            "Not enough stock to deliver order"
        );
        OrderError::InsufficientStock {
            order_id: order.id,
            product_id,
            available,
            requested,
        }
        .into()
    }

    async fn undo_restock(&self, order_id: Uuid, deltas: &[StockDelta]) {
        match self.products.reserve(deltas).await {
            Ok(StockCheck::Reserved) => {
                tracing::warn!(order_id = %order_id, "Cancel aborted, restored stock taken back");
            }
            Ok(StockCheck::Short { product_id, .. }) => {
                tracing::error!(order_id = %order_id, product_id = %product_id, "Cancel aborted but restored stock was already consumed");
            }
            Err(e) => {
                tracing::error!(order_id = %order_id, error = %e, "Cancel aborted and restored stock could not be taken back");
            }
        }
    }

    async fn undo_reservation(&self, order_id: Uuid, deltas: &[StockDelta]) {
        match self.products.restock(deltas).await {
            Ok(()) => {
                tracing::warn!(order_id = %order_id, "Delivery aborted, reserved stock returned");
            }
            Err(e) => {
                tracing::error!(order_id = %order_id, error = %e, "Delivery aborted and reserved stock could not be returned");
            }
        }
    }
}

fn not_found(order_id: Uuid) -> StorefrontError {
    EntityError::not_found(Order::resource_name_singular(), order_id).into()
}

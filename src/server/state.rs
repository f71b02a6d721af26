//! Shared application state handed to every handler

use crate::orders::OrderWorkflow;
use crate::storage::Storage;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Store handles, used directly by the catalog and contact routes
    pub storage: Storage,

    /// Order workflow running on the same stores
    pub workflow: Arc<OrderWorkflow>,
}

impl AppState {
    pub fn new(storage: Storage) -> Self {
        let workflow = OrderWorkflow::new(
            storage.orders.clone(),
            storage.products.clone(),
            storage.carts.clone(),
        );
        Self {
            storage,
            workflow: Arc::new(workflow),
        }
    }
}

//! Order document and the checkout payload that creates it

use crate::core::entity::Entity;
use crate::core::service::StockDelta;
use crate::core::status::{OrderStatus, PaymentStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Payment method used when the checkout payload does not name one
pub const DEFAULT_PAYMENT_METHOD: &str = "COD";

/// A persisted checkout
///
/// Created once per checkout and never deleted by the workflow. Only
/// `order_status`, `payment_status` and `order_update_date` change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub user_id: String,
    /// Cart this order was placed from; the cart itself is gone after checkout
    pub cart_id: Uuid,
    pub cart_items: Vec<LineItem>,
    #[serde(default)]
    pub address_info: AddressInfo,
    pub order_status: OrderStatus,
    pub payment_method: String,
    pub payment_status: PaymentStatus,
    pub total_amount: f64,
    pub order_date: DateTime<Utc>,
    pub order_update_date: DateTime<Utc>,
}

/// One ordered product with the price it was sold at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub price: f64,
    pub quantity: u32,
}

/// Shipping address snapshot, stored exactly as submitted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pincode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Checkout payload accepted by `POST /orders`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    #[validate(length(min = 1, message = "userId is required"))]
    pub user_id: String,
    pub cart_id: Uuid,
    #[validate(custom(function = "validate_line_items"))]
    pub cart_items: Vec<LineItem>,
    #[serde(default)]
    pub address_info: AddressInfo,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[validate(range(min = 0.0, message = "totalAmount must not be negative"))]
    pub total_amount: f64,
}

fn validate_line_items(items: &[LineItem]) -> Result<(), validator::ValidationError> {
    if items.is_empty() {
        return Err(validator::ValidationError::new("empty")
            .with_message("an order needs at least one line item".into()));
    }
    if items.iter().any(|item| item.quantity == 0) {
        return Err(validator::ValidationError::new("quantity")
            .with_message("every line item needs a quantity of at least 1".into()));
    }
    if items.iter().any(|item| item.price < 0.0) {
        return Err(validator::ValidationError::new("price")
            .with_message("line item prices must not be negative".into()));
    }
    Ok(())
}

impl Order {
    /// Build a pending, unpaid order from a checkout payload
    pub fn place(new: NewOrder) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            cart_id: new.cart_id,
            cart_items: new.cart_items,
            address_info: new.address_info,
            order_status: OrderStatus::Pending,
            payment_method: new
                .payment_method
                .unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string()),
            payment_status: PaymentStatus::Pending,
            total_amount: new.total_amount,
            order_date: now,
            order_update_date: now,
        }
    }

    /// One stock delta per line item, in line item order
    ///
    /// Line items for the same product are not merged.
    pub fn stock_deltas(&self) -> Vec<StockDelta> {
        self.cart_items
            .iter()
            .map(|item| StockDelta::new(item.product_id, i64::from(item.quantity)))
            .collect()
    }

    /// Distinct product ids referenced by the line items
    pub fn product_ids(&self) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = self.cart_items.iter().map(|i| i.product_id).collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

impl Entity for Order {
    fn resource_name() -> &'static str {
        "orders"
    }

    fn resource_name_singular() -> &'static str {
        "order"
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.order_date
    }
}

//! Cart document

use crate::core::entity::Entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A user's shopping cart; deleted when an order is placed from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: Uuid,
    pub user_id: String,
    pub items: Vec<CartItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: Uuid,
    pub quantity: u32,
}

/// Payload accepted by `POST /carts`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewCart {
    #[validate(length(min = 1, message = "userId is required"))]
    pub user_id: String,
    #[serde(default)]
    #[validate(custom(function = "validate_cart_items"))]
    pub items: Vec<CartItem>,
}

fn validate_cart_items(items: &[CartItem]) -> Result<(), validator::ValidationError> {
    if items.iter().any(|item| item.quantity == 0) {
        return Err(validator::ValidationError::new("quantity")
            .with_message("quantity must be at least 1".into()));
    }
    Ok(())
}

impl Cart {
    pub fn new(new: NewCart) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            items: new.items,
            created_at: now,
            updated_at: now,
        }
    }

    /// An empty cart for the given user
    pub fn empty(user_id: &str) -> Self {
        Self::new(NewCart {
            user_id: user_id.to_string(),
            items: Vec::new(),
        })
    }
}

impl Entity for Cart {
    fn resource_name() -> &'static str {
        "carts"
    }

    fn resource_name_singular() -> &'static str {
        "cart"
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

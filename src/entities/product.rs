//! Product document

use crate::core::entity::Entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A catalog product with its available-inventory counter
///
/// `total_stock` only moves through relative increments and decrements
/// issued by the order workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub brand: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub total_stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload accepted by `POST /products`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub brand: String,
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: f64,
    #[validate(range(min = 0.0, message = "salePrice must not be negative"))]
    pub sale_price: Option<f64>,
    pub image: Option<String>,
    #[validate(range(min = 0, message = "totalStock must not be negative"))]
    pub total_stock: i64,
}

impl Product {
    pub fn new(new: NewProduct) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: new.title,
            description: new.description,
            category: new.category,
            brand: new.brand,
            price: new.price,
            sale_price: new.sale_price,
            image: new.image,
            total_stock: new.total_stock,
            created_at: now,
            updated_at: now,
        }
    }

    /// Shorthand used by fixtures and seeding
    pub fn with_stock(title: &str, price: f64, total_stock: i64) -> Self {
        Self::new(NewProduct {
            title: title.to_string(),
            description: String::new(),
            category: String::new(),
            brand: String::new(),
            price,
            sale_price: None,
            image: None,
            total_stock,
        })
    }
}

impl Entity for Product {
    fn resource_name() -> &'static str {
        "products"
    }

    fn resource_name_singular() -> &'static str {
        "product"
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

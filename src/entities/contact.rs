//! Contact form messages

use crate::core::entity::Entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A message submitted through the public contact form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Payload accepted by `POST /contact`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewContactMessage {
    #[validate(length(min = 1, max = 200, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 1, max = 5000, message = "message is required"))]
    pub message: String,
}

impl ContactMessage {
    pub fn new(new: NewContactMessage) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: new.name.trim().to_string(),
            email: new.email.trim().to_lowercase(),
            message: new.message,
            created_at: Utc::now(),
        }
    }
}

impl Entity for ContactMessage {
    fn resource_name() -> &'static str {
        "contact_messages"
    }

    fn resource_name_singular() -> &'static str {
        "contact_message"
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

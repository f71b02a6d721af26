//! Order and payment status enums and the order status transition table

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of an order
///
/// Serialized in camelCase (`"pending"`, `"inProcess"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    InProcess,
    InShipping,
    Delivered,
    Rejected,
    Canceled,
}

/// What has to happen before an order may move to a new status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Stock for every line item must be reserved before the status is written
    ReserveStock,
    /// Only the status and update timestamp change
    StatusOnly,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::InProcess,
        OrderStatus::InShipping,
        OrderStatus::Delivered,
        OrderStatus::Rejected,
        OrderStatus::Canceled,
    ];

    /// Wire representation of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::InProcess => "inProcess",
            OrderStatus::InShipping => "inShipping",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Rejected => "rejected",
            OrderStatus::Canceled => "canceled",
        }
    }

    /// Transition table for admin status updates
    ///
    /// Entering `Delivered` from any other status is the only guarded move.
    /// Every other pair is allowed and leaves stock alone, including moving
    /// away from `Delivered` (stock is not given back) and re-setting the
    /// current status.
    pub fn transition_to(self, target: OrderStatus) -> Transition {
        match (self, target) {
            (OrderStatus::Delivered, _) => Transition::StatusOnly,
            (_, OrderStatus::Delivered) => Transition::ReserveStock,
            _ => Transition::StatusOnly,
        }
    }

    /// Only unpaid orders that are still pending can be canceled
    pub fn is_cancelable(self, payment: PaymentStatus) -> bool {
        self == OrderStatus::Pending && payment != PaymentStatus::Paid
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment status of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

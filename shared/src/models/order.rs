//! Order Model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{OrderId, ProductId, UserId};

/// Order status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Transition table: which status may follow this one.
    ///
    /// `Cancelled` is reachable from every other status and has no
    /// outgoing transitions.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Pending, Cancelled)
                | (Processing, Shipped)
                | (Processing, Cancelled)
                | (Shipped, Delivered)
                | (Shipped, Cancelled)
                | (Delivered, Cancelled)
        )
    }

    /// Locked orders reject edit and delete before any stock work runs.
    pub fn is_locked(self) -> bool {
        matches!(self, OrderStatus::Cancelled | OrderStatus::Delivered)
    }
}

/// Order line item
///
/// `unit_price` is a snapshot of the product price taken when the line
/// was (re)created; `subtotal = quantity * unit_price`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    /// Product reference
    pub product_id: ProductId,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

/// Order entity
///
/// Owns its line items (they live and die with the order row).
/// Invariant outside of an in-flight edit: `total == sum(item.subtotal)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Owning customer reference
    pub customer_id: UserId,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
    pub total: Decimal,
    pub notes: Option<String>,
    pub shipping_address: Option<String>,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency token, bumped on every write
    #[serde(default)]
    pub version: u64,
}

/// Requested order line (product + quantity pair)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrderLineInput {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub customer_id: UserId,
    /// Defaults to "now" when omitted
    pub order_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub shipping_address: Option<String>,
    pub lines: Vec<OrderLineInput>,
}

/// Update order payload
///
/// The line set is replaced wholesale; the engine reconciles stock from
/// the delta between the stored lines and these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub notes: Option<String>,
    pub shipping_address: Option<String>,
    pub lines: Vec<OrderLineInput>,
}

//! Product Model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ProductId;

/// Product entity
///
/// `stock` is only ever written through the engine's stock ledger so that
/// every change is accounted for as an explicit adjustment delta.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// Unit price, 2 decimal places
    pub price: Decimal,
    /// Available units, never negative
    pub stock: i32,
    /// Optional unique SKU (letters, digits, hyphens)
    pub sku: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency token, bumped on every write
    #[serde(default)]
    pub version: u64,
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    /// Initial stock level
    pub stock: i32,
    pub sku: Option<String>,
    pub is_active: Option<bool>,
}

/// Update product payload
///
/// Deliberately has no `stock` field: stock corrections go through the
/// stock ledger entry point, not through a plain update.
///
/// `None` means "leave unchanged". An existing SKU cannot be cleared
/// through this payload, only replaced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub sku: Option<String>,
    pub is_active: Option<bool>,
}

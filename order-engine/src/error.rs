//! Engine error taxonomy
//!
//! Every entry point returns one of these; all validation errors are
//! raised before any write, and the enclosing transaction is rolled back
//! on every error path. Nothing is retried automatically — a
//! `ConcurrencyConflict` or `Persistence` error is the caller's decision
//! to retry.

use shared::FieldError;
use shared::models::{OrderId, OrderStatus, ProductId, UserId};
use thiserror::Error;

use crate::store::StoreError;

/// Engine errors
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    #[error("product '{name}' is not active")]
    ProductInactive { id: ProductId, name: String },

    #[error("insufficient stock for '{name}': available {available}, requested {requested}")]
    InsufficientStock {
        id: ProductId,
        name: String,
        available: i32,
        requested: i32,
    },

    #[error("duplicate line item for product {0}")]
    DuplicateLineItem(ProductId),

    #[error("quantity must be positive for product {product_id}, got {got}")]
    InvalidQuantity { product_id: ProductId, got: i32 },

    #[error("invalid status transition: {from:?} -> {to:?}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("order {id} is locked in status {status:?}")]
    OrderLocked { id: OrderId, status: OrderStatus },

    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    #[error("user not found: {0}")]
    UserNotFound(UserId),

    #[error("not authorized")]
    NotAuthorized,

    #[error("validation failed: {}", join_fields(.0))]
    Validation(Vec<FieldError>),

    #[error("SKU already in use: {0}")]
    DuplicateSku(String),

    #[error("email already in use: {0}")]
    DuplicateEmail(String),

    #[error("product {0} is referenced by existing orders")]
    ProductInUse(ProductId),

    #[error("concurrent modification of {entity} {id}")]
    ConcurrencyConflict { entity: &'static str, id: i64 },

    #[error("storage error: {0}")]
    Persistence(StoreError),
}

pub type EngineResult<T> = Result<T, EngineError>;

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::VersionConflict { entity, id } => {
                EngineError::ConcurrencyConflict { entity, id }
            }
            other => EngineError::Persistence(other),
        }
    }
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

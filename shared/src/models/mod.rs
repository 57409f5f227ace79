//! Data models
//!
//! Shared between the order engine and the presentation layer.
//! All IDs are `i64`; money fields are `rust_decimal::Decimal`.

pub mod order;
pub mod product;
pub mod user;

// Re-exports
pub use order::*;
pub use product::*;
pub use user::*;

/// Product identifier
pub type ProductId = i64;
/// Order identifier
pub type OrderId = i64;
/// User identifier
pub type UserId = i64;

//! Shared types for the order management core
//!
//! Domain models, request payloads, and field-level validation used by
//! the order engine and its callers.

pub mod models;
pub mod validate;

// Re-exports
pub use serde::{Deserialize, Serialize};
pub use validate::FieldError;

//! Order/stock consistency engine
//!
//! Keeps `Product.stock` consistent with the set of active order lines
//! across create, edit, delete and status transitions, inside a single
//! storage transaction per operation.
//!
//! Layering, leaf first:
//! - [`stock`] — atomic adjustment of one product's available quantity
//! - [`reconcile`] — delta between an order's previous and requested lines
//! - [`status`] — legal status transitions and cancellation restoration
//! - [`engine`] — the transaction orchestrator ([`OrderEngine`])
//!
//! Persistence is a redb database ([`store::OrderStore`]); one write
//! transaction is the unit of work for one logical operation.

pub mod clock;
pub mod engine;
pub mod error;
pub mod reconcile;
pub mod status;
pub mod stock;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::OrderEngine;
pub use error::{EngineError, EngineResult};
pub use store::OrderStore;

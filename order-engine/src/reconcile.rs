//! Order line reconciliation
//!
//! Computes the minimal set of stock adjustments between two states of
//! an order's line items: the previous set (empty for a new order) and
//! the requested set. Produces the validated replacement items with
//! freshly snapshotted unit prices, the adjustments for the stock
//! ledger, and the new order total. Performs no writes itself.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use shared::models::{OrderItem, OrderLineInput, ProductId};

use crate::error::{EngineError, EngineResult};
use crate::stock::StockAdjustment;
use crate::store::Uow;

/// Outcome of reconciling an order's lines.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    /// The full replacement line set, unit prices re-snapshotted
    pub items: Vec<OrderItem>,
    /// Ledger adjustments to apply (negative = allocate)
    pub adjustments: Vec<StockAdjustment>,
    /// New order total (sum of item subtotals)
    pub total: Decimal,
}

/// Reconcile `previous` line items against the `requested` lines.
///
/// Duplicate product ids in the request fail with `DuplicateLineItem`
/// before any adjustment is computed. Per line, violations surface in a
/// fixed precedence: unknown product, non-positive quantity, inactive
/// product (only when the line allocates additional units), then
/// insufficient stock net of the previous allocation. The first
/// violation aborts the whole reconciliation.
///
/// Unit prices are re-snapshotted from the current product price even
/// for lines whose quantity did not change.
pub fn reconcile(
    uow: &Uow,
    previous: &[OrderItem],
    requested: &[OrderLineInput],
) -> EngineResult<Reconciliation> {
    let mut seen: HashSet<ProductId> = HashSet::new();
    for line in requested {
        if !seen.insert(line.product_id) {
            return Err(EngineError::DuplicateLineItem(line.product_id));
        }
    }

    let previous_qty: HashMap<ProductId, i32> = previous
        .iter()
        .map(|item| (item.product_id, item.quantity))
        .collect();

    let mut items = Vec::with_capacity(requested.len());
    let mut adjustments = Vec::new();
    let mut total = Decimal::ZERO;

    for line in requested {
        let product = uow
            .product(line.product_id)?
            .ok_or(EngineError::ProductNotFound(line.product_id))?;

        if line.quantity <= 0 {
            return Err(EngineError::InvalidQuantity {
                product_id: line.product_id,
                got: line.quantity,
            });
        }

        // Previous quantities are positive, so with quantity >= 1 this
        // subtraction cannot overflow.
        let prev = previous_qty.get(&line.product_id).copied().unwrap_or(0);
        let delta = line.quantity - prev;

        if delta > 0 && !product.is_active {
            return Err(EngineError::ProductInactive {
                id: product.id,
                name: product.name,
            });
        }
        if delta > product.stock {
            return Err(EngineError::InsufficientStock {
                id: product.id,
                name: product.name,
                available: product.stock,
                requested: delta,
            });
        }

        let unit_price = product.price;
        let subtotal = (unit_price * Decimal::from(line.quantity)).round_dp(2);
        total += subtotal;
        items.push(OrderItem {
            product_id: line.product_id,
            quantity: line.quantity,
            unit_price,
            subtotal,
        });
        if delta != 0 {
            adjustments.push(StockAdjustment {
                product_id: line.product_id,
                delta: -delta,
            });
        }
    }

    // Lines dropped from the order restore their full previous quantity.
    for item in previous {
        if !seen.contains(&item.product_id) {
            adjustments.push(StockAdjustment {
                product_id: item.product_id,
                delta: item.quantity,
            });
        }
    }

    Ok(Reconciliation {
        items,
        adjustments,
        total,
    })
}

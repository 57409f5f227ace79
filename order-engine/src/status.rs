//! Status transition checks and cancellation restoration
//!
//! The transition table itself lives on [`OrderStatus`]; this module
//! turns an illegal pair into the typed error and computes the full
//! restoration deltas applied when an order enters `Cancelled`.

use shared::models::{OrderItem, OrderStatus};

use crate::error::{EngineError, EngineResult};
use crate::stock::StockAdjustment;

/// Check that `from -> to` is a legal transition.
pub fn check_transition(from: OrderStatus, to: OrderStatus) -> EngineResult<()> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(EngineError::InvalidTransition { from, to })
    }
}

/// Full restoration: every line's quantity back to its product.
///
/// Used for cancellation and for order deletion. Always the complete
/// current quantity, however many edits the order went through.
pub fn restoration_deltas(items: &[OrderItem]) -> Vec<StockAdjustment> {
    items
        .iter()
        .map(|item| StockAdjustment {
            product_id: item.product_id,
            delta: item.quantity,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn illegal_transition_is_typed() {
        let err = check_transition(OrderStatus::Shipped, OrderStatus::Processing).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidTransition {
                from: OrderStatus::Shipped,
                to: OrderStatus::Processing,
            }
        ));
    }

    #[test]
    fn restoration_covers_every_line() {
        let items = vec![
            OrderItem {
                product_id: 1,
                quantity: 2,
                unit_price: Decimal::new(100, 2),
                subtotal: Decimal::new(200, 2),
            },
            OrderItem {
                product_id: 2,
                quantity: 1,
                unit_price: Decimal::new(50, 2),
                subtotal: Decimal::new(50, 2),
            },
        ];
        let deltas = restoration_deltas(&items);
        assert_eq!(
            deltas,
            vec![
                StockAdjustment { product_id: 1, delta: 2 },
                StockAdjustment { product_id: 2, delta: 1 },
            ]
        );
    }
}

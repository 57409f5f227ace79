//! Stock ledger
//!
//! The single place where `Product.stock` is written. Every change is an
//! explicit signed adjustment: negative for allocation (an order line
//! consumes units), positive for restoration (a line is removed, reduced
//! or its order cancelled). The write only becomes durable when the
//! enclosing unit of work commits.

use chrono::{DateTime, Utc};
use shared::models::{Product, ProductId};

use crate::error::{EngineError, EngineResult};
use crate::store::Uow;

/// A pending stock change for one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockAdjustment {
    pub product_id: ProductId,
    /// Negative = allocate, positive = restore
    pub delta: i32,
}

/// Apply `delta` to the product's stock inside the given unit of work.
///
/// Fails with `ProductNotFound` for an unknown id, `ProductInactive`
/// when allocating from an inactive product (restores are always
/// allowed), `InsufficientStock` when the result would go negative, and
/// `InvalidQuantity` when it would overflow the stock counter. On any
/// failure the product row is untouched.
pub fn adjust(
    uow: &Uow,
    product_id: ProductId,
    delta: i32,
    now: DateTime<Utc>,
) -> EngineResult<Product> {
    let mut product = uow
        .product(product_id)?
        .ok_or(EngineError::ProductNotFound(product_id))?;

    if delta < 0 && !product.is_active {
        return Err(EngineError::ProductInactive {
            id: product.id,
            name: product.name,
        });
    }

    // Widened so extreme deltas cannot wrap the i32 stock counter.
    let new_stock = i64::from(product.stock) + i64::from(delta);
    if new_stock < 0 {
        return Err(EngineError::InsufficientStock {
            id: product.id,
            available: product.stock,
            requested: delta.saturating_neg(),
            name: product.name,
        });
    }
    let new_stock = i32::try_from(new_stock).map_err(|_| EngineError::InvalidQuantity {
        product_id,
        got: delta,
    })?;

    if delta != 0 {
        product.stock = new_stock;
        product.updated_at = now;
        uow.put_product(&mut product)?;
        tracing::debug!(
            product_id,
            delta,
            stock = new_stock,
            "stock adjusted"
        );
    }
    Ok(product)
}

/// Apply a batch of adjustments in order, stopping at the first failure.
///
/// Callers rely on the unit of work for atomicity: if one adjustment
/// fails, the transaction is rolled back and earlier adjustments in the
/// batch never reach storage.
pub fn apply_all(
    uow: &Uow,
    adjustments: &[StockAdjustment],
    now: DateTime<Utc>,
) -> EngineResult<()> {
    for adjustment in adjustments {
        adjust(uow, adjustment.product_id, adjustment.delta, now)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::OrderStore;
    use rust_decimal::Decimal;

    fn store_with_product(stock: i32, is_active: bool) -> (OrderStore, ProductId) {
        let store = OrderStore::open_in_memory().unwrap();
        let uow = store.begin().unwrap();
        let now = Utc::now();
        let mut product = Product {
            id: uow.next_id("product").unwrap(),
            name: "Widget".to_string(),
            description: "A widget for ledger tests".to_string(),
            price: Decimal::new(500, 2),
            stock,
            sku: None,
            is_active,
            created_at: now,
            updated_at: now,
            version: 0,
        };
        uow.put_product(&mut product).unwrap();
        uow.commit().unwrap();
        (store, product.id)
    }

    #[test]
    fn allocation_reduces_stock() {
        let (store, id) = store_with_product(5, true);
        let uow = store.begin().unwrap();
        let product = adjust(&uow, id, -3, Utc::now()).unwrap();
        assert_eq!(product.stock, 2);
        uow.commit().unwrap();
        assert_eq!(store.product(id).unwrap().unwrap().stock, 2);
    }

    #[test]
    fn stock_never_goes_negative() {
        let (store, id) = store_with_product(2, true);
        let uow = store.begin().unwrap();
        let err = adjust(&uow, id, -3, Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InsufficientStock {
                available: 2,
                requested: 3,
                ..
            }
        ));
        drop(uow);
        // stock unchanged
        assert_eq!(store.product(id).unwrap().unwrap().stock, 2);
    }

    #[test]
    fn unknown_product() {
        let (store, _) = store_with_product(2, true);
        let uow = store.begin().unwrap();
        let err = adjust(&uow, 999, -1, Utc::now()).unwrap_err();
        assert!(matches!(err, EngineError::ProductNotFound(999)));
    }

    #[test]
    fn inactive_product_cannot_allocate_but_can_restore() {
        let (store, id) = store_with_product(5, false);

        let uow = store.begin().unwrap();
        let err = adjust(&uow, id, -1, Utc::now()).unwrap_err();
        assert!(matches!(err, EngineError::ProductInactive { .. }));
        drop(uow);

        let uow = store.begin().unwrap();
        let product = adjust(&uow, id, 4, Utc::now()).unwrap();
        assert_eq!(product.stock, 9);
        uow.commit().unwrap();
    }

    #[test]
    fn overflowing_delta_is_rejected() {
        let (store, id) = store_with_product(5, true);

        let uow = store.begin().unwrap();
        let err = adjust(&uow, id, i32::MAX, Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidQuantity { got: i32::MAX, .. }
        ));
        drop(uow);

        let uow = store.begin().unwrap();
        let err = adjust(&uow, id, i32::MIN, Utc::now()).unwrap_err();
        assert!(matches!(err, EngineError::InsufficientStock { available: 5, .. }));
        drop(uow);

        assert_eq!(store.product(id).unwrap().unwrap().stock, 5);
    }

    #[test]
    fn zero_delta_is_a_no_op() {
        let (store, id) = store_with_product(5, true);
        let before = store.product(id).unwrap().unwrap();

        let uow = store.begin().unwrap();
        adjust(&uow, id, 0, Utc::now()).unwrap();
        uow.commit().unwrap();

        let after = store.product(id).unwrap().unwrap();
        assert_eq!(before.version, after.version);
        assert_eq!(before.stock, after.stock);
    }
}

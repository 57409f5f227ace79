//! Order transaction orchestrator
//!
//! One entry point per logical operation. Each call follows the same
//! shape:
//!
//! ```text
//! entry_point(actor, payload)
//!     ├─ 1. Capability check (privileged / admin / acting customer)
//!     ├─ 2. Field validation of the payload
//!     ├─ 3. Begin unit of work (one redb write transaction)
//!     ├─ 4. Load current rows, reconcile / check transition
//!     ├─ 5. Apply stock ledger adjustments
//!     ├─ 6. Persist order / product / user rows
//!     └─ 7. Commit — any earlier error drops the transaction,
//!           rolling back every write including stock
//! ```
//!
//! Nothing is retried here; a `ConcurrencyConflict` or `Persistence`
//! error goes back to the caller as-is.

#[cfg(test)]
mod tests;

use std::sync::Arc;

use shared::FieldError;
use shared::models::{
    Actor, Order, OrderCreate, OrderId, OrderStatus, OrderUpdate, Product, ProductCreate,
    ProductId, ProductUpdate, User, UserCreate, UserId, UserUpdate,
};
use shared::validate::{
    validate_order_create, validate_order_update, validate_product_create, validate_product_update,
    validate_user_create, validate_user_update,
};
use tracing::info;

use crate::clock::{Clock, SystemClock};
use crate::error::{EngineError, EngineResult};
use crate::reconcile::reconcile;
use crate::status::{check_transition, restoration_deltas};
use crate::stock;
use crate::store::OrderStore;

/// The transaction orchestrator.
///
/// Cheap to clone via the shared store handle; every operation opens its
/// own transaction, so a single instance can serve many callers.
#[derive(Clone)]
pub struct OrderEngine {
    store: OrderStore,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for OrderEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderEngine").finish_non_exhaustive()
    }
}

fn checked(errors: Vec<FieldError>) -> EngineResult<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(EngineError::Validation(errors))
    }
}

impl OrderEngine {
    /// Create an engine over the given store with the wall clock.
    pub fn new(store: OrderStore) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    /// Create an engine with an explicit clock (tests pin time this way).
    pub fn with_clock(store: OrderStore, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Read access to the underlying store.
    pub fn store(&self) -> &OrderStore {
        &self.store
    }

    // ==================== Orders ====================

    /// Create an order with the requested lines.
    ///
    /// Privileged actors may order for any customer; a customer actor
    /// only for themselves. Stock is allocated per line; the order starts
    /// in `Pending`.
    pub fn create_order(&self, actor: &Actor, payload: OrderCreate) -> EngineResult<Order> {
        if !actor.is_privileged() && actor.user_id != payload.customer_id {
            return Err(EngineError::NotAuthorized);
        }
        checked(validate_order_create(&payload))?;

        let now = self.clock.now();
        let uow = self.store.begin()?;

        let customer = uow
            .user(payload.customer_id)?
            .ok_or(EngineError::UserNotFound(payload.customer_id))?;
        if !customer.is_active {
            return Err(EngineError::Validation(vec![FieldError::new(
                "customer_id",
                "customer is not active",
            )]));
        }

        let recon = reconcile(&uow, &[], &payload.lines)?;
        stock::apply_all(&uow, &recon.adjustments, now)?;

        let mut order = Order {
            id: uow.next_id("order")?,
            customer_id: payload.customer_id,
            order_date: payload.order_date.unwrap_or(now),
            status: OrderStatus::Pending,
            total: recon.total,
            notes: payload.notes,
            shipping_address: payload.shipping_address,
            items: recon.items,
            created_at: now,
            updated_at: now,
            version: 0,
        };
        uow.put_order(&mut order)?;
        uow.commit()?;

        info!(
            order_id = order.id,
            customer_id = order.customer_id,
            lines = order.items.len(),
            total = %order.total,
            "order created"
        );
        Ok(order)
    }

    /// Replace an order's line set, reconciling stock from the delta.
    ///
    /// Rejected with `OrderLocked` for cancelled or delivered orders
    /// before any stock computation runs. Unit prices of all lines are
    /// re-snapshotted from current product prices.
    pub fn update_order(
        &self,
        actor: &Actor,
        order_id: OrderId,
        payload: OrderUpdate,
    ) -> EngineResult<Order> {
        if !actor.is_privileged() {
            return Err(EngineError::NotAuthorized);
        }
        checked(validate_order_update(&payload))?;

        let now = self.clock.now();
        let uow = self.store.begin()?;

        let mut order = uow.order(order_id)?.ok_or(EngineError::OrderNotFound(order_id))?;
        if order.status.is_locked() {
            return Err(EngineError::OrderLocked {
                id: order.id,
                status: order.status,
            });
        }

        let recon = reconcile(&uow, &order.items, &payload.lines)?;
        stock::apply_all(&uow, &recon.adjustments, now)?;

        order.items = recon.items;
        order.total = recon.total;
        order.notes = payload.notes;
        order.shipping_address = payload.shipping_address;
        order.updated_at = now;
        uow.put_order(&mut order)?;
        uow.commit()?;

        info!(
            order_id = order.id,
            lines = order.items.len(),
            total = %order.total,
            "order updated"
        );
        Ok(order)
    }

    /// Delete an order, restoring every line's quantity to its product.
    ///
    /// Admin only. Locked orders (cancelled stock was already restored;
    /// delivered orders are history) cannot be deleted.
    pub fn delete_order(&self, actor: &Actor, order_id: OrderId) -> EngineResult<()> {
        if !actor.is_admin() {
            return Err(EngineError::NotAuthorized);
        }

        let now = self.clock.now();
        let uow = self.store.begin()?;

        let order = uow.order(order_id)?.ok_or(EngineError::OrderNotFound(order_id))?;
        if order.status.is_locked() {
            return Err(EngineError::OrderLocked {
                id: order.id,
                status: order.status,
            });
        }

        stock::apply_all(&uow, &restoration_deltas(&order.items), now)?;
        uow.remove_order(order_id)?;
        uow.commit()?;

        info!(order_id, "order deleted");
        Ok(())
    }

    /// Move an order to a new status.
    ///
    /// Legal transitions only; entering `Cancelled` restores every line's
    /// full quantity to its product before the status is written. No
    /// other transition touches stock.
    pub fn transition(
        &self,
        actor: &Actor,
        order_id: OrderId,
        new_status: OrderStatus,
    ) -> EngineResult<Order> {
        if !actor.is_privileged() {
            return Err(EngineError::NotAuthorized);
        }

        let now = self.clock.now();
        let uow = self.store.begin()?;

        let mut order = uow.order(order_id)?.ok_or(EngineError::OrderNotFound(order_id))?;
        check_transition(order.status, new_status)?;

        if new_status == OrderStatus::Cancelled {
            stock::apply_all(&uow, &restoration_deltas(&order.items), now)?;
        }

        let from = order.status;
        order.status = new_status;
        order.updated_at = now;
        uow.put_order(&mut order)?;
        uow.commit()?;

        info!(order_id, ?from, to = ?new_status, "order status changed");
        Ok(order)
    }

    /// Cancel an order (transition into `Cancelled`).
    pub fn cancel_order(&self, actor: &Actor, order_id: OrderId) -> EngineResult<Order> {
        self.transition(actor, order_id, OrderStatus::Cancelled)
    }

    // ==================== Catalog ====================

    /// Create a product. Initial stock enters through the ledger so the
    /// very first units are accounted for like any other adjustment.
    pub fn create_product(&self, actor: &Actor, payload: ProductCreate) -> EngineResult<Product> {
        if !actor.is_privileged() {
            return Err(EngineError::NotAuthorized);
        }
        checked(validate_product_create(&payload))?;

        let now = self.clock.now();
        let uow = self.store.begin()?;

        if let Some(sku) = payload.sku.as_deref()
            && uow.find_product_by_sku(sku, None)?.is_some()
        {
            return Err(EngineError::DuplicateSku(sku.to_string()));
        }

        let mut product = Product {
            id: uow.next_id("product")?,
            name: payload.name,
            description: payload.description,
            price: payload.price,
            stock: 0,
            sku: payload.sku,
            is_active: payload.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
            version: 0,
        };
        uow.put_product(&mut product)?;
        let product = if payload.stock > 0 {
            stock::adjust(&uow, product.id, payload.stock, now)?
        } else {
            product
        };
        uow.commit()?;

        info!(product_id = product.id, stock = product.stock, "product created");
        Ok(product)
    }

    /// Update product fields. Stock is deliberately absent from the
    /// payload; corrections go through [`OrderEngine::adjust_stock`].
    pub fn update_product(
        &self,
        actor: &Actor,
        product_id: ProductId,
        payload: ProductUpdate,
    ) -> EngineResult<Product> {
        if !actor.is_privileged() {
            return Err(EngineError::NotAuthorized);
        }
        checked(validate_product_update(&payload))?;

        let now = self.clock.now();
        let uow = self.store.begin()?;

        let mut product = uow
            .product(product_id)?
            .ok_or(EngineError::ProductNotFound(product_id))?;

        if let Some(sku) = payload.sku.as_deref()
            && uow.find_product_by_sku(sku, Some(product_id))?.is_some()
        {
            return Err(EngineError::DuplicateSku(sku.to_string()));
        }

        if let Some(name) = payload.name {
            product.name = name;
        }
        if let Some(description) = payload.description {
            product.description = description;
        }
        if let Some(price) = payload.price {
            product.price = price;
        }
        if let Some(sku) = payload.sku {
            product.sku = Some(sku);
        }
        if let Some(is_active) = payload.is_active {
            product.is_active = is_active;
        }
        product.updated_at = now;
        uow.put_product(&mut product)?;
        uow.commit()?;

        info!(product_id, "product updated");
        Ok(product)
    }

    /// Delete a product. Refused while any order line references it, so
    /// historical orders keep their pricing record.
    pub fn delete_product(&self, actor: &Actor, product_id: ProductId) -> EngineResult<()> {
        if !actor.is_admin() {
            return Err(EngineError::NotAuthorized);
        }

        let uow = self.store.begin()?;
        if uow.product(product_id)?.is_none() {
            return Err(EngineError::ProductNotFound(product_id));
        }
        if uow.product_is_referenced(product_id)? {
            return Err(EngineError::ProductInUse(product_id));
        }
        uow.remove_product(product_id)?;
        uow.commit()?;

        info!(product_id, "product deleted");
        Ok(())
    }

    /// Manual stock correction through the ledger (admin only).
    pub fn adjust_stock(
        &self,
        actor: &Actor,
        product_id: ProductId,
        delta: i32,
    ) -> EngineResult<Product> {
        if !actor.is_admin() {
            return Err(EngineError::NotAuthorized);
        }
        if delta == 0 {
            return Err(EngineError::InvalidQuantity {
                product_id,
                got: 0,
            });
        }

        let now = self.clock.now();
        let uow = self.store.begin()?;
        let product = stock::adjust(&uow, product_id, delta, now)?;
        uow.commit()?;

        info!(product_id, delta, stock = product.stock, "stock corrected");
        Ok(product)
    }

    // ==================== Users ====================

    /// Create a user (admin only). Emails are unique, case-insensitive.
    pub fn create_user(&self, actor: &Actor, payload: UserCreate) -> EngineResult<User> {
        if !actor.is_admin() {
            return Err(EngineError::NotAuthorized);
        }
        checked(validate_user_create(&payload))?;

        let now = self.clock.now();
        let uow = self.store.begin()?;

        if uow.find_user_by_email(&payload.email, None)?.is_some() {
            return Err(EngineError::DuplicateEmail(payload.email));
        }

        let mut user = User {
            id: uow.next_id("user")?,
            name: payload.name,
            email: payload.email,
            role: payload.role,
            phone: payload.phone,
            address: payload.address,
            is_active: payload.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
            version: 0,
        };
        uow.put_user(&mut user)?;
        uow.commit()?;

        info!(user_id = user.id, role = ?user.role, "user created");
        Ok(user)
    }

    /// Update user fields (admin only).
    pub fn update_user(
        &self,
        actor: &Actor,
        user_id: UserId,
        payload: UserUpdate,
    ) -> EngineResult<User> {
        if !actor.is_admin() {
            return Err(EngineError::NotAuthorized);
        }
        checked(validate_user_update(&payload))?;

        let now = self.clock.now();
        let uow = self.store.begin()?;

        let mut user = uow.user(user_id)?.ok_or(EngineError::UserNotFound(user_id))?;

        if let Some(email) = payload.email.as_deref()
            && uow.find_user_by_email(email, Some(user_id))?.is_some()
        {
            return Err(EngineError::DuplicateEmail(email.to_string()));
        }

        if let Some(name) = payload.name {
            user.name = name;
        }
        if let Some(email) = payload.email {
            user.email = email;
        }
        if let Some(role) = payload.role {
            user.role = role;
        }
        if let Some(phone) = payload.phone {
            user.phone = Some(phone);
        }
        if let Some(address) = payload.address {
            user.address = Some(address);
        }
        if let Some(is_active) = payload.is_active {
            user.is_active = is_active;
        }
        user.updated_at = now;
        uow.put_user(&mut user)?;
        uow.commit()?;

        info!(user_id, "user updated");
        Ok(user)
    }
}

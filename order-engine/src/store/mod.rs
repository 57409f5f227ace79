//! redb-backed persistence for products, orders and users
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `products` | `ProductId` | JSON `Product` | Catalog rows |
//! | `orders` | `OrderId` | JSON `Order` | Orders with embedded line items |
//! | `users` | `UserId` | JSON `User` | Customers and staff |
//! | `counters` | `&str` | `i64` | Id sequences per entity |
//!
//! # Unit of work
//!
//! [`OrderStore::begin`] hands out a [`Uow`] wrapping one redb write
//! transaction. All reads and writes of one logical operation go through
//! it; [`Uow::commit`] makes them durable, dropping the unit of work
//! without committing aborts everything. redb serializes writers, so one
//! operation runs at a time; the per-row `version` token additionally
//! rejects stale read-modify-write cycles that span transactions.

mod seed;

pub use seed::{SeedData, seed_demo};

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use shared::models::{Order, OrderId, Product, ProductId, User, UserId};
use thiserror::Error;

/// Catalog rows: key = product id, value = JSON-serialized Product
const PRODUCTS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("products");

/// Order rows (items embedded): key = order id, value = JSON-serialized Order
const ORDERS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("orders");

/// User rows: key = user id, value = JSON-serialized User
const USERS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("users");

/// Id sequences: key = entity name, value = last issued id
const COUNTERS_TABLE: TableDefinition<&str, i64> = TableDefinition::new("counters");

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("stale write to {entity} {id}")]
    VersionConflict { entity: &'static str, id: i64 },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Order store backed by redb
#[derive(Clone)]
pub struct OrderStore {
    db: Arc<Database>,
}

impl std::fmt::Debug for OrderStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderStore").finish_non_exhaustive()
    }
}

impl OrderStore {
    /// Open or create the database at the given path.
    ///
    /// redb commits are durable as soon as `commit()` returns and the
    /// file is always left in a consistent state, so a crash mid-operation
    /// simply loses the uncommitted transaction.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (tests, demos).
    pub fn open_in_memory() -> StoreResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StoreResult<Self> {
        // Create tables up front so read transactions never miss them
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(PRODUCTS_TABLE)?;
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(USERS_TABLE)?;
            let _ = write_txn.open_table(COUNTERS_TABLE)?;
        }
        write_txn.commit()?;
        Ok(Self { db: Arc::new(db) })
    }

    /// Begin a unit of work (one write transaction).
    pub fn begin(&self) -> StoreResult<Uow> {
        Ok(Uow {
            txn: self.db.begin_write()?,
        })
    }

    // ========== Read-only accessors ==========

    /// Load a product outside of any unit of work.
    pub fn product(&self, id: ProductId) -> StoreResult<Option<Product>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PRODUCTS_TABLE)?;
        table
            .get(id)?
            .map(|guard| serde_json::from_slice(guard.value()).map_err(StoreError::from))
            .transpose()
    }

    /// Load an order (with its items) outside of any unit of work.
    pub fn order(&self, id: OrderId) -> StoreResult<Option<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        table
            .get(id)?
            .map(|guard| serde_json::from_slice(guard.value()).map_err(StoreError::from))
            .transpose()
    }

    /// Load a user outside of any unit of work.
    pub fn user(&self, id: UserId) -> StoreResult<Option<User>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS_TABLE)?;
        table
            .get(id)?
            .map(|guard| serde_json::from_slice(guard.value()).map_err(StoreError::from))
            .transpose()
    }

    /// All products, ordered by id.
    pub fn list_products(&self) -> StoreResult<Vec<Product>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PRODUCTS_TABLE)?;
        let mut products = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            products.push(serde_json::from_slice(value.value())?);
        }
        Ok(products)
    }

    /// All orders of one customer, ordered by id.
    pub fn orders_for_customer(&self, customer_id: UserId) -> StoreResult<Vec<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        let mut orders = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let order: Order = serde_json::from_slice(value.value())?;
            if order.customer_id == customer_id {
                orders.push(order);
            }
        }
        Ok(orders)
    }
}

/// One unit of work: a single write transaction over all tables.
///
/// Dropping without calling [`Uow::commit`] rolls back every change.
pub struct Uow {
    txn: WriteTransaction,
}

impl std::fmt::Debug for Uow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Uow").finish_non_exhaustive()
    }
}

impl Uow {
    // ========== Id sequences ==========

    /// Issue the next id for the given entity name.
    pub fn next_id(&self, entity: &str) -> StoreResult<i64> {
        let mut table = self.txn.open_table(COUNTERS_TABLE)?;
        let next = table.get(entity)?.map(|g| g.value()).unwrap_or(0) + 1;
        table.insert(entity, next)?;
        Ok(next)
    }

    // ========== Products ==========

    pub fn product(&self, id: ProductId) -> StoreResult<Option<Product>> {
        let table = self.txn.open_table(PRODUCTS_TABLE)?;
        table
            .get(id)?
            .map(|guard| serde_json::from_slice(guard.value()).map_err(StoreError::from))
            .transpose()
    }

    /// Write a product row, bumping its version.
    ///
    /// Fails with [`StoreError::VersionConflict`] when the stored row has
    /// moved on since this copy was loaded.
    pub fn put_product(&self, product: &mut Product) -> StoreResult<()> {
        let mut table = self.txn.open_table(PRODUCTS_TABLE)?;
        let stored_version = table
            .get(product.id)?
            .map(|g| serde_json::from_slice::<Product>(g.value()))
            .transpose()?
            .map(|p| p.version);
        if let Some(version) = stored_version
            && version != product.version
        {
            return Err(StoreError::VersionConflict {
                entity: "product",
                id: product.id,
            });
        }
        product.version += 1;
        let bytes = serde_json::to_vec(product)?;
        table.insert(product.id, bytes.as_slice())?;
        Ok(())
    }

    pub fn remove_product(&self, id: ProductId) -> StoreResult<bool> {
        let mut table = self.txn.open_table(PRODUCTS_TABLE)?;
        Ok(table.remove(id)?.is_some())
    }

    /// Find a product by SKU, optionally ignoring one id (for updates).
    pub fn find_product_by_sku(
        &self,
        sku: &str,
        exclude: Option<ProductId>,
    ) -> StoreResult<Option<Product>> {
        let table = self.txn.open_table(PRODUCTS_TABLE)?;
        for entry in table.iter()? {
            let (_, value) = entry?;
            let product: Product = serde_json::from_slice(value.value())?;
            if exclude == Some(product.id) {
                continue;
            }
            if product.sku.as_deref() == Some(sku) {
                return Ok(Some(product));
            }
        }
        Ok(None)
    }

    /// Whether any order line references the product (historical orders
    /// included — referenced products must not be deleted).
    pub fn product_is_referenced(&self, id: ProductId) -> StoreResult<bool> {
        let table = self.txn.open_table(ORDERS_TABLE)?;
        for entry in table.iter()? {
            let (_, value) = entry?;
            let order: Order = serde_json::from_slice(value.value())?;
            if order.items.iter().any(|item| item.product_id == id) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    // ========== Orders ==========

    pub fn order(&self, id: OrderId) -> StoreResult<Option<Order>> {
        let table = self.txn.open_table(ORDERS_TABLE)?;
        table
            .get(id)?
            .map(|guard| serde_json::from_slice(guard.value()).map_err(StoreError::from))
            .transpose()
    }

    /// Write an order row (items embedded), bumping its version.
    pub fn put_order(&self, order: &mut Order) -> StoreResult<()> {
        let mut table = self.txn.open_table(ORDERS_TABLE)?;
        let stored_version = table
            .get(order.id)?
            .map(|g| serde_json::from_slice::<Order>(g.value()))
            .transpose()?
            .map(|o| o.version);
        if let Some(version) = stored_version
            && version != order.version
        {
            return Err(StoreError::VersionConflict {
                entity: "order",
                id: order.id,
            });
        }
        order.version += 1;
        let bytes = serde_json::to_vec(order)?;
        table.insert(order.id, bytes.as_slice())?;
        Ok(())
    }

    /// Remove an order row; its items go with it.
    pub fn remove_order(&self, id: OrderId) -> StoreResult<bool> {
        let mut table = self.txn.open_table(ORDERS_TABLE)?;
        Ok(table.remove(id)?.is_some())
    }

    // ========== Users ==========

    pub fn user(&self, id: UserId) -> StoreResult<Option<User>> {
        let table = self.txn.open_table(USERS_TABLE)?;
        table
            .get(id)?
            .map(|guard| serde_json::from_slice(guard.value()).map_err(StoreError::from))
            .transpose()
    }

    /// Write a user row, bumping its version.
    pub fn put_user(&self, user: &mut User) -> StoreResult<()> {
        let mut table = self.txn.open_table(USERS_TABLE)?;
        let stored_version = table
            .get(user.id)?
            .map(|g| serde_json::from_slice::<User>(g.value()))
            .transpose()?
            .map(|u| u.version);
        if let Some(version) = stored_version
            && version != user.version
        {
            return Err(StoreError::VersionConflict {
                entity: "user",
                id: user.id,
            });
        }
        user.version += 1;
        let bytes = serde_json::to_vec(user)?;
        table.insert(user.id, bytes.as_slice())?;
        Ok(())
    }

    /// Find a user by email (case-insensitive), optionally ignoring one id.
    pub fn find_user_by_email(&self, email: &str, exclude: Option<UserId>) -> StoreResult<Option<User>> {
        let needle = email.to_lowercase();
        let table = self.txn.open_table(USERS_TABLE)?;
        for entry in table.iter()? {
            let (_, value) = entry?;
            let user: User = serde_json::from_slice(value.value())?;
            if exclude == Some(user.id) {
                continue;
            }
            if user.email.to_lowercase() == needle {
                return Ok(Some(user));
            }
        }
        Ok(None)
    }

    // ========== Transaction boundary ==========

    /// Make every change of this unit of work durable.
    pub fn commit(self) -> StoreResult<()> {
        self.txn.commit()?;
        Ok(())
    }

    /// Explicitly discard every change (dropping does the same).
    pub fn rollback(self) -> StoreResult<()> {
        self.txn.abort()?;
        Ok(())
    }
}

//! Demo data seeding
//!
//! Inserts one demo user per role and a small catalog. Intended for
//! local demos and as a test fixture.

use chrono::Utc;
use rust_decimal::Decimal;
use shared::models::{Product, User, UserRole};

use super::{OrderStore, StoreResult, Uow};

/// Handles to the seeded rows.
#[derive(Debug, Clone)]
pub struct SeedData {
    pub admin: User,
    pub employee: User,
    pub customer: User,
    pub products: Vec<Product>,
}

fn seed_user(uow: &Uow, name: &str, email: &str, role: UserRole) -> StoreResult<User> {
    let now = Utc::now();
    let mut user = User {
        id: uow.next_id("user")?,
        name: name.to_string(),
        email: email.to_string(),
        role,
        phone: None,
        address: None,
        is_active: true,
        created_at: now,
        updated_at: now,
        version: 0,
    };
    uow.put_user(&mut user)?;
    Ok(user)
}

fn seed_product(
    uow: &Uow,
    name: &str,
    description: &str,
    cents: i64,
    stock: i32,
    sku: &str,
) -> StoreResult<Product> {
    let now = Utc::now();
    let mut product = Product {
        id: uow.next_id("product")?,
        name: name.to_string(),
        description: description.to_string(),
        price: Decimal::new(cents, 2),
        stock,
        sku: Some(sku.to_string()),
        is_active: true,
        created_at: now,
        updated_at: now,
        version: 0,
    };
    uow.put_product(&mut product)?;
    Ok(product)
}

/// Seed demo users and products, returning the inserted rows.
pub fn seed_demo(store: &OrderStore) -> StoreResult<SeedData> {
    let uow = store.begin()?;

    let admin = seed_user(&uow, "Administrator", "admin@example.com", UserRole::Admin)?;
    let employee = seed_user(&uow, "Demo Employee", "employee@example.com", UserRole::Employee)?;
    let customer = seed_user(&uow, "Demo Customer", "customer@example.com", UserRole::Customer)?;

    let products = vec![
        seed_product(
            &uow,
            "Laptop 14\"",
            "14-inch laptop, 16 GB RAM, 512 GB SSD",
            89999,
            10,
            "LAP-14",
        )?,
        seed_product(
            &uow,
            "Wireless Mouse",
            "Two-button wireless mouse with scroll wheel",
            1950,
            50,
            "MOU-WL",
        )?,
        seed_product(
            &uow,
            "USB-C Dock",
            "8-port USB-C docking station with HDMI",
            6475,
            25,
            "DCK-8P",
        )?,
    ];

    uow.commit()?;
    tracing::info!(products = products.len(), "seeded demo data");

    Ok(SeedData {
        admin,
        employee,
        customer,
        products,
    })
}

use super::*;

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use shared::models::{OrderLineInput, UserRole};

use crate::clock::FixedClock;

mod test_flows;

fn test_engine() -> OrderEngine {
    let store = OrderStore::open_in_memory().unwrap();
    let clock = FixedClock(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
    OrderEngine::with_clock(store, Arc::new(clock))
}

fn admin() -> Actor {
    Actor::new(1, UserRole::Admin)
}

fn employee() -> Actor {
    Actor::new(2, UserRole::Employee)
}

fn dec(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

// ========================================================================
// Fixtures: create rows through the engine's own entry points
// ========================================================================

fn seed_customer(engine: &OrderEngine, email: &str) -> User {
    engine
        .create_user(
            &admin(),
            UserCreate {
                name: "Test Customer".to_string(),
                email: email.to_string(),
                role: UserRole::Customer,
                phone: None,
                address: None,
                is_active: None,
            },
        )
        .unwrap()
}

fn seed_product(engine: &OrderEngine, name: &str, price_cents: i64, stock: i32) -> Product {
    engine
        .create_product(
            &admin(),
            ProductCreate {
                name: name.to_string(),
                description: format!("{name} used by engine tests"),
                price: dec(price_cents),
                stock,
                sku: None,
                is_active: None,
            },
        )
        .unwrap()
}

fn line(product: &Product, quantity: i32) -> OrderLineInput {
    OrderLineInput {
        product_id: product.id,
        quantity,
    }
}

fn order_for(customer: &User, lines: Vec<OrderLineInput>) -> OrderCreate {
    OrderCreate {
        customer_id: customer.id,
        order_date: None,
        notes: None,
        shipping_address: None,
        lines,
    }
}

fn replace_lines(lines: Vec<OrderLineInput>) -> OrderUpdate {
    OrderUpdate {
        notes: None,
        shipping_address: None,
        lines,
    }
}

fn stock_of(engine: &OrderEngine, product_id: ProductId) -> i32 {
    engine.store().product(product_id).unwrap().unwrap().stock
}

//! Input validation helpers
//!
//! Centralized text length limits and per-entity validation functions.
//! Each function returns the full list of field-tagged errors so the
//! caller can display them all at once; an empty list means the payload
//! is acceptable. Per-line order checks (quantity, stock) are not done
//! here: the reconciler owns those and their error precedence.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{OrderCreate, OrderUpdate, ProductCreate, ProductUpdate, UserCreate, UserUpdate};

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: product, user
pub const MIN_NAME_LEN: usize = 3;
pub const MAX_NAME_LEN: usize = 100;

/// Product descriptions
pub const MIN_DESCRIPTION_LEN: usize = 10;
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Order notes
pub const MAX_NOTE_LEN: usize = 500;

/// Shipping addresses
pub const MAX_ADDRESS_LEN: usize = 200;

/// Email addresses
pub const MAX_EMAIL_LEN: usize = 150;

/// Phone numbers
pub const MAX_PHONE_LEN: usize = 15;

/// SKU codes
pub const MIN_SKU_LEN: usize = 3;
pub const MAX_SKU_LEN: usize = 50;

/// Price bounds (inclusive), 2 decimal places
pub const MIN_PRICE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);
pub const MAX_PRICE: Decimal = Decimal::from_parts(99_999_999, 0, 0, false, 2);

/// A single field-tagged validation error
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

// ── Field helpers ───────────────────────────────────────────────────

/// Validate a required string: non-empty after trim, within min/max length.
fn check_required_text(
    errors: &mut Vec<FieldError>,
    value: &str,
    field: &str,
    min_len: usize,
    max_len: usize,
) {
    let len = value.trim().len();
    if len == 0 {
        errors.push(FieldError::new(field, format!("{field} must not be empty")));
    } else if len < min_len || len > max_len {
        errors.push(FieldError::new(
            field,
            format!("{field} must be between {min_len} and {max_len} characters"),
        ));
    }
}

/// Validate an optional string: if present, within the length limit.
fn check_optional_text(
    errors: &mut Vec<FieldError>,
    value: Option<&str>,
    field: &str,
    max_len: usize,
) {
    if let Some(v) = value
        && v.len() > max_len
    {
        errors.push(FieldError::new(
            field,
            format!("{field} is too long ({} chars, max {max_len})", v.len()),
        ));
    }
}

fn check_price(errors: &mut Vec<FieldError>, price: Decimal, field: &str) {
    if price < MIN_PRICE || price > MAX_PRICE {
        errors.push(FieldError::new(
            field,
            format!("{field} must be between {MIN_PRICE} and {MAX_PRICE}"),
        ));
    } else if price.normalize().scale() > 2 {
        errors.push(FieldError::new(
            field,
            format!("{field} must have at most 2 decimal places"),
        ));
    }
}

fn check_sku(errors: &mut Vec<FieldError>, sku: &str) {
    if sku.len() < MIN_SKU_LEN || sku.len() > MAX_SKU_LEN {
        errors.push(FieldError::new(
            "sku",
            format!("sku must be between {MIN_SKU_LEN} and {MAX_SKU_LEN} characters"),
        ));
    }
    if !sku.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        errors.push(FieldError::new(
            "sku",
            "sku may only contain letters, digits and hyphens",
        ));
    }
}

fn check_email(errors: &mut Vec<FieldError>, email: &str) {
    if email.trim().is_empty() {
        errors.push(FieldError::new("email", "email must not be empty"));
        return;
    }
    if email.len() > MAX_EMAIL_LEN {
        errors.push(FieldError::new(
            "email",
            format!("email is too long (max {MAX_EMAIL_LEN} chars)"),
        ));
    }
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    };
    if !valid {
        errors.push(FieldError::new("email", "email format is not valid"));
    }
}

// ── Per-entity validation ───────────────────────────────────────────

/// Validate a product creation payload.
pub fn validate_product_create(payload: &ProductCreate) -> Vec<FieldError> {
    let mut errors = Vec::new();
    check_required_text(&mut errors, &payload.name, "name", MIN_NAME_LEN, MAX_NAME_LEN);
    check_required_text(
        &mut errors,
        &payload.description,
        "description",
        MIN_DESCRIPTION_LEN,
        MAX_DESCRIPTION_LEN,
    );
    check_price(&mut errors, payload.price, "price");
    if payload.stock < 0 {
        errors.push(FieldError::new("stock", "stock must not be negative"));
    }
    if let Some(sku) = payload.sku.as_deref() {
        check_sku(&mut errors, sku);
    }
    errors
}

/// Validate a product update payload (only the fields that are present).
pub fn validate_product_update(payload: &ProductUpdate) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if let Some(name) = payload.name.as_deref() {
        check_required_text(&mut errors, name, "name", MIN_NAME_LEN, MAX_NAME_LEN);
    }
    if let Some(description) = payload.description.as_deref() {
        check_required_text(
            &mut errors,
            description,
            "description",
            MIN_DESCRIPTION_LEN,
            MAX_DESCRIPTION_LEN,
        );
    }
    if let Some(price) = payload.price {
        check_price(&mut errors, price, "price");
    }
    if let Some(sku) = payload.sku.as_deref() {
        check_sku(&mut errors, sku);
    }
    errors
}

/// Validate a user creation payload.
pub fn validate_user_create(payload: &UserCreate) -> Vec<FieldError> {
    let mut errors = Vec::new();
    check_required_text(&mut errors, &payload.name, "name", MIN_NAME_LEN, MAX_NAME_LEN);
    check_email(&mut errors, &payload.email);
    check_optional_text(&mut errors, payload.phone.as_deref(), "phone", MAX_PHONE_LEN);
    check_optional_text(
        &mut errors,
        payload.address.as_deref(),
        "address",
        MAX_ADDRESS_LEN,
    );
    errors
}

/// Validate a user update payload (only the fields that are present).
pub fn validate_user_update(payload: &UserUpdate) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if let Some(name) = payload.name.as_deref() {
        check_required_text(&mut errors, name, "name", MIN_NAME_LEN, MAX_NAME_LEN);
    }
    if let Some(email) = payload.email.as_deref() {
        check_email(&mut errors, email);
    }
    check_optional_text(&mut errors, payload.phone.as_deref(), "phone", MAX_PHONE_LEN);
    check_optional_text(
        &mut errors,
        payload.address.as_deref(),
        "address",
        MAX_ADDRESS_LEN,
    );
    errors
}

/// Validate an order creation payload (notes, address, non-empty lines).
pub fn validate_order_create(payload: &OrderCreate) -> Vec<FieldError> {
    let mut errors = Vec::new();
    check_optional_text(&mut errors, payload.notes.as_deref(), "notes", MAX_NOTE_LEN);
    check_optional_text(
        &mut errors,
        payload.shipping_address.as_deref(),
        "shipping_address",
        MAX_ADDRESS_LEN,
    );
    if payload.lines.is_empty() {
        errors.push(FieldError::new("lines", "an order needs at least one line"));
    }
    errors
}

/// Validate an order update payload (notes, address, non-empty lines).
pub fn validate_order_update(payload: &OrderUpdate) -> Vec<FieldError> {
    let mut errors = Vec::new();
    check_optional_text(&mut errors, payload.notes.as_deref(), "notes", MAX_NOTE_LEN);
    check_optional_text(
        &mut errors,
        payload.shipping_address.as_deref(),
        "shipping_address",
        MAX_ADDRESS_LEN,
    );
    if payload.lines.is_empty() {
        errors.push(FieldError::new("lines", "an order needs at least one line"));
    }
    errors
}

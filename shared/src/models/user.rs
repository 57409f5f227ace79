//! User Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;

/// User role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    Employee,
    Customer,
}

impl UserRole {
    /// Admin and Employee may operate on any customer's orders.
    pub fn is_privileged(self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Employee)
    }
}

/// User entity
///
/// The engine only consumes users as an authorization predicate and as
/// the owning customer of an order; it never authenticates them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// Unique, compared case-insensitively
    pub email: String,
    pub role: UserRole,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency token, bumped on every write
    #[serde(default)]
    pub version: u64,
}

/// Create user payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
}

/// Update user payload
///
/// `None` means "leave unchanged". Existing phone or address values
/// cannot be cleared through this payload, only replaced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
}

/// The caller acting on the engine: identity plus role
///
/// Supplied by the authentication layer; the engine trusts it as-is.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub role: UserRole,
}

impl Actor {
    pub fn new(user_id: UserId, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub fn is_privileged(&self) -> bool {
        self.role.is_privileged()
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

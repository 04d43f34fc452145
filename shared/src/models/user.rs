//! User Model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registered user (cashier / back-office operator)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// Stored lowercased
    pub email: String,
    #[serde(skip_serializing, default)]
    pub hashed_password: String,
    pub created_at: i64,
    pub updated_at: i64,
}

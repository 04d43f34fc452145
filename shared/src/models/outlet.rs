//! Outlet Model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A physical store / stock location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Outlet {
    pub id: Uuid,
    pub name: String,
    pub created_at: i64,
}

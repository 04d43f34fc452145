//! Data models
//!
//! Shared between the server and API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are UUID v4, all timestamps are Unix millis.

pub mod ledger;
pub mod outlet;
pub mod product;
pub mod report;
pub mod transaction;
pub mod user;

// Re-exports
pub use ledger::*;
pub use outlet::*;
pub use product::*;
pub use report::*;
pub use transaction::*;
pub use user::*;

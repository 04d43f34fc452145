//! Database access layer
//!
//! One module per table. Functions take `&PgPool` when they run on their own
//! and `&mut PgConnection` when the caller owns the surrounding transaction.

pub mod ledger;
pub mod outlets;
pub mod products;
pub mod refresh_tokens;
pub mod reports;
pub mod transactions;
pub mod users;

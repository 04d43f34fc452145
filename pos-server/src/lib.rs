//! pos-server: inventory and point-of-sale backend
//!
//! - Users, JWT access tokens and refresh tokens
//! - Product catalog with background image storage
//! - Append-only inventory ledger per (item, outlet)
//! - Sales transactions and payment confirmation
//! - Inventory and transaction reports, the latter recomputed in the background

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod services;
pub mod state;
pub mod storage;
pub mod tasks;
pub mod util;

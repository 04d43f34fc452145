//! Report Models
//!
//! - [`TransactionReport`]: the single aggregate sales row
//! - [`InventoryReportItem`]: on-hand stock + movement history per (item, outlet)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::ledger::LedgerEntryType;

/// Units sold per category label (`Goods`, `Service`, `Subscription`, `Other`)
pub type CategorySummary = BTreeMap<String, i64>;

/// Aggregate sales statistics over paid transactions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct TransactionReport {
    pub total_revenue: i64,
    pub total_paid_transactions: i64,
    pub total_products_sold: i64,
    pub total_unique_customers: i64,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub category_summary: CategorySummary,
    pub updated_at: i64,
}

/// One ledger movement as shown in the inventory report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionHistory {
    pub transaction_id: Option<Uuid>,
    pub invoice_code: Option<String>,
    pub quantity_change: i32,
    pub transaction_type: LedgerEntryType,
    pub created_at: i64,
}

/// Inventory status for one item at one outlet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryReportItem {
    pub item_id: Uuid,
    pub item_name: String,
    pub outlet_id: Uuid,
    pub outlet_name: String,
    pub on_hand_quantity: i64,
    /// Newest first
    pub transaction_history: Vec<TransactionHistory>,
}

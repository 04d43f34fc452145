//! Inventory Ledger Model
//!
//! The ledger is append-only. On-hand stock for an (item, outlet) pair is
//! the sum of its `quantity_change` values.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One signed stock movement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct InventoryLedgerEntry {
    pub id: Uuid,
    pub item_id: Uuid,
    pub outlet_id: Uuid,
    /// None for stock-in, set for sales
    pub transaction_id: Option<Uuid>,
    /// Positive = stock-in, negative = stock-out
    pub quantity_change: i32,
    pub created_at: i64,
}

/// Direction of a ledger movement, derived from the sign of the change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEntryType {
    #[serde(rename = "stock-in")]
    StockIn,
    #[serde(rename = "stock-out")]
    StockOut,
}

impl LedgerEntryType {
    pub fn from_quantity_change(quantity_change: i32) -> Self {
        if quantity_change < 0 {
            Self::StockOut
        } else {
            Self::StockIn
        }
    }
}

/// On-hand quantity of one item at one outlet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockLevel {
    pub item_id: Uuid,
    pub outlet_id: Uuid,
    pub on_hand_quantity: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_type_from_sign() {
        assert_eq!(
            LedgerEntryType::from_quantity_change(5),
            LedgerEntryType::StockIn
        );
        assert_eq!(
            LedgerEntryType::from_quantity_change(-1),
            LedgerEntryType::StockOut
        );
    }

    #[test]
    fn test_entry_type_serializes_with_dash() {
        assert_eq!(
            serde_json::to_string(&LedgerEntryType::StockOut).unwrap(),
            "\"stock-out\""
        );
    }
}

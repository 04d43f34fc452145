//! Reports
//!
//! - Inventory report: on-hand quantity and movement history per (item, outlet)
//! - Transaction report: the aggregate row kept current by the report worker

use shared::models::{InventoryReportItem, LedgerEntryType, TransactionHistory, TransactionReport};
use shared::util::now_millis;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::ledger::{self, HistoryRow};
use crate::db::reports;
use crate::error::ServiceResult;

/// Inventory report, optionally narrowed to one item and/or one outlet.
/// All movements come from a single query and are grouped here.
pub async fn inventory_report(
    pool: &PgPool,
    item_id: Option<Uuid>,
    outlet_id: Option<Uuid>,
) -> ServiceResult<Vec<InventoryReportItem>> {
    let rows = ledger::history(pool, item_id, outlet_id).await?;
    Ok(group_history(rows))
}

/// Fold pair-ordered ledger rows into report items. Rows of one pair must be
/// contiguous; their order is kept as the history order.
pub fn group_history(rows: Vec<HistoryRow>) -> Vec<InventoryReportItem> {
    let mut items: Vec<InventoryReportItem> = Vec::new();

    for row in rows {
        let entry = TransactionHistory {
            transaction_id: row.transaction_id,
            invoice_code: row.invoice_code,
            quantity_change: row.quantity_change,
            transaction_type: LedgerEntryType::from_quantity_change(row.quantity_change),
            created_at: row.created_at,
        };

        match items.last_mut() {
            Some(item) if item.item_id == row.item_id && item.outlet_id == row.outlet_id => {
                item.on_hand_quantity += i64::from(row.quantity_change);
                item.transaction_history.push(entry);
            }
            _ => items.push(InventoryReportItem {
                item_id: row.item_id,
                item_name: row.item_name,
                outlet_id: row.outlet_id,
                outlet_name: row.outlet_name,
                on_hand_quantity: i64::from(row.quantity_change),
                transaction_history: vec![entry],
            }),
        }
    }

    items
}

/// Current aggregate row; all zeros if it was never seeded
pub async fn transaction_report(pool: &PgPool) -> ServiceResult<TransactionReport> {
    Ok(reports::get(pool).await?.unwrap_or_default())
}

/// Rebuild the report row under its row lock. `Ok(false)` when the row is
/// missing.
pub async fn recompute_transaction_report(pool: &PgPool) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    if !reports::lock(&mut tx).await? {
        tx.rollback().await?;
        return Ok(false);
    }

    let report = reports::aggregate_paid(&mut tx).await?;
    reports::store(&mut tx, &report, now_millis()).await?;
    tx.commit().await?;

    tracing::info!(
        revenue = report.total_revenue,
        paid_transactions = report.total_paid_transactions,
        products_sold = report.total_products_sold,
        "Transaction report updated"
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(item: Uuid, outlet: Uuid, change: i32, at: i64) -> HistoryRow {
        HistoryRow {
            item_id: item,
            item_name: "Espresso Beans".into(),
            outlet_id: outlet,
            outlet_name: "Downtown".into(),
            transaction_id: (change < 0).then(Uuid::new_v4),
            invoice_code: (change < 0).then(|| "INV-2025-0007".to_string()),
            quantity_change: change,
            created_at: at,
        }
    }

    #[test]
    fn test_groups_by_pair_and_sums() {
        let (item, a, b) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let report = group_history(vec![
            row(item, a, -3, 300),
            row(item, a, 10, 100),
            row(item, b, 4, 200),
        ]);

        assert_eq!(report.len(), 2);
        assert_eq!(report[0].outlet_id, a);
        assert_eq!(report[0].on_hand_quantity, 7);
        assert_eq!(report[0].transaction_history.len(), 2);
        assert_eq!(
            report[0].transaction_history[0].transaction_type,
            LedgerEntryType::StockOut
        );
        assert_eq!(report[0].transaction_history[0].created_at, 300);
        assert_eq!(
            report[0].transaction_history[1].transaction_type,
            LedgerEntryType::StockIn
        );
        assert!(report[0].transaction_history[1].invoice_code.is_none());
        assert_eq!(report[1].outlet_id, b);
        assert_eq!(report[1].on_hand_quantity, 4);
    }

    #[test]
    fn test_empty_ledger_gives_empty_report() {
        assert!(group_history(Vec::new()).is_empty());
    }
}

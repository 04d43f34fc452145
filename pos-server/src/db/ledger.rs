//! Inventory ledger
//!
//! Append-only: this module only ever inserts and reads. On-hand stock is
//! always `SUM(quantity_change)` for an (item, outlet) pair.

use shared::models::InventoryLedgerEntry;
use shared::util::now_millis;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

const LEDGER_COLUMNS: &str = "id, item_id, outlet_id, transaction_id, quantity_change, created_at";

/// Serialize stock checks on one (item, outlet) pair until the surrounding
/// transaction ends
pub async fn lock_pair(
    conn: &mut PgConnection,
    item_id: Uuid,
    outlet_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::text || ':' || $2::text, 0))")
        .bind(item_id)
        .bind(outlet_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Current on-hand quantity (0 when the pair has no entries)
pub async fn on_hand(
    conn: &mut PgConnection,
    item_id: Uuid,
    outlet_id: Uuid,
) -> Result<i64, sqlx::Error> {
    let (qty,): (i64,) = sqlx::query_as(
        "SELECT COALESCE(SUM(quantity_change), 0)::BIGINT FROM inventory_ledgers \
         WHERE item_id = $1 AND outlet_id = $2",
    )
    .bind(item_id)
    .bind(outlet_id)
    .fetch_one(conn)
    .await?;
    Ok(qty)
}

pub async fn insert_stock_in(
    pool: &PgPool,
    item_id: Uuid,
    outlet_id: Uuid,
    quantity: i32,
) -> Result<InventoryLedgerEntry, sqlx::Error> {
    sqlx::query_as::<_, InventoryLedgerEntry>(&format!(
        "INSERT INTO inventory_ledgers (id, item_id, outlet_id, transaction_id, quantity_change, created_at) \
         VALUES ($1, $2, $3, NULL, $4, $5) RETURNING {LEDGER_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(item_id)
    .bind(outlet_id)
    .bind(quantity)
    .bind(now_millis())
    .fetch_one(pool)
    .await
}

/// One stock-out movement of a sale
#[derive(Debug, Clone, Copy)]
pub struct StockOut {
    pub item_id: Uuid,
    pub qty: i32,
}

/// Insert the negative entries of a sale in one statement
pub async fn insert_stock_out(
    conn: &mut PgConnection,
    transaction_id: Uuid,
    outlet_id: Uuid,
    lines: &[StockOut],
    now: i64,
) -> Result<(), sqlx::Error> {
    if lines.is_empty() {
        return Ok(());
    }
    let ids: Vec<Uuid> = lines.iter().map(|_| Uuid::new_v4()).collect();
    let item_ids: Vec<Uuid> = lines.iter().map(|l| l.item_id).collect();
    let changes: Vec<i32> = lines.iter().map(|l| -l.qty).collect();

    sqlx::query(
        r#"
        INSERT INTO inventory_ledgers (id, item_id, outlet_id, transaction_id, quantity_change, created_at)
        SELECT u.id, u.item_id, $3, $4, u.change, $5
        FROM UNNEST($1::uuid[], $2::uuid[], $6::integer[]) AS u(id, item_id, change)
        "#,
    )
    .bind(&ids)
    .bind(&item_ids)
    .bind(outlet_id)
    .bind(transaction_id)
    .bind(now)
    .bind(&changes)
    .execute(conn)
    .await?;
    Ok(())
}

/// One ledger row joined with its product, outlet and invoice
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct HistoryRow {
    pub item_id: Uuid,
    pub item_name: String,
    pub outlet_id: Uuid,
    pub outlet_name: String,
    pub transaction_id: Option<Uuid>,
    pub invoice_code: Option<String>,
    pub quantity_change: i32,
    pub created_at: i64,
}

/// Every movement matching the optional filters, grouped by pair (ordered by
/// item name then outlet name), newest first within a pair
pub async fn history(
    pool: &PgPool,
    item_id: Option<Uuid>,
    outlet_id: Option<Uuid>,
) -> Result<Vec<HistoryRow>, sqlx::Error> {
    sqlx::query_as::<_, HistoryRow>(
        r#"
        SELECT l.item_id, p.name AS item_name, l.outlet_id, o.name AS outlet_name,
               l.transaction_id, t.invoice_code, l.quantity_change, l.created_at
        FROM inventory_ledgers l
        JOIN products p ON p.id = l.item_id
        JOIN outlets o ON o.id = l.outlet_id
        LEFT JOIN transactions t ON t.id = l.transaction_id
        WHERE ($1::uuid IS NULL OR l.item_id = $1)
          AND ($2::uuid IS NULL OR l.outlet_id = $2)
        ORDER BY p.name, o.name, l.item_id, l.outlet_id, l.created_at DESC, l.id
        "#,
    )
    .bind(item_id)
    .bind(outlet_id)
    .fetch_all(pool)
    .await
}

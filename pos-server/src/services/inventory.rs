//! Stock-in and on-hand queries

use shared::error::{AppError, ErrorCode};
use shared::models::{InventoryLedgerEntry, StockLevel};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{ledger, outlets, products};
use crate::error::ServiceResult;

/// Append a positive ledger entry for a delivery
pub async fn stock_in(
    pool: &PgPool,
    item_id: Uuid,
    outlet_id: Uuid,
    quantity: i32,
) -> ServiceResult<InventoryLedgerEntry> {
    if quantity < 1 {
        return Err(AppError::new(ErrorCode::InvalidQuantity).into());
    }
    if products::find_by_id(pool, item_id).await?.is_none() {
        return Err(AppError::new(ErrorCode::ProductNotFound).into());
    }
    if !outlets::exists(pool, outlet_id).await? {
        return Err(AppError::new(ErrorCode::OutletNotFound).into());
    }

    let entry = ledger::insert_stock_in(pool, item_id, outlet_id, quantity).await?;
    tracing::info!(
        item_id = %item_id,
        outlet_id = %outlet_id,
        quantity,
        "Stock in recorded"
    );
    Ok(entry)
}

pub async fn stock_level(pool: &PgPool, item_id: Uuid, outlet_id: Uuid) -> ServiceResult<StockLevel> {
    let mut conn = pool.acquire().await?;
    let on_hand_quantity = ledger::on_hand(&mut conn, item_id, outlet_id).await?;
    Ok(StockLevel {
        item_id,
        outlet_id,
        on_hand_quantity,
    })
}

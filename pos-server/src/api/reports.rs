//! Reporting endpoints

use axum::{Router, extract::State, routing::get};
use serde::Deserialize;
use shared::error::ApiResponse;
use shared::models::{InventoryReportItem, TransactionReport};
use uuid::Uuid;

use super::ApiResult;
use super::extract::ApiQuery;
use crate::services::report;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/reports/inventory", get(inventory))
        .route("/api/v1/reports/transactions", get(transactions))
}

/// Both filters optional
#[derive(Debug, Default, Deserialize)]
pub struct InventoryReportQuery {
    pub item_id: Option<Uuid>,
    pub outlet_id: Option<Uuid>,
}

/// GET /api/v1/reports/inventory?item_id=..&outlet_id=..
pub async fn inventory(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<InventoryReportQuery>,
) -> ApiResult<Vec<InventoryReportItem>> {
    let items = report::inventory_report(&state.pool, q.item_id, q.outlet_id).await?;
    Ok(ApiResponse::success(items))
}

/// GET /api/v1/reports/transactions
pub async fn transactions(State(state): State<AppState>) -> ApiResult<TransactionReport> {
    Ok(ApiResponse::success(report::transaction_report(&state.pool).await?))
}

//! Stock-in and stock level lookup

use axum::{Router, extract::State, http::StatusCode, routing::{get, post}};
use serde::Deserialize;
use shared::error::ApiResponse;
use shared::models::{InventoryLedgerEntry, StockLevel};
use uuid::Uuid;
use validator::Validate;

use super::extract::{ApiQuery, ValidJson};
use super::{ApiResult, Created};
use crate::services::inventory;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/inventory/stock-in", post(stock_in))
        .route("/api/v1/inventory/stock", get(stock_level))
}

#[derive(Debug, Deserialize, Validate)]
pub struct StockInRequest {
    pub item_id: Uuid,
    pub outlet_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct StockQuery {
    pub item_id: Uuid,
    pub outlet_id: Uuid,
}

/// POST /api/v1/inventory/stock-in
pub async fn stock_in(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<StockInRequest>,
) -> Created<InventoryLedgerEntry> {
    let entry = inventory::stock_in(&state.pool, req.item_id, req.outlet_id, req.quantity).await?;
    Ok((StatusCode::CREATED, ApiResponse::success(entry)))
}

/// GET /api/v1/inventory/stock?item_id=..&outlet_id=..
pub async fn stock_level(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<StockQuery>,
) -> ApiResult<StockLevel> {
    let level = inventory::stock_level(&state.pool, q.item_id, q.outlet_id).await?;
    Ok(ApiResponse::success(level))
}

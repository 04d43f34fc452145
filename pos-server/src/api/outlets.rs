//! Outlets (stock locations)

use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde::Deserialize;
use shared::error::ApiResponse;
use shared::models::Outlet;
use validator::Validate;

use super::extract::ValidJson;
use super::{ApiResult, Created};
use crate::db;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/v1/outlets", get(list).post(create))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOutletRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
}

/// POST /api/v1/outlets
pub async fn create(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<CreateOutletRequest>,
) -> Created<Outlet> {
    let outlet = db::outlets::create(&state.pool, req.name.trim()).await?;
    tracing::info!(outlet_id = %outlet.id, name = %outlet.name, "Outlet created");
    Ok((StatusCode::CREATED, ApiResponse::success(outlet)))
}

/// GET /api/v1/outlets
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Outlet>> {
    Ok(ApiResponse::success(db::outlets::list(&state.pool).await?))
}

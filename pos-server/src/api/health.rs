//! Health check endpoint

use axum::{Router, routing::get};
use shared::error::ApiResponse;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

pub async fn health_check() -> ApiResponse<serde_json::Value> {
    ApiResponse::success(serde_json::json!({
        "status": "ok",
        "service": "pos-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

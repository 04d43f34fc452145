//! Current user's profile

use axum::{Router, extract::State, routing::get};
use serde::Deserialize;
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::User;
use validator::Validate;

use super::ApiResult;
use super::extract::ValidJson;
use crate::auth::CurrentUser;
use crate::db;
use crate::error::is_unique_violation;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/v1/profile", get(get_profile).put(update_profile))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 2, max = 255))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
}

/// GET /api/v1/profile
pub async fn get_profile(State(state): State<AppState>, user: CurrentUser) -> ApiResult<User> {
    let user = db::users::find_by_id(&state.pool, user.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;
    Ok(ApiResponse::success(user))
}

/// PUT /api/v1/profile
pub async fn update_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidJson(req): ValidJson<UpdateProfileRequest>,
) -> ApiResult<User> {
    let name = req.name.as_deref().map(str::trim);
    let email = req.email.map(|e| e.trim().to_lowercase());

    match db::users::update_profile(&state.pool, user.id, name, email.as_deref()).await {
        Ok(Some(updated)) => {
            tracing::info!(user_id = %updated.id, "Profile updated");
            Ok(ApiResponse::success(updated))
        }
        Ok(None) => Err(AppError::new(ErrorCode::UserNotFound).into()),
        Err(e) if is_unique_violation(&e) => {
            Err(AppError::new(ErrorCode::EmailAlreadyRegistered).into())
        }
        Err(e) => Err(e.into()),
    }
}

//! Registration, login, token refresh and logout

use axum::{Router, extract::State, http::StatusCode, middleware, routing::post};
use serde::{Deserialize, Serialize};
use shared::error::{ApiResponse, AppError, ErrorCode};
use validator::Validate;

use super::extract::ValidJson;
use super::{ApiResult, Created};
use crate::auth::{CurrentUser, login_rate_limit, register_rate_limit};
use crate::db;
use crate::error::is_unique_violation;
use crate::state::AppState;
use crate::util::{generate_refresh_token, hash_password, hash_token, verify_password};

/// Routes reachable without a token
pub fn public_router(state: AppState) -> Router<AppState> {
    let register = Router::new()
        .route("/api/v1/register", post(register))
        .route_layer(middleware::from_fn_with_state(state.clone(), register_rate_limit));
    let login = Router::new()
        .route("/api/v1/login", post(login))
        .route_layer(middleware::from_fn_with_state(state, login_rate_limit));

    Router::new()
        .merge(register)
        .merge(login)
        .route("/api/v1/refresh", post(refresh))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/v1/logout", post(logout))
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 255))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "refresh_token is required"))]
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

/// POST /api/v1/register
pub async fn register(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<RegisterRequest>,
) -> Created<()> {
    let email = req.email.trim().to_lowercase();
    let hashed = hash_password(&req.password).map_err(|e| {
        tracing::error!("Password hashing failed: {e}");
        AppError::new(ErrorCode::InternalError)
    })?;

    match db::users::create(&state.pool, req.name.trim(), &email, &hashed).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "User registered");
            Ok((
                StatusCode::CREATED,
                ApiResponse::ok_with_message("User registered successfully"),
            ))
        }
        Err(e) if is_unique_violation(&e) => {
            Err(AppError::new(ErrorCode::EmailAlreadyRegistered).into())
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /api/v1/login
///
/// Unknown email and wrong password are indistinguishable to the caller.
pub async fn login(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let email = req.email.trim().to_lowercase();
    let user = db::users::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(AppError::invalid_credentials)?;

    if !verify_password(&req.password, &user.hashed_password) {
        tracing::info!(user_id = %user.id, "Login failed: wrong password");
        return Err(AppError::invalid_credentials().into());
    }

    let access_token = state.jwt.generate_token(user.id).map_err(|e| {
        tracing::error!("JWT creation failed: {e}");
        AppError::new(ErrorCode::InternalError)
    })?;

    let refresh_token = generate_refresh_token();
    db::refresh_tokens::replace_for_user(&state.pool, user.id, &hash_token(&refresh_token)).await?;

    tracing::info!(user_id = %user.id, "User logged in");
    Ok(ApiResponse::success(LoginResponse {
        access_token,
        refresh_token,
        token_type: "Bearer",
        expires_in: state.jwt.expires_in(),
    }))
}

/// POST /api/v1/refresh
pub async fn refresh(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<RefreshRequest>,
) -> ApiResult<RefreshResponse> {
    let user_id = db::refresh_tokens::find_user(&state.pool, &hash_token(&req.refresh_token))
        .await?
        .ok_or_else(|| AppError::invalid_token("Invalid or expired refresh token"))?;

    let access_token = state.jwt.generate_token(user_id).map_err(|e| {
        tracing::error!("JWT creation failed: {e}");
        AppError::new(ErrorCode::InternalError)
    })?;

    Ok(ApiResponse::success(RefreshResponse {
        access_token,
        token_type: "Bearer",
        expires_in: state.jwt.expires_in(),
    }))
}

/// POST /api/v1/logout
pub async fn logout(State(state): State<AppState>, user: CurrentUser) -> ApiResult<()> {
    let revoked = db::refresh_tokens::delete_for_user(&state.pool, user.id).await?;
    tracing::info!(user_id = %user.id, revoked, "User logged out");
    Ok(ApiResponse::ok_with_message("Logged out successfully"))
}

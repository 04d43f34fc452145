//! Authentication middleware

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::error::AppError;

use super::extractor::authenticate;
use crate::state::AppState;

/// Require a valid access token
///
/// Applied with `route_layer` on the protected routers only, so public routes
/// never see it. CORS preflight requests pass through untouched. On success
/// the [`CurrentUser`](super::CurrentUser) is inserted into the request
/// extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    match authenticate(&state.jwt, header) {
        Ok(user) => {
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            tracing::warn!(uri = %req.uri(), code = %e.code, "Unauthenticated request rejected");
            Err(e)
        }
    }
}

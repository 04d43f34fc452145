//! `CurrentUser` extractor
//!
//! Handlers behind [`require_auth`](super::require_auth) find the user in the
//! request extensions. Anywhere else the bearer token is validated here.

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::error::AppError;

use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::state::AppState;

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(*user);
        }

        let header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());
        let user = authenticate(&state.jwt, header)?;
        parts.extensions.insert(user);
        Ok(user)
    }
}

/// Resolve an `Authorization` header value to the calling user
pub(crate) fn authenticate(
    jwt: &JwtService,
    header: Option<&str>,
) -> Result<CurrentUser, AppError> {
    let Some(header) = header else {
        return Err(AppError::not_authenticated());
    };
    let token = JwtService::extract_from_header(header)
        .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?;

    let claims = jwt.validate_token(token).map_err(|e| {
        tracing::debug!(error = %e, "Access token rejected");
        match e {
            JwtError::ExpiredToken => AppError::token_expired(),
            _ => AppError::invalid_token("Invalid token"),
        }
    })?;

    CurrentUser::try_from(claims)
        .map_err(|e| AppError::invalid_token(format!("Malformed token subject: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::ErrorCode;
    use uuid::Uuid;

    fn service() -> JwtService {
        JwtService::new("extractor-secret-extractor-secret!", 1)
    }

    #[test]
    fn test_missing_header_is_not_authenticated() {
        let err = authenticate(&service(), None).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotAuthenticated);
    }

    #[test]
    fn test_non_bearer_header_is_invalid() {
        let err = authenticate(&service(), Some("Basic dXNlcjpwYXNz")).unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenInvalid);
    }

    #[test]
    fn test_valid_token_yields_user() {
        let jwt = service();
        let id = Uuid::new_v4();
        let header = format!("Bearer {}", jwt.generate_token(id).unwrap());
        assert_eq!(authenticate(&jwt, Some(&header)).unwrap().id, id);
    }

    #[test]
    fn test_expired_token_maps_to_token_expired() {
        let expired = JwtService::new("extractor-secret-extractor-secret!", -2);
        let header = format!("Bearer {}", expired.generate_token(Uuid::new_v4()).unwrap());
        let err = authenticate(&service(), Some(&header)).unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenExpired);
    }
}

//! `AppError` and the `ApiResponse` envelope every endpoint returns

use super::category::ErrorCategory;
use super::codes::ErrorCode;
use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Client-visible error: a code, a message and optional structured details
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    /// Field-level validation reasons or numbers behind the failure
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Error carrying the code's default message
    pub fn new(code: ErrorCode) -> Self {
        Self::with_message(code, code.message())
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    pub fn not_authenticated() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::TokenInvalid, msg)
    }

    pub fn token_expired() -> Self {
        Self::new(ErrorCode::TokenExpired)
    }

    /// Same error for unknown email and wrong password
    pub fn invalid_credentials() -> Self {
        Self::new(ErrorCode::InvalidCredentials)
    }

    /// Rejected sale line, with the on-hand and requested quantities
    pub fn insufficient_stock(product_name: &str, available: i64, requested: i64) -> Self {
        Self::with_message(
            ErrorCode::InsufficientStock,
            format!(
                "insufficient stock for product '{product_name}': available {available}, requested {requested}"
            ),
        )
        .with_detail("available", available)
        .with_detail("requested", requested)
    }
}

/// Response envelope
///
/// `code` is 0 on success. On failure `data` is absent and `details` may
/// carry structured context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self::success_with_message("OK", data)
    }

    pub fn success_with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            code: Some(ErrorCode::Success.code()),
            message: message.into(),
            data: Some(data),
            details: None,
        }
    }
}

impl ApiResponse<()> {
    /// Success with no payload, e.g. logout
    pub fn ok_with_message(message: impl Into<String>) -> Self {
        Self {
            code: Some(ErrorCode::Success.code()),
            message: message.into(),
            data: None,
            details: None,
        }
    }
}

impl<T> From<AppError> for ApiResponse<T> {
    fn from(err: AppError) -> Self {
        Self {
            code: Some(err.code.code()),
            message: err.message,
            data: None,
            details: err.details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        if self.code.category() == ErrorCategory::System {
            tracing::error!(code = %self.code, message = %self.message, "System error returned to client");
        }
        (status, Json(ApiResponse::<()>::from(self))).into_response()
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = match self.code {
            None | Some(0) => StatusCode::OK,
            Some(code) => ErrorCode::try_from(code)
                .map(|c| c.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        };
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_default_message() {
        let err = AppError::new(ErrorCode::OutletNotFound);
        assert_eq!(err.message, "Outlet not found");
        assert_eq!(err.http_status(), StatusCode::NOT_FOUND);
        assert!(err.details.is_none());
    }

    #[test]
    fn test_details_accumulate() {
        let err = AppError::validation("Validation failed")
            .with_detail("email", "email")
            .with_detail("password", "length");
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.details.as_ref().map(HashMap::len), Some(2));
        assert_eq!(err.to_string(), "Validation failed");
    }

    #[test]
    fn test_insufficient_stock_message() {
        let err = AppError::insufficient_stock("Kopi Susu", 2, 5);
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(
            err.message,
            "insufficient stock for product 'Kopi Susu': available 2, requested 5"
        );
        let details = err.details.unwrap();
        assert_eq!(details["available"], 2);
        assert_eq!(details["requested"], 5);
    }

    #[test]
    fn test_envelope_skips_empty_fields() {
        let json = serde_json::to_string(&ApiResponse::ok_with_message("Logged out successfully")).unwrap();
        assert_eq!(json, r#"{"code":0,"message":"Logged out successfully"}"#);

        let json = serde_json::to_value(ApiResponse::success(42)).unwrap();
        assert_eq!(json["data"], 42);
        assert!(json.get("details").is_none());
    }

    #[test]
    fn test_error_envelope_keeps_code_and_details() {
        let err = AppError::new(ErrorCode::ProductNotFound).with_detail("product_id", "p-1");
        let response = ApiResponse::<()>::from(err);
        assert_eq!(response.code, Some(6001));
        assert!(response.data.is_none());
        assert_eq!(response.details.unwrap()["product_id"], "p-1");
    }

    #[test]
    fn test_into_response_status() {
        let response = AppError::new(ErrorCode::TransactionAlreadyPaid).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = AppError::insufficient_stock("Tea", 0, 1).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = ApiResponse::success(()).into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

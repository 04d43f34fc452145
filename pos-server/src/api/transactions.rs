//! Sales transactions

use axum::{Router, extract::State, http::StatusCode, routing::{get, post}};
use serde::{Deserialize, Serialize};
use shared::error::ApiResponse;
use shared::models::{ProductCategory, Transaction, TransactionWithDetails};
use uuid::Uuid;
use validator::Validate;

use super::extract::{ApiPath, ValidJson};
use super::{ApiResult, Created};
use crate::auth::CurrentUser;
use crate::services::transaction::{self, NewLine, NewTransaction};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/transactions", get(list).post(create))
        .route("/api/v1/transactions/{id}", get(get_by_id))
        .route("/api/v1/transactions/{id}/pay", post(pay))
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TransactionItemRequest {
    pub product_id: Uuid,
    #[validate(length(min = 1, max = 255))]
    pub product_name: String,
    pub category: ProductCategory,
    #[validate(range(min = 1, max = 127))]
    pub qty: i16,
    #[validate(range(min = 0))]
    pub price: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTransactionRequest {
    pub outlet_id: Uuid,
    #[validate(length(min = 1, message = "at least one item is required"), nested)]
    pub items: Vec<TransactionItemRequest>,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub note: String,
}

impl CreateTransactionRequest {
    fn into_input(self, user_id: Uuid) -> NewTransaction {
        NewTransaction {
            user_id,
            outlet_id: self.outlet_id,
            items: self
                .items
                .into_iter()
                .map(|i| NewLine {
                    product_id: i.product_id,
                    product_name: i.product_name.trim().to_string(),
                    category: i.category,
                    qty: i.qty,
                    price: i.price,
                })
                .collect(),
            note: self.note.trim().to_string(),
        }
    }
}

/// POST /api/v1/transactions
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidJson(req): ValidJson<CreateTransactionRequest>,
) -> Created<TransactionWithDetails> {
    let created = transaction::create(&state.pool, req.into_input(user.id)).await?;
    Ok((StatusCode::CREATED, ApiResponse::success(created)))
}

/// GET /api/v1/transactions (current user's, newest first)
pub async fn list(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Vec<Transaction>> {
    Ok(ApiResponse::success(
        transaction::list_for_user(&state.pool, user.id).await?,
    ))
}

/// GET /api/v1/transactions/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<TransactionWithDetails> {
    Ok(ApiResponse::success(transaction::get(&state.pool, id).await?))
}

/// POST /api/v1/transactions/{id}/pay
///
/// Returns as soon as the payment is recorded; the report refresh runs later.
pub async fn pay(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Transaction> {
    let paid = transaction::mark_paid(&state.pool, &state.report_signal, id).await?;
    Ok(ApiResponse::success_with_message(
        "Transaction marked as paid",
        paid,
    ))
}

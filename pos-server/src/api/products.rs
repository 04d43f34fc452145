//! Product catalog
//!
//! Creation is `multipart/form-data` so an image can ride along.

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::{Router, http::StatusCode, routing::get};
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::Product;
use uuid::Uuid;

use super::extract::ApiPath;
use super::{ApiResult, Created};
use crate::services::product::{self, ImageUpload, NewProduct, parse_price, parse_stock};
use crate::state::AppState;
use crate::storage::MAX_FILE_SIZE;

/// Room for the text fields next to a maximum-size image
const MULTIPART_LIMIT: usize = MAX_FILE_SIZE + 64 * 1024;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/products", get(list).post(create))
        .route("/api/v1/products/{id}", get(get_by_id))
        .layer(DefaultBodyLimit::max(MULTIPART_LIMIT))
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::new(ErrorCode::FileTooLarge);
    }
    AppError::with_message(ErrorCode::InvalidFormat, format!("Invalid multipart request: {e}"))
}

/// Collect the form fields; unknown fields are ignored
async fn read_form(mut multipart: Multipart) -> Result<NewProduct, AppError> {
    let mut name = None;
    let mut price = None;
    let mut stock = None;
    let mut image = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().map(str::to_owned);
        match field_name.as_deref() {
            Some("name") => name = Some(field.text().await.map_err(multipart_error)?),
            Some("price") => price = Some(field.text().await.map_err(multipart_error)?),
            Some("stock") => stock = Some(field.text().await.map_err(multipart_error)?),
            Some("image") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(multipart_error)?.to_vec();
                // Browsers send an empty part when no file was chosen
                if !(filename.is_empty() && data.is_empty()) {
                    image = Some(ImageUpload { filename, data });
                }
            }
            _ => {}
        }
    }

    let name = name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| {
            AppError::new(ErrorCode::RequiredField).with_detail("field", "name")
        })?;
    let price = parse_price(price.as_deref().unwrap_or_default())?;
    // An absent stock field means an empty catalog figure
    let stock = match stock {
        Some(raw) => parse_stock(&raw)?,
        None => 0,
    };

    Ok(NewProduct {
        name,
        price,
        stock,
        image,
    })
}

/// POST /api/v1/products
pub async fn create(State(state): State<AppState>, multipart: Multipart) -> Created<Product> {
    let input = read_form(multipart).await?;
    let product = product::create(&state.pool, &state.image_jobs, input).await?;
    Ok((StatusCode::CREATED, ApiResponse::success(product)))
}

/// GET /api/v1/products
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Product>> {
    Ok(ApiResponse::success(product::list(&state.pool).await?))
}

/// GET /api/v1/products/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Product> {
    Ok(ApiResponse::success(product::get(&state.pool, id).await?))
}

//! Product catalog

use shared::models::{ImageStatus, Product};
use shared::util::now_millis;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

const PRODUCT_COLUMNS: &str =
    "id, name, price, stock, image_url, image_status, created_at, updated_at";

pub async fn create(
    pool: &PgPool,
    name: &str,
    price: i32,
    stock: i16,
    image_status: ImageStatus,
) -> Result<Product, sqlx::Error> {
    let now = now_millis();
    sqlx::query_as::<_, Product>(&format!(
        "INSERT INTO products (id, name, price, stock, image_status, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $6) RETURNING {PRODUCT_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(price)
    .bind(stock)
    .bind(image_status.as_str())
    .bind(now)
    .fetch_one(pool)
    .await
}

/// Newest first
pub async fn list(pool: &PgPool) -> Result<Vec<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC, id"
    ))
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Which of `ids` exist in the catalog
pub async fn existing_ids(conn: &mut PgConnection, ids: &[Uuid]) -> Result<Vec<Uuid>, sqlx::Error> {
    let rows: Vec<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(conn)
        .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

/// Record the outcome of a background image write
pub async fn set_image(
    pool: &PgPool,
    id: Uuid,
    image_url: Option<&str>,
    status: ImageStatus,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE products SET image_url = COALESCE($2, image_url), image_status = $3, updated_at = $4 \
         WHERE id = $1",
    )
    .bind(id)
    .bind(image_url)
    .bind(status.as_str())
    .bind(now_millis())
    .execute(pool)
    .await?;
    Ok(())
}

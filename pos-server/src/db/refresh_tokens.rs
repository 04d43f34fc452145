//! Refresh token storage
//!
//! Only the SHA-256 digest of a token is persisted.

use shared::util::now_millis;
use sqlx::PgPool;
use uuid::Uuid;

pub const REFRESH_TOKEN_TTL_MS: i64 = 30 * 24 * 60 * 60 * 1000; // 30 days

/// Store a new token digest, dropping every other token of the user
pub async fn replace_for_user(
    pool: &PgPool,
    user_id: Uuid,
    hashed_token: &str,
) -> Result<(), sqlx::Error> {
    let now = now_millis();
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        "INSERT INTO refresh_tokens (id, user_id, hashed_token, expires_at, created_at) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(hashed_token)
    .bind(now + REFRESH_TOKEN_TTL_MS)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await
}

/// Owner of an unexpired token digest
pub async fn find_user(pool: &PgPool, hashed_token: &str) -> Result<Option<Uuid>, sqlx::Error> {
    let row: Option<(Uuid,)> = sqlx::query_as(
        "SELECT user_id FROM refresh_tokens WHERE hashed_token = $1 AND expires_at > $2",
    )
    .bind(hashed_token)
    .bind(now_millis())
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|(id,)| id))
}

pub async fn delete_for_user(pool: &PgPool, user_id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Periodic housekeeping
pub async fn delete_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at <= $1")
        .bind(now_millis())
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

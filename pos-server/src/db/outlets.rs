//! Outlets

use shared::models::Outlet;
use shared::util::now_millis;
use sqlx::PgPool;
use uuid::Uuid;

pub async fn create(pool: &PgPool, name: &str) -> Result<Outlet, sqlx::Error> {
    sqlx::query_as::<_, Outlet>(
        "INSERT INTO outlets (id, name, created_at) VALUES ($1, $2, $3) \
         RETURNING id, name, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(now_millis())
    .fetch_one(pool)
    .await
}

pub async fn list(pool: &PgPool) -> Result<Vec<Outlet>, sqlx::Error> {
    sqlx::query_as::<_, Outlet>("SELECT id, name, created_at FROM outlets ORDER BY name, id")
        .fetch_all(pool)
        .await
}

pub async fn exists(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let (found,): (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM outlets WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(found)
}

//! Sales transactions and their lines

use shared::models::{Transaction, TransactionDetail};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

const TRANSACTION_COLUMNS: &str = "id, user_id, outlet_id, invoice_code, total, note, is_paid, \
                                   paid_at, created_at, updated_at";

/// Insert a header. A duplicate invoice code surfaces as a unique violation.
pub async fn insert(conn: &mut PgConnection, tx: &Transaction) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO transactions (id, user_id, outlet_id, invoice_code, total, note, is_paid, \
         paid_at, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(tx.id)
    .bind(tx.user_id)
    .bind(tx.outlet_id)
    .bind(&tx.invoice_code)
    .bind(tx.total)
    .bind(&tx.note)
    .bind(tx.is_paid)
    .bind(tx.paid_at)
    .bind(tx.created_at)
    .bind(tx.updated_at)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn insert_details(
    conn: &mut PgConnection,
    details: &[TransactionDetail],
) -> Result<(), sqlx::Error> {
    if details.is_empty() {
        return Ok(());
    }
    let ids: Vec<Uuid> = details.iter().map(|d| d.id).collect();
    let tx_ids: Vec<Uuid> = details.iter().map(|d| d.transaction_id).collect();
    let product_ids: Vec<Uuid> = details.iter().map(|d| d.product_id).collect();
    let names: Vec<String> = details.iter().map(|d| d.product_name.clone()).collect();
    let categories: Vec<i16> = details.iter().map(|d| d.category.into()).collect();
    let qtys: Vec<i16> = details.iter().map(|d| d.qty).collect();
    let prices: Vec<i32> = details.iter().map(|d| d.price).collect();

    sqlx::query(
        r#"
        INSERT INTO transaction_details (id, transaction_id, product_id, product_name, category, qty, price)
        SELECT * FROM UNNEST($1::uuid[], $2::uuid[], $3::uuid[], $4::text[], $5::smallint[], $6::smallint[], $7::integer[])
        "#,
    )
    .bind(&ids)
    .bind(&tx_ids)
    .bind(&product_ids)
    .bind(&names)
    .bind(&categories)
    .bind(&qtys)
    .bind(&prices)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Transaction>, sqlx::Error> {
    sqlx::query_as::<_, Transaction>(&format!(
        "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn details_of(
    pool: &PgPool,
    transaction_id: Uuid,
) -> Result<Vec<TransactionDetail>, sqlx::Error> {
    sqlx::query_as::<_, TransactionDetail>(
        "SELECT id, transaction_id, product_id, product_name, category, qty, price \
         FROM transaction_details WHERE transaction_id = $1 ORDER BY product_name, id",
    )
    .bind(transaction_id)
    .fetch_all(pool)
    .await
}

/// Newest first
pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Transaction>, sqlx::Error> {
    sqlx::query_as::<_, Transaction>(&format!(
        "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE user_id = $1 \
         ORDER BY created_at DESC, id"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Outcome of [`mark_paid`]
#[derive(Debug)]
pub enum PayOutcome {
    Paid(Transaction),
    AlreadyPaid,
    NotFound,
}

/// Flip `is_paid` exactly once. The conditional update keeps concurrent
/// payments of the same transaction from both succeeding.
pub async fn mark_paid(pool: &PgPool, id: Uuid, now: i64) -> Result<PayOutcome, sqlx::Error> {
    let updated = sqlx::query_as::<_, Transaction>(&format!(
        "UPDATE transactions SET is_paid = TRUE, paid_at = $2, updated_at = $2 \
         WHERE id = $1 AND NOT is_paid RETURNING {TRANSACTION_COLUMNS}"
    ))
    .bind(id)
    .bind(now)
    .fetch_optional(pool)
    .await?;

    if let Some(tx) = updated {
        return Ok(PayOutcome::Paid(tx));
    }

    let exists: Option<(bool,)> = sqlx::query_as("SELECT is_paid FROM transactions WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(match exists {
        Some(_) => PayOutcome::AlreadyPaid,
        None => PayOutcome::NotFound,
    })
}

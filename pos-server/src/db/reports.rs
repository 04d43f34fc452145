//! Aggregate transaction report (single row, id = 1)

use shared::models::{ProductCategory, TransactionReport};
use sqlx::{PgConnection, PgPool};

const REPORT_COLUMNS: &str = "total_revenue, total_paid_transactions, total_products_sold, \
                              total_unique_customers, category_summary, updated_at";

pub async fn get(pool: &PgPool) -> Result<Option<TransactionReport>, sqlx::Error> {
    sqlx::query_as::<_, TransactionReport>(&format!(
        "SELECT {REPORT_COLUMNS} FROM transaction_reports WHERE id = 1"
    ))
    .fetch_optional(pool)
    .await
}

/// Row-lock the report for the rest of the transaction. `false` when the row
/// is missing.
pub async fn lock(conn: &mut PgConnection) -> Result<bool, sqlx::Error> {
    let row: Option<(i16,)> =
        sqlx::query_as("SELECT id FROM transaction_reports WHERE id = 1 FOR UPDATE")
            .fetch_optional(conn)
            .await?;
    Ok(row.is_some())
}

/// Recompute every figure over paid transactions
pub async fn aggregate_paid(conn: &mut PgConnection) -> Result<TransactionReport, sqlx::Error> {
    let (total_revenue, total_paid_transactions, total_unique_customers): (i64, i64, i64) =
        sqlx::query_as(
            "SELECT COALESCE(SUM(total), 0)::BIGINT, COUNT(*), COUNT(DISTINCT user_id) \
             FROM transactions WHERE is_paid",
        )
        .fetch_one(&mut *conn)
        .await?;

    let by_category: Vec<(i16, i64)> = sqlx::query_as(
        "SELECT d.category, SUM(d.qty)::BIGINT FROM transaction_details d \
         JOIN transactions t ON t.id = d.transaction_id \
         WHERE t.is_paid GROUP BY d.category",
    )
    .fetch_all(&mut *conn)
    .await?;

    let mut report = TransactionReport {
        total_revenue,
        total_paid_transactions,
        total_unique_customers,
        ..Default::default()
    };
    for (category, units) in by_category {
        report.total_products_sold += units;
        *report
            .category_summary
            .entry(ProductCategory::label_for(category).to_string())
            .or_default() += units;
    }
    Ok(report)
}

pub async fn store(
    conn: &mut PgConnection,
    report: &TransactionReport,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE transaction_reports SET total_revenue = $1, total_paid_transactions = $2, \
         total_products_sold = $3, total_unique_customers = $4, category_summary = $5, \
         updated_at = $6 WHERE id = 1",
    )
    .bind(report.total_revenue)
    .bind(report.total_paid_transactions)
    .bind(report.total_products_sold)
    .bind(report.total_unique_customers)
    .bind(sqlx::types::Json(&report.category_summary))
    .bind(now)
    .execute(conn)
    .await?;
    Ok(())
}

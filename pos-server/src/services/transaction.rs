//! Sales
//!
//! A sale is one database transaction: per (product, outlet) advisory lock,
//! stock check, header, lines and stock-out ledger entries. Nothing is
//! written if any line lacks stock.

use shared::error::{AppError, ErrorCode};
use shared::models::{
    ProductCategory, Transaction, TransactionDetail, TransactionWithDetails,
};
use shared::util::{now_millis, year_of_millis};
use sqlx::{Acquire, PgPool};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::db::transactions::{self, PayOutcome};
use crate::db::{ledger, outlets, products};
use crate::error::{ServiceResult, is_unique_violation};
use crate::services::report_worker::ReportSignal;
use crate::util::{INVOICE_CODES_PER_YEAR, generate_invoice_code};

/// Invoice codes are random; give up after this many collisions in a row
const MAX_INVOICE_ATTEMPTS: u32 = 8;

/// Collisions before a sale logs that the year's invoice codes are running out.
/// Two in a row stays under 1% while less than a tenth of the codes are taken.
const CROWDED_AFTER_COLLISIONS: u32 = 2;

fn invoice_space_crowded(collisions: u32) -> bool {
    collisions >= CROWDED_AFTER_COLLISIONS
}

#[derive(Debug, Clone)]
pub struct NewLine {
    pub product_id: Uuid,
    pub product_name: String,
    pub category: ProductCategory,
    pub qty: i16,
    pub price: i32,
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub user_id: Uuid,
    pub outlet_id: Uuid,
    pub items: Vec<NewLine>,
    pub note: String,
}

/// Requested units per product across all lines, with the first line's name
fn requested_per_product(items: &[NewLine]) -> BTreeMap<Uuid, (&str, i64)> {
    let mut requested: BTreeMap<Uuid, (&str, i64)> = BTreeMap::new();
    for line in items {
        requested
            .entry(line.product_id)
            .or_insert((line.product_name.as_str(), 0))
            .1 += i64::from(line.qty);
    }
    requested
}

fn detail_rows(transaction_id: Uuid, items: &[NewLine]) -> Vec<TransactionDetail> {
    items
        .iter()
        .map(|l| TransactionDetail {
            id: Uuid::new_v4(),
            transaction_id,
            product_id: l.product_id,
            product_name: l.product_name.clone(),
            category: l.category,
            qty: l.qty,
            price: l.price,
        })
        .collect()
}

fn total_of(details: &[TransactionDetail]) -> i64 {
    details.iter().map(TransactionDetail::line_total).sum()
}

fn compose_note(invoice_code: &str, items: &[NewLine], note: &str) -> String {
    let names: Vec<&str> = items.iter().map(|l| l.product_name.as_str()).collect();
    format!(
        "INV {} includes: {}. Additional notes: {}",
        invoice_code,
        names.join(", "),
        note
    )
}

pub async fn create(pool: &PgPool, input: NewTransaction) -> ServiceResult<TransactionWithDetails> {
    if input.items.is_empty() {
        return Err(AppError::new(ErrorCode::TransactionEmpty).into());
    }
    if let Some(line) = input.items.iter().find(|l| l.qty < 1) {
        return Err(AppError::new(ErrorCode::InvalidQuantity)
            .with_detail("product_id", line.product_id.to_string())
            .into());
    }
    if !outlets::exists(pool, input.outlet_id).await? {
        return Err(AppError::new(ErrorCode::OutletNotFound).into());
    }

    let requested = requested_per_product(&input.items);
    let product_ids: Vec<Uuid> = requested.keys().copied().collect();

    let mut tx = pool.begin().await?;

    let known = products::existing_ids(&mut tx, &product_ids).await?;
    if let Some(missing) = product_ids.iter().find(|id| !known.contains(id)) {
        return Err(AppError::new(ErrorCode::ProductNotFound)
            .with_detail("product_id", missing.to_string())
            .into());
    }

    // BTreeMap order keeps lock acquisition consistent across concurrent sales
    for (product_id, (name, wanted)) in &requested {
        ledger::lock_pair(&mut tx, *product_id, input.outlet_id).await?;
        let available = ledger::on_hand(&mut tx, *product_id, input.outlet_id).await?;
        if available < *wanted {
            tracing::info!(
                product_id = %product_id,
                outlet_id = %input.outlet_id,
                available,
                requested = wanted,
                "Sale rejected, insufficient stock"
            );
            return Err(AppError::insufficient_stock(name, available, *wanted).into());
        }
    }

    let now = now_millis();
    let id = Uuid::new_v4();
    let details = detail_rows(id, &input.items);
    let total = total_of(&details);

    let year = year_of_millis(now);
    let mut header = None;
    for attempt in 1..=MAX_INVOICE_ATTEMPTS {
        let invoice_code = generate_invoice_code(year);
        let candidate = Transaction {
            id,
            user_id: input.user_id,
            outlet_id: input.outlet_id,
            note: compose_note(&invoice_code, &input.items, &input.note),
            invoice_code,
            total,
            is_paid: false,
            paid_at: None,
            created_at: now,
            updated_at: now,
        };

        // Savepoint so a collision does not abort the whole sale
        let mut savepoint = (&mut tx).begin().await?;
        match transactions::insert(&mut savepoint, &candidate).await {
            Ok(()) => {
                savepoint.commit().await?;
                if invoice_space_crowded(attempt - 1) {
                    tracing::warn!(
                        year,
                        collisions = attempt - 1,
                        capacity = INVOICE_CODES_PER_YEAR,
                        "Invoice codes for this year are running out"
                    );
                }
                header = Some(candidate);
                break;
            }
            Err(e) if is_unique_violation(&e) => {
                savepoint.rollback().await?;
                tracing::debug!(attempt, invoice_code = %candidate.invoice_code, "Invoice code collision");
            }
            Err(e) => return Err(e.into()),
        }
    }
    let Some(header) = header else {
        tracing::error!(
            year,
            attempts = MAX_INVOICE_ATTEMPTS,
            capacity = INVOICE_CODES_PER_YEAR,
            "No free invoice code found"
        );
        return Err(AppError::new(ErrorCode::InvoiceCodeExhausted).into());
    };

    transactions::insert_details(&mut tx, &details).await?;

    let stock_out: Vec<ledger::StockOut> = input
        .items
        .iter()
        .map(|l| ledger::StockOut {
            item_id: l.product_id,
            qty: i32::from(l.qty),
        })
        .collect();
    ledger::insert_stock_out(&mut tx, id, input.outlet_id, &stock_out, now).await?;

    tx.commit().await?;

    tracing::info!(
        transaction_id = %id,
        invoice_code = %header.invoice_code,
        total,
        lines = details.len(),
        "Transaction created"
    );
    Ok(TransactionWithDetails {
        transaction: header,
        details,
    })
}

pub async fn get(pool: &PgPool, id: Uuid) -> ServiceResult<TransactionWithDetails> {
    let transaction = transactions::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::TransactionNotFound))?;
    let details = transactions::details_of(pool, id).await?;
    Ok(TransactionWithDetails {
        transaction,
        details,
    })
}

pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> ServiceResult<Vec<Transaction>> {
    Ok(transactions::list_for_user(pool, user_id).await?)
}

/// Mark paid once, then ask for a report refresh. Never waits for the report.
pub async fn mark_paid(
    pool: &PgPool,
    signal: &ReportSignal,
    id: Uuid,
) -> ServiceResult<Transaction> {
    match transactions::mark_paid(pool, id, now_millis()).await? {
        PayOutcome::Paid(tx) => {
            tracing::info!(transaction_id = %id, invoice_code = %tx.invoice_code, "Transaction paid");
            signal.notify();
            Ok(tx)
        }
        PayOutcome::AlreadyPaid => Err(AppError::new(ErrorCode::TransactionAlreadyPaid).into()),
        PayOutcome::NotFound => Err(AppError::new(ErrorCode::TransactionNotFound).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product_id: Uuid, name: &str, qty: i16, price: i32) -> NewLine {
        NewLine {
            product_id,
            product_name: name.into(),
            category: ProductCategory::Goods,
            qty,
            price,
        }
    }

    #[test]
    fn test_requested_sums_repeated_products() {
        let (latte, muffin) = (Uuid::new_v4(), Uuid::new_v4());
        let items = vec![
            line(latte, "Latte", 2, 35_000),
            line(muffin, "Muffin", 1, 20_000),
            line(latte, "Latte (iced)", 3, 38_000),
        ];
        let requested = requested_per_product(&items);
        assert_eq!(requested.len(), 2);
        assert_eq!(requested[&latte], ("Latte", 5));
        assert_eq!(requested[&muffin], ("Muffin", 1));
    }

    #[test]
    fn test_total_uses_wide_arithmetic() {
        let items = vec![
            line(Uuid::new_v4(), "A", 127, i32::MAX),
            line(Uuid::new_v4(), "B", 2, 10),
        ];
        let details = detail_rows(Uuid::new_v4(), &items);
        assert_eq!(total_of(&details), 127 * i64::from(i32::MAX) + 20);
    }

    #[test]
    fn test_crowding_warning_threshold() {
        assert!(!invoice_space_crowded(0));
        assert!(!invoice_space_crowded(1));
        assert!(invoice_space_crowded(2));
        assert!(invoice_space_crowded(MAX_INVOICE_ATTEMPTS - 1));
    }

    #[test]
    fn test_note_lists_items() {
        let items = vec![
            line(Uuid::new_v4(), "Latte", 1, 1),
            line(Uuid::new_v4(), "Muffin", 1, 1),
        ];
        assert_eq!(
            compose_note("INV-2025-0042", &items, "no sugar"),
            "INV INV-2025-0042 includes: Latte, Muffin. Additional notes: no sugar"
        );
    }
}

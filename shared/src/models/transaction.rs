//! Sales Transaction Model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::product::ProductCategory;

/// Sales transaction header
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Transaction {
    pub id: Uuid,
    /// Cashier who rang up the sale
    pub user_id: Uuid,
    pub outlet_id: Uuid,
    /// Human-readable identifier, e.g. `INV-2025-0042`
    pub invoice_code: String,
    /// Σ qty × price over all details
    pub total: i64,
    pub note: String,
    pub is_paid: bool,
    pub paid_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// One sold line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct TransactionDetail {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    #[cfg_attr(feature = "db", sqlx(try_from = "i16"))]
    pub category: ProductCategory,
    pub qty: i16,
    pub price: i32,
}

impl TransactionDetail {
    pub fn line_total(&self) -> i64 {
        i64::from(self.qty) * i64::from(self.price)
    }
}

/// Transaction header together with its lines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionWithDetails {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub details: Vec<TransactionDetail>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(qty: i16, price: i32) -> TransactionDetail {
        TransactionDetail {
            id: Uuid::new_v4(),
            transaction_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            product_name: "Americano".into(),
            category: ProductCategory::Goods,
            qty,
            price,
        }
    }

    #[test]
    fn test_line_total_does_not_overflow_i32() {
        let d = detail(127, i32::MAX);
        assert_eq!(d.line_total(), 127 * i64::from(i32::MAX));
    }

    #[test]
    fn test_with_details_flattens_header() {
        let tx = Transaction {
            id: Uuid::nil(),
            user_id: Uuid::nil(),
            outlet_id: Uuid::nil(),
            invoice_code: "INV-2025-0001".into(),
            total: 30_000,
            note: String::new(),
            is_paid: false,
            paid_at: None,
            created_at: 0,
            updated_at: 0,
        };
        let body = serde_json::to_value(TransactionWithDetails {
            transaction: tx,
            details: vec![detail(2, 15_000)],
        })
        .unwrap();
        assert_eq!(body["invoice_code"], "INV-2025-0001");
        assert_eq!(body["details"][0]["category"], 1);
    }
}

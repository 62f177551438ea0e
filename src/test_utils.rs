//! Builders for ledger records used by unit and integration tests.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::InventoryTransaction;

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("test date must be YYYY-MM-DD")
}

/// Fluent builder for an [`InventoryTransaction`]. Defaults: PVALVE product,
/// quantity 1, dated 2025-01-01, not deleted, no serial.
pub struct TxBuilder {
    tx: InventoryTransaction,
}

impl TxBuilder {
    pub fn new(action: &str, spec_no: &str) -> Self {
        Self {
            tx: InventoryTransaction {
                id: Uuid::new_v4(),
                date: day("2025-01-01"),
                action: action.to_string(),
                product_type: "PVALVE".to_string(),
                spec_no: spec_no.to_string(),
                serial_no: None,
                qty: 1,
                exp_date: None,
                batch_no: None,
                inspection: None,
                condition: None,
                case_id: None,
                operator: None,
                provenance: None,
                notes: None,
                deleted_at: None,
            },
        }
    }

    pub fn id(mut self, id: Uuid) -> Self {
        self.tx.id = id;
        self
    }

    pub fn date(mut self, s: &str) -> Self {
        self.tx.date = day(s);
        self
    }

    pub fn product_type(mut self, s: &str) -> Self {
        self.tx.product_type = s.to_string();
        self
    }

    pub fn serial(mut self, s: &str) -> Self {
        self.tx.serial_no = Some(s.to_string());
        self
    }

    pub fn qty(mut self, qty: i64) -> Self {
        self.tx.qty = qty;
        self
    }

    pub fn exp(mut self, s: &str) -> Self {
        self.tx.exp_date = Some(day(s));
        self
    }

    pub fn exp_date(mut self, d: NaiveDate) -> Self {
        self.tx.exp_date = Some(d);
        self
    }

    pub fn batch(mut self, s: &str) -> Self {
        self.tx.batch_no = Some(s.to_string());
        self
    }

    pub fn operator(mut self, s: &str) -> Self {
        self.tx.operator = Some(s.to_string());
        self
    }

    pub fn provenance(mut self, s: &str) -> Self {
        self.tx.provenance = Some(s.to_string());
        self
    }

    pub fn notes(mut self, s: &str) -> Self {
        self.tx.notes = Some(s.to_string());
        self
    }

    pub fn build(self) -> InventoryTransaction {
        self.tx
    }
}

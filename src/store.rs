//! Read access to the append-only transaction store.
//!
//! Every view goes through [`query_transactions`], which is the single
//! place the soft-delete predicate is applied. Repeating `deleted_at IS
//! NULL` in each view is how one of them eventually forgets it.

use sqlx::QueryBuilder;

use crate::database::Database;
use crate::models::InventoryTransaction;

#[derive(Debug, Clone, Default)]
pub struct TxFilter {
    pub product_type: Option<String>,
    pub spec_no: Option<String>,
    pub serial_no: Option<String>,
    pub action: Option<String>,
}

impl TxFilter {
    pub fn for_product(product_type: &str) -> Self {
        Self {
            product_type: Some(product_type.to_string()),
            ..Self::default()
        }
    }

    pub fn for_spec(spec_no: &str, product_type: &str) -> Self {
        Self {
            product_type: Some(product_type.to_string()),
            spec_no: Some(spec_no.to_string()),
            ..Self::default()
        }
    }
}

/// Fetch non-deleted ledger records matching the filter, oldest first.
pub async fn query_transactions(
    db: &Database,
    filter: &TxFilter,
) -> Result<Vec<InventoryTransaction>, sqlx::Error> {
    let mut query = QueryBuilder::new(
        "SELECT id, date, action, product_type, spec_no, serial_no, qty, exp_date, batch_no, \
         inspection, condition, case_id, operator, provenance, notes, deleted_at \
         FROM inventory_transactions WHERE deleted_at IS NULL",
    );
    if let Some(product_type) = &filter.product_type {
        query.push(" AND product_type = ").push_bind(product_type.clone());
    }
    if let Some(spec_no) = &filter.spec_no {
        query.push(" AND spec_no = ").push_bind(spec_no.clone());
    }
    if let Some(serial_no) = &filter.serial_no {
        query.push(" AND serial_no = ").push_bind(serial_no.clone());
    }
    if let Some(action) = &filter.action {
        query.push(" AND action = ").push_bind(action.clone());
    }
    query.push(" ORDER BY date, id");

    query
        .build_query_as::<InventoryTransaction>()
        .fetch_all(db)
        .await
}

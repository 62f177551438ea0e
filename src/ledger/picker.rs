//! FIFO-by-expiry allocation of physical units to a clinical case.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::InventoryTransaction;

use super::aggregate::{replay, ActionUniverse, SerialGroup};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PickedUnit {
    pub serial_no: String,
    pub spec_no: String,
    pub exp_date: Option<NaiveDate>,
    pub batch_no: Option<String>,
    /// Always 1: each physical unit is its own row.
    pub qty: i64,
}

/// Candidate units for a case on `case_date`, soonest-expiring first.
///
/// Excluded: the unserialized bucket, units with no shelf stock, and units
/// already expired on the case date. Units with no recorded expiry sort
/// last and are never treated as expired. Ties on expiry break by serial
/// number so the order is deterministic.
fn candidates(txs: &[InventoryTransaction], case_date: NaiveDate) -> Vec<(String, SerialGroup)> {
    let mut list: Vec<(String, SerialGroup)> = replay(txs, ActionUniverse::ExcludeDemo)
        .into_iter()
        .filter_map(|(key, g)| key.map(|serial| (serial, g)))
        .filter(|(_, g)| g.on_shelf > 0)
        .filter(|(_, g)| g.exp_date.map_or(true, |exp| exp >= case_date))
        .collect();
    list.sort_by(|(sa, ga), (sb, gb)| {
        let ea = ga.exp_date.unwrap_or(NaiveDate::MAX);
        let eb = gb.exp_date.unwrap_or(NaiveDate::MAX);
        ea.cmp(&eb).then_with(|| sa.cmp(sb))
    });
    list
}

fn expand(units: Vec<(String, SerialGroup)>, spec_no: &str, limit: Option<i64>) -> Vec<PickedUnit> {
    let mut picked = Vec::new();
    for (serial, g) in units {
        for _ in 0..g.on_shelf {
            if limit.is_some_and(|n| picked.len() as i64 >= n) {
                return picked;
            }
            picked.push(PickedUnit {
                serial_no: serial.clone(),
                spec_no: spec_no.to_string(),
                exp_date: g.exp_date,
                batch_no: g.batch_no.clone(),
                qty: 1,
            });
        }
    }
    picked
}

/// Auto-select up to `qty` units for a case, FIFO by expiry. Short stock is
/// not an error: the caller flags partial fulfillment.
///
/// Callers pass transactions already filtered to (spec_no, product_type).
pub fn pick_products(
    txs: &[InventoryTransaction],
    spec_no: &str,
    qty: i64,
    case_date: NaiveDate,
) -> Vec<PickedUnit> {
    if qty <= 0 {
        return Vec::new();
    }
    expand(candidates(txs, case_date), spec_no, Some(qty))
}

/// The whole candidate set in picking order, for manual selection UIs.
pub fn available_products(
    txs: &[InventoryTransaction],
    spec_no: &str,
    case_date: NaiveDate,
) -> Vec<PickedUnit> {
    expand(candidates(txs, case_date), spec_no, None)
}

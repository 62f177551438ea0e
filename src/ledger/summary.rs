//! Spec-level inventory summary: available / WIP / approaching-expiry /
//! expired, one row per spec number.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::InventoryTransaction;

use super::aggregate::{replay, ActionUniverse};
use super::dates::near_expiry_cutoff;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub spec_no: String,
    pub available: i64,
    pub wip: i64,
    pub approaching_exp: i64,
    pub expired: i64,
}

/// Build one summary row per distinct spec number, sorted ascending.
///
/// The expiry buckets need their own grouping key: several serials can share
/// an expiry date and the 30-day window is a date-range predicate, so net
/// quantity is aggregated per (spec, exp_date) pair over the shelf-affecting
/// actions, independently of the per-serial totals, and clamped to zero
/// before bucketing. `available` is the on-shelf stock left over after the
/// expired and approaching buckets are carved out.
///
/// Callers pass transactions already filtered to one product type; `today`
/// is the wall-clock date read at the request edge.
pub fn inventory_summary(txs: &[InventoryTransaction], today: NaiveDate) -> Vec<SummaryRow> {
    let cutoff = near_expiry_cutoff(today);

    let mut by_spec: BTreeMap<&str, Vec<&InventoryTransaction>> = BTreeMap::new();
    for tx in txs {
        by_spec.entry(tx.spec_no.as_str()).or_default().push(tx);
    }

    let mut rows = Vec::with_capacity(by_spec.len());
    for (spec_no, list) in by_spec {
        let groups = replay(list.iter().copied(), ActionUniverse::All);
        let shelf_total: i64 = groups.values().map(|g| g.on_shelf).sum();
        let wip_total: i64 = groups.values().map(|g| g.wip).sum();

        // Second pass on a different key: net shelf quantity per expiry date.
        let mut net_by_exp: BTreeMap<NaiveDate, i64> = BTreeMap::new();
        for tx in &list {
            let Some(action) = tx.tx_action() else { continue };
            if action.shelf_mult() == 0 {
                continue;
            }
            if let Some(exp) = tx.exp_date {
                *net_by_exp.entry(exp).or_insert(0) += tx.qty * action.shelf_mult();
            }
        }

        let mut approaching_exp = 0;
        let mut expired = 0;
        for (exp, net) in net_by_exp {
            let net = net.max(0);
            if exp < today {
                expired += net;
            } else if exp <= cutoff {
                approaching_exp += net;
            }
        }

        rows.push(SummaryRow {
            spec_no: spec_no.to_string(),
            available: (shelf_total.max(0) - approaching_exp - expired).max(0),
            wip: wip_total.max(0),
            approaching_exp,
            expired,
        });
    }
    rows
}

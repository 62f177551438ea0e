//! Per-unit inventory detail for one spec: available / WIP / near-expiry /
//! expired / returned-to-source buckets.

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::models::InventoryTransaction;

use super::aggregate::{replay, ActionUniverse, SerialGroup};
use super::dates::near_expiry_cutoff;

#[derive(Debug, Clone, Serialize)]
pub struct DetailRow {
    pub batch_no: Option<String>,
    pub spec_no: String,
    /// Receiving date of the unit's earliest REC_CN.
    pub rec_date: Option<NaiveDate>,
    pub serial_no: String,
    pub exp_date: Option<NaiveDate>,
    pub quantity: i64,
    /// Date of the movement that put the row in its bucket.
    pub action_date: Option<NaiveDate>,
    pub operator: Option<String>,
    pub transaction_ids: Vec<Uuid>,
}

#[derive(Debug, Default, Serialize)]
pub struct DetailBuckets {
    pub available: Vec<DetailRow>,
    pub wip: Vec<DetailRow>,
    pub near_exp: Vec<DetailRow>,
    pub expired: Vec<DetailRow>,
    pub returned_to_source: Vec<DetailRow>,
}

fn row(g: &SerialGroup, spec_no: &str, serial_no: &str, quantity: i64, action_date: Option<NaiveDate>) -> DetailRow {
    DetailRow {
        batch_no: g.batch_no.clone(),
        spec_no: spec_no.to_string(),
        rec_date: g.rec_date,
        serial_no: serial_no.to_string(),
        exp_date: g.exp_date,
        quantity,
        action_date,
        operator: g.operator.clone(),
        transaction_ids: g.transaction_ids.clone(),
    }
}

/// Build the per-unit buckets for one (spec, product type).
///
/// Demo moves are filtered out of the action universe entirely, so a unit
/// sitting in demo status still shows its pre-demo shelf arithmetic here;
/// demo stock itself is reported by the reconciler. The unserialized bucket
/// never produces rows. A unit lands in exactly one of available / near_exp /
/// expired; the WIP and returned lists are independent of that split, so a
/// unit with both shelf stock and a return history appears in both.
///
/// Callers pass transactions already filtered to (spec_no, product_type).
pub fn inventory_detail(
    txs: &[InventoryTransaction],
    spec_no: &str,
    case_date: NaiveDate,
) -> DetailBuckets {
    let cutoff = near_expiry_cutoff(case_date);
    let groups = replay(txs, ActionUniverse::ExcludeDemo);

    let mut out = DetailBuckets::default();
    for (key, g) in &groups {
        let Some(serial) = key.as_deref() else { continue };

        let returned = g.out_cn;
        if returned > 0 {
            out.returned_to_source
                .push(row(g, spec_no, serial, returned, g.last_out_cn));
        }

        let wip = (g.out_case - g.rec_case - g.used_case).max(0);
        if wip > 0 {
            out.wip.push(row(g, spec_no, serial, wip, g.last_out_case));
        }

        let on_shelf = g.on_shelf;
        if on_shelf > 0 {
            let bucket = match g.exp_date {
                Some(exp) if exp < case_date => &mut out.expired,
                Some(exp) if exp <= cutoff => &mut out.near_exp,
                // No recorded expiry never counts as expired or near-expiry.
                _ => &mut out.available,
            };
            bucket.push(row(g, spec_no, serial, on_shelf, g.rec_date));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TxBuilder;
    use chrono::Duration;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn issued_unit_shows_as_wip_not_available() {
        let txs = vec![
            TxBuilder::new("REC_CN", "P28-25")
                .serial("S1")
                .date("2025-04-01")
                .exp("2025-06-01")
                .build(),
            TxBuilder::new("OUT_CASE", "P28-25").serial("S1").date("2025-05-01").build(),
        ];
        let buckets = inventory_detail(&txs, "P28-25", day("2025-05-01"));
        assert!(buckets.available.is_empty());
        assert_eq!(buckets.wip.len(), 1);
        assert_eq!(buckets.wip[0].serial_no, "S1");
        assert_eq!(buckets.wip[0].quantity, 1);
        assert_eq!(buckets.wip[0].action_date, Some(day("2025-05-01")));
    }

    #[test]
    fn fully_issued_unit_has_no_shelf_row() {
        let txs = vec![
            TxBuilder::new("REC_CN", "P28-25").serial("S1").qty(5).exp("2027-01-01").build(),
            TxBuilder::new("OUT_CASE", "P28-25").serial("S1").qty(5).build(),
        ];
        let buckets = inventory_detail(&txs, "P28-25", day("2025-06-01"));
        assert!(buckets.available.is_empty());
        assert!(buckets.near_exp.is_empty());
        assert!(buckets.expired.is_empty());
        assert!(buckets.returned_to_source.is_empty());
    }

    #[test]
    fn on_shelf_split_is_mutually_exclusive() {
        let today = day("2025-06-01");
        let txs = vec![
            TxBuilder::new("REC_CN", "P28-25")
                .serial("FRESH")
                .exp_date(today + Duration::days(200))
                .build(),
            TxBuilder::new("REC_CN", "P28-25")
                .serial("SOON")
                .exp_date(today + Duration::days(30))
                .build(),
            TxBuilder::new("REC_CN", "P28-25")
                .serial("GONE")
                .exp_date(today - Duration::days(1))
                .build(),
        ];
        let buckets = inventory_detail(&txs, "P28-25", today);
        let serial = |rows: &[DetailRow]| rows.iter().map(|r| r.serial_no.clone()).collect::<Vec<_>>();
        assert_eq!(serial(&buckets.available), vec!["FRESH"]);
        assert_eq!(serial(&buckets.near_exp), vec!["SOON"]);
        assert_eq!(serial(&buckets.expired), vec!["GONE"]);
    }

    #[test]
    fn unit_without_expiry_is_available() {
        let txs = vec![TxBuilder::new("REC_CN", "P28-25").serial("S1").build()];
        let buckets = inventory_detail(&txs, "P28-25", day("2025-06-01"));
        assert_eq!(buckets.available.len(), 1);
        assert!(buckets.near_exp.is_empty());
        assert!(buckets.expired.is_empty());
    }

    #[test]
    fn returned_units_are_reported_alongside_shelf_stock() {
        let txs = vec![
            TxBuilder::new("REC_CN", "P28-25")
                .serial("S1")
                .date("2025-01-01")
                .qty(3)
                .exp("2027-01-01")
                .batch("B7")
                .build(),
            TxBuilder::new("OUT_CN", "P28-25").serial("S1").date("2025-02-01").qty(1).build(),
            TxBuilder::new("OUT_CN", "P28-25").serial("S1").date("2025-03-01").qty(1).build(),
        ];
        let buckets = inventory_detail(&txs, "P28-25", day("2025-06-01"));
        // One unit left on the shelf, two sent back to the supplier.
        assert_eq!(buckets.available.len(), 1);
        assert_eq!(buckets.available[0].quantity, 1);
        assert_eq!(buckets.returned_to_source.len(), 1);
        let ret = &buckets.returned_to_source[0];
        assert_eq!(ret.quantity, 2);
        assert_eq!(ret.action_date, Some(day("2025-03-01")));
        assert_eq!(ret.batch_no.as_deref(), Some("B7"));
    }

    #[test]
    fn demo_moves_are_invisible_to_the_detail_view() {
        let txs = vec![
            TxBuilder::new("REC_CN", "P28-25").serial("S1").qty(2).exp("2027-01-01").build(),
            TxBuilder::new("MOVE_DEMO", "P28-25").serial("S1").qty(2).build(),
        ];
        let buckets = inventory_detail(&txs, "P28-25", day("2025-06-01"));
        // The whole action type is filtered upstream, so the unit still
        // reads as on-shelf here; the demo reconciler owns demo stock.
        assert_eq!(buckets.available.len(), 1);
        assert_eq!(buckets.available[0].quantity, 2);
    }

    #[test]
    fn unserialized_stock_produces_no_rows() {
        let txs = vec![TxBuilder::new("REC_CN", "P28-25").qty(10).exp("2027-01-01").build()];
        let buckets = inventory_detail(&txs, "P28-25", day("2025-06-01"));
        assert!(buckets.available.is_empty());
        assert!(buckets.wip.is_empty());
        assert!(buckets.near_exp.is_empty());
        assert!(buckets.expired.is_empty());
        assert!(buckets.returned_to_source.is_empty());
    }

    #[test]
    fn row_metadata_comes_from_the_earliest_receipt() {
        let txs = vec![
            TxBuilder::new("REC_CN", "P28-25")
                .serial("S1")
                .date("2025-02-01")
                .exp("2027-02-01")
                .batch("B2")
                .operator("bob")
                .build(),
            TxBuilder::new("REC_CN", "P28-25")
                .serial("S1")
                .date("2025-01-01")
                .exp("2027-01-01")
                .batch("B1")
                .operator("alice")
                .build(),
        ];
        let buckets = inventory_detail(&txs, "P28-25", day("2025-06-01"));
        let r = &buckets.available[0];
        assert_eq!(r.rec_date, Some(day("2025-01-01")));
        assert_eq!(r.batch_no.as_deref(), Some("B1"));
        assert_eq!(r.operator.as_deref(), Some("alice"));
        assert_eq!(r.exp_date, Some(day("2027-01-01")));
        assert_eq!(r.transaction_ids.len(), 2);
    }
}

//! Demo/reject stock reconciliation.
//!
//! Two sources are unioned: explicit MOVE_DEMO records, and stock that is
//! still on the shelf arithmetically but past its expiry date without ever
//! having been moved. The two sources are deliberately not deduplicated: a
//! unit whose expired quantity was only partially moved shows up once per
//! source, and downstream consumers filter between "formally moved" and
//! "informally still on shelf but expired".

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{InventoryTransaction, Provenance, TxAction};

use super::aggregate::{replay, ActionUniverse};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DemoStatus {
    #[serde(rename = "Rejected (Receiving)")]
    RejectedReceiving,
    #[serde(rename = "Rejected (Case)")]
    RejectedCase,
    #[serde(rename = "Manually Moved")]
    ManuallyMoved,
    #[serde(rename = "Expired")]
    Expired,
}

impl From<Provenance> for DemoStatus {
    fn from(p: Provenance) -> Self {
        match p {
            Provenance::ReceivingAuto => DemoStatus::RejectedReceiving,
            Provenance::CompletionAuto => DemoStatus::RejectedCase,
            Provenance::Manual => DemoStatus::ManuallyMoved,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DemoRow {
    /// Transaction id for explicit rows; a synthetic
    /// `{product_type}-{spec}-{serial|no-sn}` key for implicit ones.
    pub id: String,
    pub batch_no: Option<String>,
    pub product_type: String,
    pub spec_no: String,
    pub rec_date: Option<NaiveDate>,
    pub serial_no: Option<String>,
    pub exp_date: Option<NaiveDate>,
    pub qty: i64,
    pub status: DemoStatus,
    pub notes: Option<String>,
    pub condition: Option<serde_json::Value>,
    /// Movement date for explicit rows, expiry date for implicit ones.
    pub date: NaiveDate,
}

/// Build the demo/reject report over the whole ledger, most recent first.
pub fn demo_inventory(txs: &[InventoryTransaction], today: NaiveDate) -> Vec<DemoRow> {
    let mut by_spec: BTreeMap<(&str, &str), Vec<&InventoryTransaction>> = BTreeMap::new();
    for tx in txs {
        by_spec
            .entry((tx.product_type.as_str(), tx.spec_no.as_str()))
            .or_default()
            .push(tx);
    }

    let mut rows = Vec::new();
    for ((product_type, spec_no), list) in by_spec {
        let groups = replay(list.iter().copied(), ActionUniverse::All);

        // Implicit source: shelf stock whose earliest-receipt expiry has
        // passed and which was never moved for that residual quantity.
        for (serial, g) in &groups {
            if g.on_shelf <= 0 {
                continue;
            }
            let Some(exp) = g.exp_date else { continue };
            if exp >= today {
                continue;
            }
            rows.push(DemoRow {
                id: format!(
                    "{}-{}-{}",
                    product_type,
                    spec_no,
                    serial.as_deref().unwrap_or("no-sn")
                ),
                batch_no: g.batch_no.clone(),
                product_type: product_type.to_string(),
                spec_no: spec_no.to_string(),
                rec_date: g.rec_date,
                serial_no: serial.clone(),
                exp_date: Some(exp),
                qty: g.on_shelf,
                status: DemoStatus::Expired,
                notes: None,
                condition: None,
                date: exp,
            });
        }

        // Explicit source: every MOVE_DEMO record, classified by provenance.
        for tx in &list {
            if tx.tx_action() != Some(TxAction::MoveDemo) {
                continue;
            }
            let g = groups.get(&tx.serial_key().map(str::to_owned));
            rows.push(DemoRow {
                id: tx.id.to_string(),
                batch_no: tx
                    .batch_no
                    .clone()
                    .or_else(|| g.and_then(|g| g.batch_no.clone())),
                product_type: product_type.to_string(),
                spec_no: spec_no.to_string(),
                rec_date: g.and_then(|g| g.rec_date),
                serial_no: tx.serial_key().map(str::to_owned),
                exp_date: tx.exp_date.or_else(|| g.and_then(|g| g.exp_date)),
                qty: tx.qty,
                status: tx.tx_provenance().into(),
                notes: tx.notes.clone(),
                condition: tx.condition.clone(),
                date: tx.date,
            });
        }
    }

    rows.sort_by(|a, b| b.date.cmp(&a.date));
    rows
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
    fn explicit_rows_classify_by_provenance() {
        let today = day("2025-06-01");
        let txs = vec![
            TxBuilder::new("MOVE_DEMO", "P28-25")
                .serial("S1")
                .date("2025-05-01")
                .provenance("RECEIVING_AUTO")
                .build(),
            TxBuilder::new("MOVE_DEMO", "P28-25")
                .serial("S2")
                .date("2025-05-02")
                .provenance("COMPLETION_AUTO")
                .build(),
            TxBuilder::new("MOVE_DEMO", "P28-25").serial("S3").date("2025-05-03").build(),
        ];
        let rows = demo_inventory(&txs, today);
        assert_eq!(rows.len(), 3);
        let status_of = |serial: &str| {
            rows.iter()
                .find(|r| r.serial_no.as_deref() == Some(serial))
                .unwrap()
                .status
        };
        assert_eq!(status_of("S1"), DemoStatus::RejectedReceiving);
        assert_eq!(status_of("S2"), DemoStatus::RejectedCase);
        assert_eq!(status_of("S3"), DemoStatus::ManuallyMoved);
    }

    #[test]
    fn legacy_notes_prefix_still_classifies() {
        let today = day("2025-06-01");
        let txs = vec![TxBuilder::new("MOVE_DEMO", "P28-25")
            .serial("S1")
            .notes("RECEIVING_AUTO|rejected at goods-in")
            .build()];
        let rows = demo_inventory(&txs, today);
        assert_eq!(rows[0].status, DemoStatus::RejectedReceiving);
    }

    #[test]
    fn expired_shelf_stock_gets_a_synthetic_row() {
        let today = day("2025-06-01");
        let txs = vec![TxBuilder::new("REC_CN", "P28-25")
            .serial("S1")
            .qty(3)
            .date("2025-01-01")
            .exp_date(today - Duration::days(1))
            .batch("B1")
            .build()];
        let rows = demo_inventory(&txs, today);
        assert_eq!(rows.len(), 1);
        let r = &rows[0];
        assert_eq!(r.id, "PVALVE-P28-25-S1");
        assert_eq!(r.status, DemoStatus::Expired);
        assert_eq!(r.qty, 3);
        assert_eq!(r.date, today - Duration::days(1));
        assert_eq!(r.rec_date, Some(day("2025-01-01")));
    }

    #[test]
    fn unexpired_or_off_shelf_stock_stays_out() {
        let today = day("2025-06-01");
        let txs = vec![
            // Still in date.
            TxBuilder::new("REC_CN", "P28-25").serial("OK").exp_date(today).build(),
            // Expired but fully issued out.
            TxBuilder::new("REC_CN", "P28-25")
                .serial("GONE")
                .qty(2)
                .exp_date(today - Duration::days(5))
                .build(),
            TxBuilder::new("OUT_CASE", "P28-25").serial("GONE").qty(2).build(),
        ];
        assert!(demo_inventory(&txs, today).is_empty());
    }

    #[test]
    fn unserialized_expired_stock_uses_the_no_sn_key() {
        let today = day("2025-06-01");
        let txs = vec![TxBuilder::new("REC_CN", "P28-25")
            .qty(2)
            .exp_date(today - Duration::days(10))
            .build()];
        let rows = demo_inventory(&txs, today);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "PVALVE-P28-25-no-sn");
        assert_eq!(rows[0].serial_no, None);
    }

    #[test]
    fn partial_move_dual_counts_across_both_sources() {
        let today = day("2025-06-01");
        let expired = today - Duration::days(1);
        let before = vec![TxBuilder::new("REC_CN", "P28-25")
            .serial("S1")
            .qty(2)
            .exp_date(expired)
            .build()];
        let rows = demo_inventory(&before, today);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, DemoStatus::Expired);

        // Someone flags one of the two units; the residual expired unit and
        // the explicit move now both appear. Documented behavior, no dedup.
        let mut after = before;
        after.push(
            TxBuilder::new("MOVE_DEMO", "P28-25")
                .serial("S1")
                .qty(1)
                .date("2025-06-01")
                .build(),
        );
        let rows = demo_inventory(&after, today);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().any(|r| r.status == DemoStatus::Expired && r.qty == 1));
        assert!(rows.iter().any(|r| r.status == DemoStatus::ManuallyMoved && r.qty == 1));
    }

    #[test]
    fn full_move_leaves_only_the_explicit_row() {
        let today = day("2025-06-01");
        let txs = vec![
            TxBuilder::new("REC_CN", "P28-25")
                .serial("S1")
                .qty(2)
                .exp_date(today - Duration::days(1))
                .build(),
            TxBuilder::new("MOVE_DEMO", "P28-25").serial("S1").qty(2).build(),
        ];
        let rows = demo_inventory(&txs, today);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, DemoStatus::ManuallyMoved);
    }

    #[test]
    fn rows_sort_most_recent_first() {
        let today = day("2025-06-01");
        let txs = vec![
            TxBuilder::new("MOVE_DEMO", "P28-25").serial("OLD").date("2025-02-01").build(),
            TxBuilder::new("MOVE_DEMO", "P28-25").serial("NEW").date("2025-05-01").build(),
            TxBuilder::new("REC_CN", "P30-27")
                .serial("EXP")
                .qty(1)
                .exp("2025-03-01")
                .build(),
        ];
        let rows = demo_inventory(&txs, today);
        let dates: Vec<NaiveDate> = rows.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![day("2025-05-01"), day("2025-03-01"), day("2025-02-01")]);
    }
}

//! Per-unit replay of the transaction ledger.
//!
//! One linear pass groups transactions by serial number and keeps running
//! signed sums plus "earliest REC_CN so far" metadata. Nothing here clamps:
//! the view builders decide how negative intermediate sums are presented.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{InventoryTransaction, TxAction};

/// Which actions participate in a replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionUniverse {
    All,
    /// Demo moves dropped before aggregation. Used by the detail view and
    /// the picker, where demo stock is tracked separately.
    ExcludeDemo,
}

impl ActionUniverse {
    fn admits(self, action: TxAction) -> bool {
        !(self == ActionUniverse::ExcludeDemo && action == TxAction::MoveDemo)
    }
}

/// Running aggregate for one (product type, spec, serial) group.
#[derive(Debug, Clone, Default)]
pub struct SerialGroup {
    pub serial_no: Option<String>,
    /// Signed Σ qty · shelf_mult(action) over the admitted universe.
    pub on_shelf: i64,
    /// Signed Σ qty · wip_mult(action).
    pub wip: i64,
    pub rec_cn: i64,
    pub rec_case: i64,
    pub out_case: i64,
    pub out_cn: i64,
    pub used_case: i64,
    pub moved_demo: i64,
    /// Metadata from the chronologically earliest REC_CN record, the sole
    /// source of truth for the unit's expiry and batch.
    pub exp_date: Option<NaiveDate>,
    pub batch_no: Option<String>,
    pub rec_date: Option<NaiveDate>,
    pub operator: Option<String>,
    pub last_out_case: Option<NaiveDate>,
    pub last_out_cn: Option<NaiveDate>,
    pub transaction_ids: Vec<Uuid>,
    earliest_rec_cn: Option<(NaiveDate, Uuid)>,
}

impl SerialGroup {
    fn apply(&mut self, tx: &InventoryTransaction, action: TxAction) {
        if tx.qty <= 0 {
            log::warn!(
                "transaction {} has non-positive qty {}; write-side validation missed it",
                tx.id,
                tx.qty
            );
        }
        self.on_shelf += tx.qty * action.shelf_mult();
        self.wip += tx.qty * action.wip_mult();
        self.transaction_ids.push(tx.id);
        match action {
            TxAction::RecCn => {
                self.rec_cn += tx.qty;
                // Ties on date break by id, so replay order never matters.
                let candidate = (tx.date, tx.id);
                if self.earliest_rec_cn.map_or(true, |current| candidate < current) {
                    self.earliest_rec_cn = Some(candidate);
                    self.exp_date = tx.exp_date;
                    self.batch_no = tx.batch_no.clone();
                    self.rec_date = Some(tx.date);
                    self.operator = tx.operator.clone();
                }
            }
            TxAction::RecCase => self.rec_case += tx.qty,
            TxAction::OutCase => {
                self.out_case += tx.qty;
                if self.last_out_case.map_or(true, |d| tx.date >= d) {
                    self.last_out_case = Some(tx.date);
                }
            }
            TxAction::OutCn => {
                self.out_cn += tx.qty;
                if self.last_out_cn.map_or(true, |d| tx.date >= d) {
                    self.last_out_cn = Some(tx.date);
                }
            }
            TxAction::MoveDemo => self.moved_demo += tx.qty,
            TxAction::UsedCase => self.used_case += tx.qty,
        }
    }

    pub fn on_shelf_clamped(&self) -> i64 {
        self.on_shelf.max(0)
    }

    pub fn wip_clamped(&self) -> i64 {
        self.wip.max(0)
    }
}

/// Replay transactions into per-serial groups. The `None` key is the
/// unserialized bucket: it feeds spec-level totals but never per-unit views.
/// Records with unrecognized action tags are skipped (and warned about in
/// [`InventoryTransaction::tx_action`]); an empty input yields an empty map.
pub fn replay<'a, I>(txs: I, universe: ActionUniverse) -> BTreeMap<Option<String>, SerialGroup>
where
    I: IntoIterator<Item = &'a InventoryTransaction>,
{
    let mut groups: BTreeMap<Option<String>, SerialGroup> = BTreeMap::new();
    for tx in txs {
        let Some(action) = tx.tx_action() else { continue };
        if !universe.admits(action) {
            continue;
        }
        let key = tx.serial_key().map(str::to_owned);
        let group = groups.entry(key.clone()).or_insert_with(|| SerialGroup {
            serial_no: key,
            ..SerialGroup::default()
        });
        group.apply(tx, action);
    }
    groups
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Action tags on ledger records. Direction of effect comes from the
/// multiplier tables below, never from the sign of `qty`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TxAction {
    /// Receipt of new stock from the manufacturer/supplier.
    RecCn,
    /// Return of issued stock back to shelf after a clinical case.
    RecCase,
    /// Issue of stock out to a clinical case.
    OutCase,
    /// Return of stock back to the originating supplier.
    OutCn,
    /// Removal of stock into demo/reject status.
    MoveDemo,
    /// Stock consumed during a case; already off the shelf via OutCase.
    UsedCase,
}

impl TxAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxAction::RecCn => "REC_CN",
            TxAction::RecCase => "REC_CASE",
            TxAction::OutCase => "OUT_CASE",
            TxAction::OutCn => "OUT_CN",
            TxAction::MoveDemo => "MOVE_DEMO",
            TxAction::UsedCase => "USED_CASE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "REC_CN" => Some(TxAction::RecCn),
            "REC_CASE" => Some(TxAction::RecCase),
            "OUT_CASE" => Some(TxAction::OutCase),
            "OUT_CN" => Some(TxAction::OutCn),
            "MOVE_DEMO" => Some(TxAction::MoveDemo),
            "USED_CASE" => Some(TxAction::UsedCase),
            _ => None,
        }
    }

    /// Signed effect on on-shelf quantity.
    pub fn shelf_mult(self) -> i64 {
        match self {
            TxAction::RecCn | TxAction::RecCase => 1,
            TxAction::OutCase | TxAction::OutCn | TxAction::MoveDemo => -1,
            TxAction::UsedCase => 0,
        }
    }

    /// Signed effect on work-in-progress quantity.
    pub fn wip_mult(self) -> i64 {
        match self {
            TxAction::OutCase => 1,
            TxAction::RecCase | TxAction::UsedCase => -1,
            TxAction::RecCn | TxAction::OutCn | TxAction::MoveDemo => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductType {
    Pvalve,
    DeliverySystem,
}

impl ProductType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Pvalve => "PVALVE",
            ProductType::DeliverySystem => "DELIVERY_SYSTEM",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PVALVE" => Some(ProductType::Pvalve),
            "DELIVERY_SYSTEM" => Some(ProductType::DeliverySystem),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Inspection {
    Accept,
    Reject,
}

impl Inspection {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACCEPT" => Some(Inspection::Accept),
            "REJECT" => Some(Inspection::Reject),
            _ => None,
        }
    }
}

/// Structured origin of a ledger record. Replaces the legacy convention of
/// prefixing `notes` with `RECEIVING_AUTO|...` / `COMPLETION_AUTO|...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    Manual,
    ReceivingAuto,
    CompletionAuto,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Manual => "MANUAL",
            Provenance::ReceivingAuto => "RECEIVING_AUTO",
            Provenance::CompletionAuto => "COMPLETION_AUTO",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "MANUAL" => Some(Provenance::Manual),
            "RECEIVING_AUTO" => Some(Provenance::ReceivingAuto),
            "COMPLETION_AUTO" => Some(Provenance::CompletionAuto),
            _ => None,
        }
    }

    /// Legacy classification: rows written before the `provenance` column
    /// existed carry the tag as a `notes` prefix.
    pub fn from_notes(notes: Option<&str>) -> Self {
        match notes {
            Some(n) if n.starts_with("RECEIVING_AUTO") => Provenance::ReceivingAuto,
            Some(n) if n.starts_with("COMPLETION_AUTO") => Provenance::CompletionAuto,
            _ => Provenance::Manual,
        }
    }
}

/// One append-only inventory movement. Immutable once written; corrections
/// are compensating records, the only in-place change is the soft delete.
///
/// `action` and `product_type` are stored as strings and parsed to enums on
/// read so that unrecognized values survive loading instead of failing the
/// whole query.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InventoryTransaction {
    pub id: Uuid,
    /// Business-effective calendar day of the movement.
    pub date: NaiveDate,
    pub action: String,
    pub product_type: String,
    pub spec_no: String,
    pub serial_no: Option<String>,
    pub qty: i64,
    /// Authoritative only on the unit's earliest REC_CN record.
    pub exp_date: Option<NaiveDate>,
    /// Authoritative only on the unit's earliest REC_CN record.
    pub batch_no: Option<String>,
    pub inspection: Option<String>,
    /// Failed inspection item indices, stored as a JSON array.
    pub condition: Option<serde_json::Value>,
    pub case_id: Option<Uuid>,
    pub operator: Option<String>,
    pub provenance: Option<String>,
    pub notes: Option<String>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl InventoryTransaction {
    /// Parsed action tag. Unknown tags are upstream data corruption: they
    /// aggregate as no-ops and are reported on the warning channel.
    pub fn tx_action(&self) -> Option<TxAction> {
        let parsed = TxAction::parse(&self.action);
        if parsed.is_none() {
            log::warn!(
                "transaction {} has unknown action {:?}; treating as no-op",
                self.id,
                self.action
            );
        }
        parsed
    }

    pub fn tx_product_type(&self) -> Option<ProductType> {
        let parsed = ProductType::parse(&self.product_type);
        if parsed.is_none() {
            log::warn!(
                "transaction {} has unknown product type {:?}",
                self.id,
                self.product_type
            );
        }
        parsed
    }

    pub fn tx_inspection(&self) -> Option<Inspection> {
        self.inspection.as_deref().and_then(Inspection::parse)
    }

    /// Grouping key for per-unit aggregation. `None` is the unserialized
    /// bucket: excluded from per-unit views, counted in spec-level totals.
    pub fn serial_key(&self) -> Option<&str> {
        match self.serial_no.as_deref() {
            Some("") | None => None,
            s => s,
        }
    }

    pub fn tx_provenance(&self) -> Provenance {
        self.provenance
            .as_deref()
            .and_then(Provenance::parse)
            .unwrap_or_else(|| Provenance::from_notes(self.notes.as_deref()))
    }
}

//! Read-side projection engine over the inventory transaction ledger.
//!
//! Every function here is a pure computation over a slice of non-deleted
//! transactions plus an explicit reference date. The engine never reads the
//! clock, never touches the database, and never mutates the ledger, so all
//! outputs are idempotent and safe to retry.

pub mod aggregate;
pub mod dates;
pub mod demo;
pub mod detail;
pub mod picker;
pub mod summary;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("unknown product type {0:?}")]
    UnknownProductType(String),

    #[error("requested quantity must be positive, got {0}")]
    InvalidQty(i64),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

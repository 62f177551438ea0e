//! Calendar-day handling for the ledger boundary.
//!
//! Dates cross the store and API boundaries as `YYYY-MM-DD` strings. When a
//! day has to become a timestamp it is anchored at noon UTC, so a timezone
//! conversion of up to twelve hours in either direction can never shift the
//! calendar day. Case dates, receiving dates and expiry dates are compared
//! across this boundary constantly; this anchor is a hard contract.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use super::{LedgerError, Result};

pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Expiry dates within this many days of the reference date count as
/// approaching expiry (inclusive).
pub const NEAR_EXPIRY_WINDOW_DAYS: i64 = 30;

pub fn parse_day(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DAY_FORMAT)
        .map_err(|_| LedgerError::InvalidDate(s.to_string()))
}

/// Noon-UTC anchor for a calendar day.
pub fn noon_utc(day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_hms_opt(12, 0, 0).unwrap())
}

/// Last day (inclusive) of the near-expiry window.
pub fn near_expiry_cutoff(today: NaiveDate) -> NaiveDate {
    today + Duration::days(NEAR_EXPIRY_WINDOW_DAYS)
}

/// Wall-clock date, read once at the request edge and threaded down into
/// the engine as an explicit parameter.
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

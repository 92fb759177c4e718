//! Pure input rules for registrations and event fields.
//!
//! # Responsibility
//! - Reject malformed registration input with a specific reason.
//! - Normalize accepted input into the stored representation.
//!
//! # Invariants
//! - Rules never touch storage and never read the clock themselves.

pub mod registration;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("valid iso date regex"));

/// Parses a strict `YYYY-MM-DD` calendar date.
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    if !ISO_DATE_RE.is_match(value) {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

//! Date normalization.
//!
//! The server may store the expense date as a plain date or hand back a full
//! timestamp. Everything the client compares or displays goes through
//! [`normalize`] first, which reduces the value to a calendar date.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::{ExpenseError, ResultExpense};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Reduces a server date to a calendar date.
///
/// Timestamps carrying an offset are converted to UTC before the date is
/// taken, so `2024-05-01T02:00:00+05:30` becomes `2024-04-30`. Timestamps
/// without an offset keep their own date.
pub fn normalize(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc).date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|ts| ts.date())
}

/// Parses a date typed by the user. Only `YYYY-MM-DD` is accepted.
pub fn parse_input(raw: &str, empty_message: &str) -> ResultExpense<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ExpenseError::validation(empty_message));
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| ExpenseError::validation("Date must be in YYYY-MM-DD format"))
}

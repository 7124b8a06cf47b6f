use chrono::{Datelike, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{EngineError, EngineResult};

/// Canonical month identifier shape, `YYYY-MM`.
pub static MONTH_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}$").expect("month id pattern is valid"));

/// Parse a `YYYY-MM` month identifier into `(year, month)`.
pub fn parse_month_id(month_id: &str) -> EngineResult<(i32, u32)> {
    if !MONTH_ID_PATTERN.is_match(month_id) {
        return Err(EngineError::invalid_month_id(month_id));
    }

    let (year_part, month_part) = month_id.split_at(4);
    let year: i32 = year_part
        .parse()
        .map_err(|_| EngineError::invalid_month_id(month_id))?;
    let month: u32 = month_part[1..]
        .parse()
        .map_err(|_| EngineError::invalid_month_id(month_id))?;

    if !(1..=12).contains(&month) {
        return Err(EngineError::invalid_month_id(month_id));
    }

    Ok((year, month))
}

/// Number of calendar days in the given month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .map(|last_day| last_day.day())
        .unwrap_or(30)
}

/// Resolve a month identifier to its closed date range `[first day, last day]`.
pub fn month_date_range(month_id: &str) -> EngineResult<(NaiveDate, NaiveDate)> {
    let (year, month) = parse_month_id(month_id)?;
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| EngineError::invalid_month_id(month_id))?;
    let end = NaiveDate::from_ymd_opt(year, month, days_in_month(year, month))
        .ok_or_else(|| EngineError::invalid_month_id(month_id))?;
    Ok((start, end))
}

pub fn format_month_id(year: i32, month: u32) -> String {
    format!("{year:04}-{month:02}")
}

/// Month identifier for the current UTC month.
pub fn current_month_id() -> String {
    let today = Utc::now().date_naive();
    format_month_id(today.year(), today.month())
}

/// Month identifier `offset` months before the given one (0 returns it unchanged).
pub fn months_before(month_id: &str, offset: u32) -> EngineResult<String> {
    let (year, month) = parse_month_id(month_id)?;
    let absolute = year as i64 * 12 + (month as i64 - 1) - offset as i64;
    let result_year = absolute.div_euclid(12);
    let result_month = absolute.rem_euclid(12) + 1;
    Ok(format_month_id(result_year as i32, result_month as u32))
}

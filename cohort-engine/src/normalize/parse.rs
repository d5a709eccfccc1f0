//! Defensive field parsers. None of these fail: malformed input yields a
//! default or `None`.

use chrono::{Datelike, NaiveDate, NaiveDateTime};

const DATE_LAYOUTS: &[&str] = &[
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%d-%m-%Y",
    "%Y/%m/%d",
    "%d.%m.%Y",
    "%d %B %Y",
    "%d %b %Y",
];

const DATETIME_LAYOUTS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parses a floating point number. Missing, non-numeric and non-finite input
/// yield `None`.
pub fn parse_f64(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Parses a floating point number, defaulting to `0.0`.
pub fn parse_f64_or_zero(raw: &str) -> f64 {
    parse_f64(raw).unwrap_or(0.0)
}

/// Parses a non-negative integer. Decimal input such as `3.0` is truncated.
pub fn parse_u32(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<u32>() {
        return Some(value);
    }
    parse_f64(trimmed)
        .filter(|value| *value >= 0.0 && *value <= f64::from(u32::MAX))
        .map(|value| value.trunc() as u32)
}

/// Parses a non-negative integer with a fallback.
pub fn parse_u32_or(raw: &str, default: u32) -> u32 {
    parse_u32(raw).unwrap_or(default)
}

/// Parses a date written in any accepted layout.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    DATE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDate::parse_from_str(trimmed, layout).ok())
        .or_else(|| {
            DATETIME_LAYOUTS
                .iter()
                .find_map(|layout| NaiveDateTime::parse_from_str(trimmed, layout).ok())
                .map(|datetime| datetime.date())
        })
}

/// Whole years between `birth` and `on`. Births after `on` yield `None`.
pub fn age_on(birth: NaiveDate, on: NaiveDate) -> Option<u32> {
    let mut years = on.year() - birth.year();
    if (on.month(), on.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

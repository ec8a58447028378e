//! Value coercion and comparison outcomes
//!
//! Condition values arrive as text and field values come in any shape, so
//! every comparison first coerces both sides. Coercion never fails loudly:
//! a side that cannot be read as a number or a date makes the comparison
//! [`Outcome::NotComparable`], which counts as a non-match.

use crate::core::field::FieldValue;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Result of testing one condition against one field value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Match,
    NoMatch,
    /// One side could not be coerced to the operator's domain
    NotComparable,
}

impl Outcome {
    pub fn from_bool(matched: bool) -> Self {
        if matched {
            Outcome::Match
        } else {
            Outcome::NoMatch
        }
    }

    pub fn is_match(self) -> bool {
        matches!(self, Outcome::Match)
    }
}

impl From<bool> for Outcome {
    fn from(matched: bool) -> Self {
        Outcome::from_bool(matched)
    }
}

/// Compare two coerced operands, mapping a missing side to `NotComparable`
pub fn compare_with<T>(
    left: Option<T>,
    right: Option<T>,
    test: impl Fn(&T, &T) -> bool,
) -> Outcome {
    match (left, right) {
        (Some(l), Some(r)) => Outcome::from_bool(test(&l, &r)),
        _ => Outcome::NotComparable,
    }
}

/// Parse the longest numeric prefix of `input`, ignoring leading whitespace
///
/// `"12px"` reads as 12, `"1,000"` as 1, `".5"` as 0.5; `"abc"` and `""` do
/// not parse. `Infinity` with an optional sign is accepted.
pub fn parse_float(input: &str) -> Option<f64> {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    if s[end..].starts_with("Infinity") {
        let negative = s.starts_with('-');
        return Some(if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let mut digits = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return None;
    }

    // Exponent only counts when at least one digit follows it
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}

/// Parse an ISO-8601 date or date-time
///
/// Accepts RFC 3339, a naive date-time (read as UTC) or a bare date
/// (UTC midnight).
pub fn parse_date(input: &str) -> Option<DateTime<Utc>> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Numeric reading of a field value
pub fn field_number(value: &FieldValue) -> Option<f64> {
    let number = match value {
        FieldValue::Integer(i) => Some(*i as f64),
        FieldValue::Float(f) => Some(*f),
        FieldValue::String(s) => parse_float(s),
        FieldValue::List(_) => parse_float(&value.to_text()),
        FieldValue::Boolean(_) | FieldValue::DateTime(_) | FieldValue::Null => None,
    };
    number.filter(|n| !n.is_nan())
}

/// Date reading of a field value; numbers are epoch milliseconds
pub fn field_date(value: &FieldValue) -> Option<DateTime<Utc>> {
    match value {
        FieldValue::DateTime(dt) => Some(*dt),
        FieldValue::String(s) => parse_date(s),
        FieldValue::Integer(ms) => DateTime::from_timestamp_millis(*ms),
        FieldValue::Float(ms) if ms.is_finite() => DateTime::from_timestamp_millis(*ms as i64),
        _ => None,
    }
}

/// Split a `"min,max"` literal into its two trimmed halves
///
/// Anything after a second comma is ignored.
pub fn split_range(value: &str) -> (&str, &str) {
    let mut parts = value.split(',');
    let low = parts.next().unwrap_or("").trim();
    let high = parts.next().unwrap_or("").trim();
    (low, high)
}

/// Split a comma-separated membership literal into trimmed, lower-cased members
pub fn split_members(value: &str) -> Vec<String> {
    value.split(',').map(|v| v.trim().to_lowercase()).collect()
}

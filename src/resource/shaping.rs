//! Helpers that turn form drafts into backend payloads.

use crate::errors::ConsoleError;
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use serde_json::Value;

/// Reduces a date-time or time value to a zero-padded 24-hour `HH:MM`.
///
/// Accepts `YYYY-MM-DDTHH:MM[:SS]`, `YYYY-MM-DD HH:MM[:SS]` and
/// `HH:MM[:SS]`; trailing fractions or zone suffixes are ignored.
pub fn time_of_day(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let time = match raw.split_once(['T', ' ']) {
        Some((_, time)) => time,
        None => raw,
    };
    let end = time
        .find(|c: char| !c.is_ascii_digit() && c != ':')
        .unwrap_or(time.len());
    let time = &time[..end];

    NaiveTime::parse_from_str(time, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M"))
        .ok()
        .map(|t| t.format("%H:%M").to_string())
}

/// Optional form time: absent stays absent, anything else must parse.
pub fn optional_time(
    field: &'static str,
    raw: Option<&str>,
) -> Result<Option<String>, ConsoleError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(raw) => time_of_day(raw).map(Some).ok_or_else(|| ConsoleError::Validation {
            field,
            message: format!("Expected a time of day (HH:MM), got {raw:?}"),
        }),
    }
}

/// `YYYY-MM-DD` prefix of a date or timestamp.
pub fn date_part(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok()
}

pub fn date_text(raw: Option<&str>) -> Option<String> {
    raw.and_then(date_part).map(|d| d.format("%Y-%m-%d").to_string())
}

pub fn required(field: &'static str, value: Option<&str>) -> Result<String, ConsoleError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ConsoleError::Validation {
            field,
            message: "This field is required".to_string(),
        })
}

pub fn required_id(field: &'static str, value: Option<u64>) -> Result<u64, ConsoleError> {
    value.ok_or_else(|| ConsoleError::Validation {
        field,
        message: "Please select a value".to_string(),
    })
}

pub fn required_date(
    field: &'static str,
    value: Option<NaiveDate>,
) -> Result<NaiveDate, ConsoleError> {
    value.ok_or_else(|| ConsoleError::Validation {
        field,
        message: "A date is required".to_string(),
    })
}

pub fn positive_amount(field: &'static str, value: Option<f64>) -> Result<f64, ConsoleError> {
    match value {
        Some(amount) if amount > 0.0 && amount.is_finite() => Ok(amount),
        Some(_) => Err(ConsoleError::Validation {
            field,
            message: "Amount must be greater than zero".to_string(),
        }),
        None => Err(ConsoleError::Validation {
            field,
            message: "An amount is required".to_string(),
        }),
    }
}

/// Empty text becomes absent so it is not sent.
pub fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn to_json<T: Serialize>(body: &T) -> Result<Value, ConsoleError> {
    serde_json::to_value(body)
        .map_err(|e| ConsoleError::Internal(format!("Failed to encode form: {e}")))
}

/// Like [`to_json`] but drops top-level nulls, so absent fields stay absent.
pub fn to_compact_json<T: Serialize>(body: &T) -> Result<Value, ConsoleError> {
    let mut value = to_json(body)?;
    if let Value::Object(map) = &mut value {
        map.retain(|_, v| !v.is_null());
    }
    Ok(value)
}

//! Deserializers for backend and form values that arrive either as JSON
//! numbers or as strings, possibly empty.

use chrono::NaiveDate;
use serde::de::{DeserializeOwned, Error};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn blank_to_none(value: Option<Value>) -> Option<Value> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        other => other,
    }
}

pub fn id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    opt_u64(deserializer)?.ok_or_else(|| D::Error::custom("missing id"))
}

pub fn opt_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    match blank_to_none(Option::<Value>::deserialize(deserializer)?) {
        None => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64))
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("expected an unsigned integer, got {n}"))),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("expected an unsigned integer, got {s:?}"))),
        Some(other) => Err(D::Error::custom(format!("expected an unsigned integer, got {other}"))),
    }
}

pub fn opt_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    match blank_to_none(Option::<Value>::deserialize(deserializer)?) {
        None => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("expected a number, got {s:?}"))),
        Some(other) => Err(D::Error::custom(format!("expected a number, got {other}"))),
    }
}

pub fn f64_or_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(opt_f64(deserializer)?.unwrap_or(0.0))
}

/// Text field that the backend sometimes sends as a number.
pub fn opt_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match blank_to_none(Option::<Value>::deserialize(deserializer)?) {
        None => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

pub fn string_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(opt_string(deserializer)?.unwrap_or_default())
}

/// Form date: empty means absent, and a full timestamp is reduced to its date.
pub fn opt_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
    match opt_string(deserializer)? {
        None => Ok(None),
        Some(raw) => crate::resource::shaping::date_part(&raw)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("expected a date (YYYY-MM-DD), got {raw:?}"))),
    }
}

/// Parses a stored label into a typed enum through its serde names.
pub fn variant<T: DeserializeOwned>(raw: &str) -> Option<T> {
    serde_json::from_value(Value::String(raw.trim().to_string())).ok()
}

/// Form select: empty means absent, anything else must be a known value.
pub fn opt_variant<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match opt_string(deserializer)? {
        None => Ok(None),
        Some(raw) => serde_json::from_value(Value::String(raw.trim().to_string()))
            .map(Some)
            .map_err(|_| D::Error::custom(format!("unknown value {raw:?}"))),
    }
}

//! Cast pipeline between stored strings and typed values
//!
//! Owning records declare a `CastTag` per preference name. On read the tag
//! turns the stored string (or a default) into a richer value; on write it
//! decides how that value is flattened back to a string. Undeclared and
//! unrecognised tags leave values untouched.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;

use crate::errors::PreferenceError;
use crate::value::{Collection, PreferenceValue, STORE_DATE_FORMAT};

/// Largest precision accepted by `decimal:<n>`
pub const MAX_DECIMAL_PRECISION: u32 = 28;

/// Declared target type of a preference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CastTag {
    /// `int` | `integer`
    Int,
    /// `real` | `float` | `double`
    Float,
    String,
    /// `bool` | `boolean`
    Bool,
    Object,
    /// `array` | `json`
    Array,
    Collection,
    /// `date` | `datetime`
    DateTime,
    Timestamp,
    /// `decimal:<n>`
    Decimal(u32),
    /// Anything else; values pass through unchanged
    Unknown(String),
}

impl CastTag {
    /// Parse a declared tag. Never fails: unrecognised input is `Unknown`.
    pub fn parse(raw: &str) -> Self {
        let tag = raw.trim().to_ascii_lowercase();
        match tag.as_str() {
            "int" | "integer" => CastTag::Int,
            "real" | "float" | "double" => CastTag::Float,
            "string" => CastTag::String,
            "bool" | "boolean" => CastTag::Bool,
            "object" => CastTag::Object,
            "array" | "json" => CastTag::Array,
            "collection" => CastTag::Collection,
            "date" | "datetime" => CastTag::DateTime,
            "timestamp" => CastTag::Timestamp,
            _ => match tag
                .strip_prefix("decimal:")
                .and_then(|digits| digits.parse::<u32>().ok())
            {
                Some(precision) if precision <= MAX_DECIMAL_PRECISION => {
                    CastTag::Decimal(precision)
                }
                _ => CastTag::Unknown(raw.to_string()),
            },
        }
    }

    /// Tags whose values are written as JSON text
    pub fn is_structured(&self) -> bool {
        matches!(self, CastTag::Object | CastTag::Array | CastTag::Collection)
    }

    /// Coerce a value read from the store (or a fallback) into this tag's type
    pub fn cast(&self, value: PreferenceValue) -> Result<PreferenceValue, PreferenceError> {
        let cast = match self {
            CastTag::Int => PreferenceValue::Int(to_int(&value)),
            CastTag::Float => PreferenceValue::Float(to_float(&value)),
            CastTag::String => match value {
                PreferenceValue::String(_) => value,
                other => PreferenceValue::String(other.to_store_string()),
            },
            CastTag::Bool => PreferenceValue::Bool(to_bool(&value)),
            CastTag::Object | CastTag::Array => PreferenceValue::Json(to_json(value)?),
            CastTag::Collection => {
                PreferenceValue::Collection(Collection::from_json(to_json(value)?))
            }
            CastTag::DateTime => PreferenceValue::DateTime(to_datetime(&value)?),
            CastTag::Timestamp => PreferenceValue::Int(to_datetime(&value)?.timestamp()),
            CastTag::Decimal(precision) => {
                PreferenceValue::String(to_fixed_decimal(&value, *precision)?)
            }
            CastTag::Unknown(_) => value,
        };
        Ok(cast)
    }

    /// Flatten a value to the string written to the store
    pub fn serialize(&self, value: &PreferenceValue) -> Result<String, PreferenceError> {
        match self {
            CastTag::DateTime => Ok(to_datetime(value)?.format(STORE_DATE_FORMAT).to_string()),
            tag if tag.is_structured() => Ok(value.to_json().to_string()),
            _ => Ok(value.to_store_string()),
        }
    }
}

impl FromStr for CastTag {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(CastTag::parse(s))
    }
}

impl fmt::Display for CastTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CastTag::Int => f.write_str("int"),
            CastTag::Float => f.write_str("float"),
            CastTag::String => f.write_str("string"),
            CastTag::Bool => f.write_str("bool"),
            CastTag::Object => f.write_str("object"),
            CastTag::Array => f.write_str("array"),
            CastTag::Collection => f.write_str("collection"),
            CastTag::DateTime => f.write_str("datetime"),
            CastTag::Timestamp => f.write_str("timestamp"),
            CastTag::Decimal(precision) => write!(f, "decimal:{}", precision),
            CastTag::Unknown(raw) => f.write_str(raw),
        }
    }
}

/// Inbound half of the pipeline for an optional tag
///
/// Absent values stay absent and untagged values pass through.
pub fn cast_inbound(
    tag: Option<&CastTag>,
    value: Option<PreferenceValue>,
) -> Result<Option<PreferenceValue>, PreferenceError> {
    match (tag, value) {
        (Some(tag), Some(value)) => tag.cast(value).map(Some),
        (_, value) => Ok(value),
    }
}

/// Outbound half of the pipeline for an optional tag
pub fn serialize_outbound(
    tag: Option<&CastTag>,
    value: &PreferenceValue,
) -> Result<String, PreferenceError> {
    match tag {
        Some(tag) => tag.serialize(value),
        None => Ok(value.to_store_string()),
    }
}

// ===== Scalar conversions =====

/// Longest numeric prefix of `s` after leading whitespace, and whether it
/// has a fractional part or exponent.
fn numeric_prefix(s: &str) -> (&str, bool) {
    let s = s.trim_start_matches([' ', '\t', '\n', '\r', '\x0b', '\x0c']);
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let int_digits = end - int_start;

    let mut is_float = false;
    let mut frac_digits = 0;
    if end < bytes.len() && bytes[end] == b'.' {
        let mut probe = end + 1;
        while probe < bytes.len() && bytes[probe].is_ascii_digit() {
            probe += 1;
        }
        frac_digits = probe - end - 1;
        if int_digits + frac_digits > 0 {
            end = probe;
            is_float = true;
        }
    }

    if int_digits + frac_digits == 0 {
        return ("", false);
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut probe = end + 1;
        if probe < bytes.len() && matches!(bytes[probe], b'+' | b'-') {
            probe += 1;
        }
        let exp_start = probe;
        while probe < bytes.len() && bytes[probe].is_ascii_digit() {
            probe += 1;
        }
        if probe > exp_start {
            end = probe;
            is_float = true;
        }
    }

    (&s[..end], is_float)
}

fn string_to_float(s: &str) -> f64 {
    match numeric_prefix(s) {
        ("", _) => 0.0,
        (prefix, _) => prefix.parse::<f64>().unwrap_or(0.0),
    }
}

fn string_to_int(s: &str) -> i64 {
    match numeric_prefix(s) {
        ("", _) => 0,
        (prefix, false) => prefix
            .parse::<i64>()
            .unwrap_or_else(|_| string_to_float(prefix) as i64),
        (prefix, true) => string_to_float(prefix) as i64,
    }
}

fn string_to_bool(s: &str) -> bool {
    !(s.is_empty() || s == "0")
}

fn json_to_int(value: &Value) -> i64 {
    match value {
        Value::Null => 0,
        Value::Bool(b) => i64::from(*b),
        Value::Number(n) => n
            .as_i64()
            .unwrap_or_else(|| n.as_f64().map(|f| f as i64).unwrap_or(0)),
        Value::String(s) => string_to_int(s),
        Value::Array(items) => i64::from(!items.is_empty()),
        Value::Object(map) => i64::from(!map.is_empty()),
    }
}

fn json_to_bool(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => string_to_bool(s),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn to_int(value: &PreferenceValue) -> i64 {
    match value {
        PreferenceValue::Bool(b) => i64::from(*b),
        PreferenceValue::Int(i) => *i,
        PreferenceValue::Float(f) => *f as i64,
        PreferenceValue::String(s) => string_to_int(s),
        PreferenceValue::Json(v) => json_to_int(v),
        PreferenceValue::Collection(c) => i64::from(!c.is_empty()),
        PreferenceValue::DateTime(dt) => dt.timestamp(),
    }
}

fn to_float(value: &PreferenceValue) -> f64 {
    match value {
        PreferenceValue::Int(i) => *i as f64,
        PreferenceValue::Float(f) => *f,
        PreferenceValue::String(s) => string_to_float(s),
        PreferenceValue::Json(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        PreferenceValue::Json(Value::String(s)) => string_to_float(s),
        other => to_int(other) as f64,
    }
}

fn to_bool(value: &PreferenceValue) -> bool {
    match value {
        PreferenceValue::Bool(b) => *b,
        PreferenceValue::Int(i) => *i != 0,
        PreferenceValue::Float(f) => *f != 0.0,
        PreferenceValue::String(s) => string_to_bool(s),
        PreferenceValue::Json(v) => json_to_bool(v),
        PreferenceValue::Collection(c) => !c.is_empty(),
        PreferenceValue::DateTime(_) => true,
    }
}

// ===== Structured data =====

fn to_json(value: PreferenceValue) -> Result<Value, PreferenceError> {
    match value {
        PreferenceValue::String(text) => Ok(serde_json::from_str(&text)?),
        PreferenceValue::Json(v) => Ok(v),
        other => Ok(other.to_json()),
    }
}

// ===== Dates =====

/// Parse a stored date string.
///
/// Accepts epoch seconds, `YYYY-MM-DD`, the canonical store format (with
/// optional fractional seconds) and RFC 3339.
pub fn parse_datetime(raw: &str) -> Result<DateTime<Utc>, PreferenceError> {
    let s = raw.trim();
    let invalid = || PreferenceError::InvalidDate {
        value: raw.to_string(),
    };

    let unsigned = s.strip_prefix('-').unwrap_or(s);
    if !unsigned.is_empty() && unsigned.bytes().all(|b| b.is_ascii_digit()) {
        let secs = s.parse::<i64>().map_err(|_| invalid())?;
        return DateTime::from_timestamp(secs, 0).ok_or_else(invalid);
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(invalid)?;
        return Ok(Utc.from_utc_datetime(&midnight));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(Utc.from_utc_datetime(&naive));
    }

    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| invalid())
}

fn to_datetime(value: &PreferenceValue) -> Result<DateTime<Utc>, PreferenceError> {
    let invalid = || PreferenceError::InvalidDate {
        value: value.to_store_string(),
    };
    match value {
        PreferenceValue::DateTime(dt) => Ok(*dt),
        PreferenceValue::String(s) => parse_datetime(s),
        PreferenceValue::Json(Value::String(s)) => parse_datetime(s),
        PreferenceValue::Int(secs) => DateTime::from_timestamp(*secs, 0).ok_or_else(invalid),
        PreferenceValue::Float(secs) => {
            DateTime::from_timestamp(*secs as i64, 0).ok_or_else(invalid)
        }
        _ => Err(invalid()),
    }
}

// ===== Decimals =====

fn parse_decimal(s: &str) -> Option<Decimal> {
    let s = s.trim();
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
        .or_else(|| match numeric_prefix(s) {
            ("", _) => Some(Decimal::ZERO),
            (prefix, _) => Decimal::from_str(prefix)
                .or_else(|_| Decimal::from_scientific(prefix))
                .ok(),
        })
}

fn to_fixed_decimal(value: &PreferenceValue, precision: u32) -> Result<String, PreferenceError> {
    let decimal = match value {
        PreferenceValue::Int(i) => Some(Decimal::from(*i)),
        PreferenceValue::Bool(b) => Some(Decimal::from(i64::from(*b))),
        PreferenceValue::Float(f) if f.is_finite() => parse_decimal(&f.to_string()),
        PreferenceValue::String(s) => parse_decimal(s),
        PreferenceValue::Json(Value::Number(n)) => parse_decimal(&n.to_string()),
        PreferenceValue::Json(Value::String(s)) => parse_decimal(s),
        _ => None,
    };

    let rounded = decimal
        .ok_or_else(|| PreferenceError::InvalidDecimal {
            value: value.to_store_string(),
        })?
        .round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero);
    Ok(pad_fraction(&rounded.to_string(), precision as usize))
}

/// Right-pad the fractional part with zeros to exactly `digits` places.
/// A 96-bit mantissa cannot always hold the full scale, so this is done on
/// the rendered text rather than with `Decimal::rescale`.
fn pad_fraction(rendered: &str, digits: usize) -> String {
    let (whole, fraction) = rendered.split_once('.').unwrap_or((rendered, ""));
    if digits == 0 {
        return whole.to_string();
    }
    format!("{}.{:0<width$}", whole, fraction, width = digits)
}

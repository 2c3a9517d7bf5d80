//! Sanitizing value trees before they are serialized to JSON.
//!
//! JSON consumers read numbers as IEEE-754 doubles, so integers outside the
//! ±(2^53 - 1) range lose precision, and dates have no native representation
//! at all. [`sanitize`] rewrites both into strings while keeping the shape of
//! the tree intact:
//!
//! ```text
//! { id: 9007199254740993, at: Date }  ->  { id: "9007199254740993", at: "2024-05-01T09:30:00.000Z" }
//! ```
//!
//! The transform is idempotent: strings it produces are never read back as
//! integers or dates.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Number, Value};

use super::error::SanitizeError;

/// Largest integer a double represents exactly (`Number.MAX_SAFE_INTEGER`).
pub const MAX_SAFE_INTEGER: i128 = 9_007_199_254_740_991;

/// Nesting limit applied by [`sanitize`].
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// A value tree as produced by database rows and API payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum SanitizableValue {
    Null,
    Bool(bool),
    Integer(i128),
    Float(f64),
    String(String),
    Date(DateTime<Utc>),
    Array(Vec<SanitizableValue>),
    Object(BTreeMap<String, SanitizableValue>),
}

impl SanitizableValue {
    /// True for integers a double cannot hold exactly.
    pub fn is_large_integer(&self) -> bool {
        matches!(self, SanitizableValue::Integer(n) if n.abs() > MAX_SAFE_INTEGER)
    }

    /// Converts the tree into a `serde_json::Value`.
    ///
    /// Call this on a sanitized tree. Any large integer still present is
    /// emitted as a (lossy) double, and non-finite floats become `null`.
    pub fn to_json(&self) -> Value {
        match self {
            SanitizableValue::Null => Value::Null,
            SanitizableValue::Bool(flag) => Value::Bool(*flag),
            SanitizableValue::Integer(n) => {
                if let Ok(small) = i64::try_from(*n) {
                    Value::Number(small.into())
                } else if let Ok(unsigned) = u64::try_from(*n) {
                    Value::Number(unsigned.into())
                } else {
                    float_to_json(*n as f64)
                }
            }
            SanitizableValue::Float(f) => float_to_json(*f),
            SanitizableValue::String(s) => Value::String(s.clone()),
            SanitizableValue::Date(date) => Value::String(iso_string(date)),
            SanitizableValue::Array(items) => {
                Value::Array(items.iter().map(SanitizableValue::to_json).collect())
            }
            SanitizableValue::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }
}

impl From<Value> for SanitizableValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => SanitizableValue::Null,
            Value::Bool(flag) => SanitizableValue::Bool(flag),
            Value::Number(number) => {
                if let Some(n) = number.as_i64() {
                    SanitizableValue::Integer(n.into())
                } else if let Some(n) = number.as_u64() {
                    SanitizableValue::Integer(n.into())
                } else {
                    SanitizableValue::Float(number.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => SanitizableValue::String(s),
            Value::Array(items) => {
                SanitizableValue::Array(items.into_iter().map(SanitizableValue::from).collect())
            }
            Value::Object(fields) => SanitizableValue::Object(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, SanitizableValue::from(value)))
                    .collect(),
            ),
        }
    }
}

fn float_to_json(f: f64) -> Value {
    Number::from_f64(f).map_or(Value::Null, Value::Number)
}

fn iso_string(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Replaces large integers and dates with their string forms.
///
/// # Errors
///
/// Returns [`SanitizeError::DepthExceeded`] when arrays and objects nest
/// deeper than [`DEFAULT_MAX_DEPTH`].
pub fn sanitize(value: &SanitizableValue) -> Result<SanitizableValue, SanitizeError> {
    sanitize_with_max_depth(value, DEFAULT_MAX_DEPTH)
}

/// [`sanitize`] with an explicit nesting limit.
pub fn sanitize_with_max_depth(
    value: &SanitizableValue,
    max_depth: usize,
) -> Result<SanitizableValue, SanitizeError> {
    walk(value, 0, max_depth)
}

/// Sanitizes a tree and renders it as JSON in one step.
pub fn sanitize_to_json(value: &SanitizableValue) -> Result<Value, SanitizeError> {
    sanitize(value).map(|sanitized| sanitized.to_json())
}

fn walk(
    value: &SanitizableValue,
    depth: usize,
    max_depth: usize,
) -> Result<SanitizableValue, SanitizeError> {
    match value {
        SanitizableValue::Array(items) => {
            let depth = descend(depth, max_depth)?;
            items
                .iter()
                .map(|item| walk(item, depth, max_depth))
                .collect::<Result<Vec<_>, SanitizeError>>()
                .map(SanitizableValue::Array)
        }
        SanitizableValue::Object(fields) => {
            let depth = descend(depth, max_depth)?;
            fields
                .iter()
                .map(|(key, field)| Ok((key.clone(), walk(field, depth, max_depth)?)))
                .collect::<Result<BTreeMap<_, _>, SanitizeError>>()
                .map(SanitizableValue::Object)
        }
        SanitizableValue::Date(date) => Ok(SanitizableValue::String(iso_string(date))),
        SanitizableValue::Integer(n) if value.is_large_integer() => {
            Ok(SanitizableValue::String(n.to_string()))
        }
        scalar => Ok(scalar.clone()),
    }
}

fn descend(depth: usize, max_depth: usize) -> Result<usize, SanitizeError> {
    if depth >= max_depth {
        return Err(SanitizeError::DepthExceeded { max_depth });
    }
    Ok(depth + 1)
}

//! Coercion of loosely typed form and scraper values into numbers.

use serde_json::Value;

/// A value that should be read as a count or an amount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericInput<'a> {
    Text(&'a str),
    Number(i64),
    Missing,
}

impl<'a> From<&'a str> for NumericInput<'a> {
    fn from(text: &'a str) -> Self {
        NumericInput::Text(text)
    }
}

impl<'a> From<&'a String> for NumericInput<'a> {
    fn from(text: &'a String) -> Self {
        NumericInput::Text(text.as_str())
    }
}

impl From<i64> for NumericInput<'_> {
    fn from(number: i64) -> Self {
        NumericInput::Number(number)
    }
}

impl From<i32> for NumericInput<'_> {
    fn from(number: i32) -> Self {
        NumericInput::Number(number.into())
    }
}

impl<'a, T> From<Option<T>> for NumericInput<'a>
where
    T: Into<NumericInput<'a>>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(NumericInput::Missing, Into::into)
    }
}

impl<'a> From<&'a Value> for NumericInput<'a> {
    /// Fractional JSON numbers are truncated toward zero; numbers beyond the
    /// `i64` range clamp to `i64::MIN` / `i64::MAX`.
    fn from(value: &'a Value) -> Self {
        match value {
            Value::String(text) => NumericInput::Text(text),
            Value::Number(number) => match number.as_i64() {
                Some(n) => NumericInput::Number(n),
                None => NumericInput::Number(clamp_to_i64(number.as_f64().unwrap_or_default())),
            },
            _ => NumericInput::Missing,
        }
    }
}

/// Truncates toward zero and clamps to the `i64` range.
fn clamp_to_i64(value: f64) -> i64 {
    let truncated = value.trunc();
    if truncated >= i64::MAX as f64 {
        i64::MAX
    } else if truncated <= i64::MIN as f64 {
        i64::MIN
    } else {
        // In range and integral, so the cast is exact
        truncated as i64
    }
}

/// Reads an integer out of a loosely typed value.
///
/// Text keeps only its ASCII digits, so `"12,345원"` reads as `12345` and
/// `"abc"` as `0`. Numbers pass through unchanged and missing values are `0`.
/// Digit runs beyond `i64::MAX` saturate.
///
/// # Example
///
/// ```
/// use sourcing_market::domain::get_number_from_string;
///
/// assert_eq!(get_number_from_string("12,345원"), 12345);
/// assert_eq!(get_number_from_string(None::<&str>), 0);
/// assert_eq!(get_number_from_string(42), 42);
/// ```
pub fn get_number_from_string<'a>(input: impl Into<NumericInput<'a>>) -> i64 {
    match input.into() {
        NumericInput::Missing => 0,
        NumericInput::Number(number) => number,
        NumericInput::Text(text) => text
            .bytes()
            .filter(u8::is_ascii_digit)
            .fold(0i64, |acc, digit| {
                acc.saturating_mul(10)
                    .saturating_add(i64::from(digit - b'0'))
            }),
    }
}

/// Converts a JSON value to `f64` the way a numeric form field is read.
///
/// Numbers pass through, `null` and `false` are `0`, `true` is `1`, strings
/// are trimmed and parsed (an empty string is `0`). An empty array is `0` and
/// a one-element array reads as its element, so `["5"]` is `5` and `[null]`
/// is `0`. Objects, longer arrays and everything else are NaN.
pub fn to_number(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(flag) => f64::from(u8::from(*flag)),
        Value::Number(number) => number.as_f64().unwrap_or(f64::NAN),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return 0.0;
            }
            match trimmed {
                "Infinity" | "+Infinity" => return f64::INFINITY,
                "-Infinity" => return f64::NEG_INFINITY,
                _ => {}
            }
            // Rust also accepts "inf" and "nan" spellings; a form field does not.
            let lowered = trimmed.to_ascii_lowercase();
            if lowered.contains("inf") || lowered.contains("nan") {
                return f64::NAN;
            }
            trimmed.parse::<f64>().unwrap_or(f64::NAN)
        }
        Value::Array(items) => match items.as_slice() {
            [] => 0.0,
            // A lone element is read through its text form, where null is ""
            // while true and objects are not numeric text.
            [Value::Null] => 0.0,
            [Value::Bool(_) | Value::Object(_)] => f64::NAN,
            [only] => to_number(only),
            _ => f64::NAN,
        },
        Value::Object(_) => f64::NAN,
    }
}

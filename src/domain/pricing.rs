//! Resale price recommendation.
//!
//! A sourced product's price is converted from the supplier currency, marked
//! up, loaded with the purchasing agency's delivery fee and rounded up to the
//! next hundred:
//!
//! ```text
//! ceil((original_price * exchange_rate * 1.41 + delivery_fee) / 100) * 100
//! ```

/// Exchange rate used when the settings store cannot provide one.
pub const DEFAULT_CNY_CURRENCY: f64 = 195.0;

/// Delivery agency fee applied when the caller supplies none.
pub const DEFAULT_DELIVERY_AGENCY_FEE: f64 = 7000.0;

/// Markup applied on top of the converted price.
pub const MARKUP_MULTIPLIER: f64 = 1.41;

/// Recommended prices are rounded up to a multiple of this unit.
pub const ROUNDING_UNIT: f64 = 100.0;

/// Zero and NaN count as "no value".
fn is_blank(value: f64) -> bool {
    value == 0.0 || value.is_nan()
}

/// Computes a recommended resale price.
///
/// Returns `None` when either `original_price` or `exchange_rate` is zero or
/// NaN, and when the result is not a finite amount that fits in `i64`.
/// A missing, zero or NaN `delivery_agency_fee` falls back to
/// [`DEFAULT_DELIVERY_AGENCY_FEE`].
///
/// # Example
///
/// ```
/// use sourcing_market::domain::get_recommended_price;
///
/// assert_eq!(get_recommended_price(100.0, 195.0, Some(7000.0)), Some(34500));
/// assert_eq!(get_recommended_price(0.0, 195.0, None), None);
/// ```
pub fn get_recommended_price(
    original_price: f64,
    exchange_rate: f64,
    delivery_agency_fee: Option<f64>,
) -> Option<i64> {
    if is_blank(original_price) || is_blank(exchange_rate) {
        return None;
    }

    let delivery_fee = delivery_agency_fee
        .filter(|fee| !is_blank(*fee))
        .unwrap_or(DEFAULT_DELIVERY_AGENCY_FEE);

    let raw = original_price * exchange_rate * MARKUP_MULTIPLIER + delivery_fee;
    let rounded = (raw / ROUNDING_UNIT).ceil() * ROUNDING_UNIT;

    // `as` would saturate infinities and huge values into a bogus price
    if !rounded.is_finite() || rounded.abs() >= i64::MAX as f64 {
        return None;
    }

    Some(rounded as i64)
}

/// Parses a stored exchange rate.
///
/// Only positive, finite decimals are usable rates.
pub fn parse_exchange_rate(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|rate| rate.is_finite() && *rate > 0.0)
}

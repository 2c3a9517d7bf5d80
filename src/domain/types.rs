use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::competition::CompetitionLevel;
use super::sanitize::SanitizableValue;

/// Settings key holding the CNY exchange rate.
pub const CNY_CURRENCY_KEY: &str = "CNY_CURRENCY";

/// A row of the key-value settings store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Setting {
    pub id: i64,
    pub key: String,
    pub value: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Setting {
    pub fn new(id: i64, key: impl Into<String>, value: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            key: key.into(),
            value: value.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<&Setting> for SanitizableValue {
    fn from(setting: &Setting) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("id".to_string(), SanitizableValue::Integer(setting.id.into()));
        fields.insert(
            "key".to_string(),
            SanitizableValue::String(setting.key.clone()),
        );
        fields.insert(
            "value".to_string(),
            SanitizableValue::String(setting.value.clone()),
        );
        fields.insert(
            "created_at".to_string(),
            SanitizableValue::Date(setting.created_at),
        );
        fields.insert(
            "updated_at".to_string(),
            SanitizableValue::Date(setting.updated_at),
        );
        SanitizableValue::Object(fields)
    }
}

/// Request payload for creating or replacing a setting value.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpsertSettingRequest {
    #[validate(length(min = 1, max = 1024))]
    pub value: String,
}

impl UpsertSettingRequest {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

/// Where an exchange rate came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RateSource {
    /// Read and parsed from the settings store.
    Live,
    /// The store was unavailable or held an unusable value.
    Fallback,
    /// Supplied by the caller.
    Provided,
}

/// An exchange rate together with its provenance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CurrencyQuote {
    pub rate: f64,
    pub source: RateSource,
}

impl CurrencyQuote {
    pub fn live(rate: f64) -> Self {
        Self {
            rate,
            source: RateSource::Live,
        }
    }

    pub fn fallback(rate: f64) -> Self {
        Self {
            rate,
            source: RateSource::Fallback,
        }
    }

    pub fn provided(rate: f64) -> Self {
        Self {
            rate,
            source: RateSource::Provided,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == RateSource::Fallback
    }
}

/// Request payload for a price recommendation.
///
/// `original_price` accepts any JSON value and is coerced the way a
/// numeric form field would be: numbers pass through, numeric strings are
/// parsed, anything else yields no recommendation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecommendPriceRequest {
    #[serde(default)]
    pub original_price: serde_json::Value,
    /// When omitted the current CNY rate is looked up.
    #[validate(range(min = 0.0))]
    pub exchange_rate: Option<f64>,
    #[validate(range(min = 0.0))]
    pub delivery_agency_fee: Option<f64>,
}

impl RecommendPriceRequest {
    pub fn new(original_price: impl Into<serde_json::Value>) -> Self {
        Self {
            original_price: original_price.into(),
            exchange_rate: None,
            delivery_agency_fee: None,
        }
    }

    pub fn with_exchange_rate(mut self, rate: f64) -> Self {
        self.exchange_rate = Some(rate);
        self
    }

    pub fn with_delivery_agency_fee(mut self, fee: f64) -> Self {
        self.delivery_agency_fee = Some(fee);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendPriceResponse {
    /// `None` when the inputs cannot produce a recommendation.
    pub recommended_price: Option<i64>,
    pub exchange_rate: f64,
    pub rate_source: RateSource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitionQuery {
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompetitionResponse {
    pub score: f64,
    pub level: CompetitionLevel,
    pub label: String,
    pub style: String,
}

impl CompetitionResponse {
    pub fn from_score(score: f64) -> Self {
        let level = CompetitionLevel::from_score(score);
        Self {
            score,
            level,
            label: level.label().to_string(),
            style: level.style().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseNumberRequest {
    #[serde(default)]
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParseNumberResponse {
    pub value: i64,
}

/// Health check status for services.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Health check response for the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub database: HealthStatus,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn new(database: HealthStatus) -> Self {
        Self {
            status: database.clone(),
            database,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub r#type: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

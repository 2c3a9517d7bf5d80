//! Application service layer.
//!
//! This module contains the business logic that sits between the HTTP
//! handlers and the settings store: exchange-rate lookup with fallback,
//! price recommendation and settings maintenance.

use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::domain::{
    AppError, CNY_CURRENCY_KEY, CurrencyQuote, DEFAULT_CNY_CURRENCY, HealthResponse, HealthStatus,
    RecommendPriceRequest, RecommendPriceResponse, SanitizableValue, Setting, SettingsStore,
    UpsertSettingRequest, ValidationError, get_recommended_price, parse_exchange_rate,
    sanitize_to_json, to_number,
};

const MAX_SETTING_KEY_LEN: usize = 64;

/// Application service containing core business logic.
///
/// Holds the settings store behind its trait so handlers and tests can run
/// against either Postgres or the in-memory mock.
///
/// # Example
///
/// ```ignore
/// let store = Arc::new(PostgresClient::with_defaults(&database_url).await?);
/// let service = AppService::new(store);
///
/// let quote = service.cny_currency().await;
/// ```
pub struct AppService {
    settings_store: Arc<dyn SettingsStore>,
}

impl AppService {
    /// Creates a new `AppService` instance.
    #[must_use]
    pub fn new(settings_store: Arc<dyn SettingsStore>) -> Self {
        Self { settings_store }
    }

    /// Looks up the CNY exchange rate.
    ///
    /// Never fails. A missing record, an unparsable or non-positive value and
    /// store errors all resolve to [`DEFAULT_CNY_CURRENCY`] with a
    /// `Fallback` source; each fallback is logged and counted in
    /// `currency_lookup_fallback_total`.
    #[instrument(skip(self))]
    pub async fn cny_currency(&self) -> CurrencyQuote {
        let reason = match self.settings_store.get_setting(CNY_CURRENCY_KEY).await {
            Ok(Some(setting)) => match parse_exchange_rate(&setting.value) {
                Some(rate) => return CurrencyQuote::live(rate),
                None => {
                    warn!(value = %setting.value, "Stored exchange rate is not a positive number");
                    "invalid_value"
                }
            },
            Ok(None) => {
                warn!(key = CNY_CURRENCY_KEY, "Exchange rate setting is missing");
                "missing"
            }
            Err(e) => {
                warn!(error = ?e, "Exchange rate lookup failed");
                "store_error"
            }
        };

        metrics::counter!("currency_lookup_fallback_total", "reason" => reason).increment(1);
        CurrencyQuote::fallback(DEFAULT_CNY_CURRENCY)
    }

    /// Recommends a resale price.
    ///
    /// Uses the caller's exchange rate when given, otherwise the current CNY
    /// rate. Inputs that cannot be priced produce `recommended_price: None`
    /// rather than an error.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for negative rates or fees.
    #[instrument(skip(self, request))]
    pub async fn recommend_price(
        &self,
        request: &RecommendPriceRequest,
    ) -> Result<RecommendPriceResponse, AppError> {
        request.validate().map_err(|e| {
            warn!(error = %e, "Validation failed for price recommendation request");
            AppError::Validation(ValidationError::Multiple(e.to_string()))
        })?;

        let quote = match request.exchange_rate {
            Some(rate) => CurrencyQuote::provided(rate),
            None => self.cny_currency().await,
        };

        let original_price = to_number(&request.original_price);
        let recommended_price =
            get_recommended_price(original_price, quote.rate, request.delivery_agency_fee);

        metrics::counter!(
            "price_recommendations_total",
            "outcome" => if recommended_price.is_some() { "priced" } else { "unpriced" }
        )
        .increment(1);

        Ok(RecommendPriceResponse {
            recommended_price,
            exchange_rate: quote.rate,
            rate_source: quote.source,
        })
    }

    /// Gets a setting by key.
    #[instrument(skip(self))]
    pub async fn get_setting(&self, key: &str) -> Result<Option<Setting>, AppError> {
        self.settings_store.get_setting(key).await
    }

    /// Lists all settings as JSON with ids and timestamps made
    /// serialization-safe.
    #[instrument(skip(self))]
    pub async fn list_settings(&self) -> Result<serde_json::Value, AppError> {
        let settings = self.settings_store.list_settings().await?;
        let tree = SanitizableValue::Array(settings.iter().map(SanitizableValue::from).collect());
        Ok(sanitize_to_json(&tree)?)
    }

    /// Creates or replaces a setting.
    ///
    /// The exchange-rate key only accepts positive decimal values so a typo
    /// cannot silently push every lookup onto the fallback rate.
    #[instrument(skip(self, request), fields(setting_key = %key))]
    pub async fn update_setting(
        &self,
        key: &str,
        request: &UpsertSettingRequest,
    ) -> Result<Setting, AppError> {
        validate_setting_key(key)?;
        request.validate()?;
        if request.value.trim().is_empty() {
            return Err(AppError::Validation(ValidationError::MissingField(
                "value".to_string(),
            )));
        }

        if key == CNY_CURRENCY_KEY && parse_exchange_rate(&request.value).is_none() {
            return Err(AppError::Validation(ValidationError::InvalidField {
                field: "value".to_string(),
                message: "exchange rate must be a positive number".to_string(),
            }));
        }

        let setting = self
            .settings_store
            .upsert_setting(key, request.value.trim())
            .await?;
        info!(setting_id = setting.id, "Setting updated");
        Ok(setting)
    }

    /// Performs a health check on the settings store.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> HealthResponse {
        let db_health = match self.settings_store.health_check().await {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => {
                warn!(error = ?e, "Database health check failed");
                HealthStatus::Unhealthy
            }
        };

        HealthResponse::new(db_health)
    }
}

/// Keys are upper snake case, e.g. `CNY_CURRENCY`.
fn validate_setting_key(key: &str) -> Result<(), ValidationError> {
    let well_formed = !key.is_empty()
        && key.len() <= MAX_SETTING_KEY_LEN
        && key
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_');

    if well_formed {
        Ok(())
    } else {
        Err(ValidationError::InvalidField {
            field: "key".to_string(),
            message: format!(
                "must be 1-{MAX_SETTING_KEY_LEN} characters of A-Z, 0-9 or '_'"
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RateSource;
    use crate::test_utils::MockSettingsStore;
    use crate::test_utils::mocks::MockConfig;
    use serde_json::json;

    fn service_with(store: MockSettingsStore) -> AppService {
        AppService::new(Arc::new(store))
    }

    #[tokio::test]
    async fn test_cny_currency_live_value() {
        let service = service_with(MockSettingsStore::new().with_setting(CNY_CURRENCY_KEY, "190.5"));

        let quote = service.cny_currency().await;

        assert_eq!(quote, CurrencyQuote::live(190.5));
    }

    #[tokio::test]
    async fn test_cny_currency_store_error_falls_back() {
        let service = service_with(MockSettingsStore::failing("connection reset"));

        let quote = service.cny_currency().await;

        assert_eq!(quote.rate, 195.0);
        assert_eq!(quote.source, RateSource::Fallback);
    }

    #[tokio::test]
    async fn test_cny_currency_missing_record_falls_back() {
        let service = service_with(MockSettingsStore::new());

        let quote = service.cny_currency().await;

        assert_eq!(quote, CurrencyQuote::fallback(DEFAULT_CNY_CURRENCY));
    }

    #[tokio::test]
    async fn test_cny_currency_unparsable_value_falls_back() {
        for raw in ["abc", "", "-1", "0"] {
            let service = service_with(MockSettingsStore::new().with_setting(CNY_CURRENCY_KEY, raw));
            let quote = service.cny_currency().await;
            assert!(quote.is_fallback(), "value {raw:?} should fall back");
            assert_eq!(quote.rate, 195.0);
        }
    }

    #[tokio::test]
    async fn test_recommend_price_with_provided_rate() {
        let store = Arc::new(MockSettingsStore::new());
        let service = AppService::new(store.clone());

        let request = RecommendPriceRequest::new(100)
            .with_exchange_rate(195.0)
            .with_delivery_agency_fee(7000.0);
        let response = service.recommend_price(&request).await.unwrap();

        assert_eq!(response.recommended_price, Some(34500));
        assert_eq!(response.rate_source, RateSource::Provided);
        // The store is not consulted when the caller supplies a rate
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_recommend_price_looks_up_rate() {
        let service = service_with(MockSettingsStore::new().with_setting(CNY_CURRENCY_KEY, "195"));

        let response = service
            .recommend_price(&RecommendPriceRequest::new("100"))
            .await
            .unwrap();

        assert_eq!(response.recommended_price, Some(34500));
        assert_eq!(response.exchange_rate, 195.0);
        assert_eq!(response.rate_source, RateSource::Live);
    }

    #[tokio::test]
    async fn test_recommend_price_uses_fallback_rate_on_store_failure() {
        let service = service_with(MockSettingsStore::failing("down"));

        let response = service
            .recommend_price(&RecommendPriceRequest::new(100))
            .await
            .unwrap();

        assert_eq!(response.recommended_price, Some(34500));
        assert_eq!(response.rate_source, RateSource::Fallback);
    }

    #[tokio::test]
    async fn test_recommend_price_sentinel_for_blank_price() {
        let service = service_with(MockSettingsStore::new());

        for price in [json!(0), json!(null), json!("abc"), json!("1,000")] {
            let request = RecommendPriceRequest::new(price.clone()).with_exchange_rate(195.0);
            let response = service.recommend_price(&request).await.unwrap();
            assert_eq!(response.recommended_price, None, "price {price}");
        }
    }

    #[tokio::test]
    async fn test_recommend_price_sentinel_for_zero_rate() {
        let service = service_with(MockSettingsStore::new());

        let request = RecommendPriceRequest::new(100).with_exchange_rate(0.0);
        let response = service.recommend_price(&request).await.unwrap();

        assert_eq!(response.recommended_price, None);
    }

    #[tokio::test]
    async fn test_recommend_price_rejects_negative_fee() {
        let service = service_with(MockSettingsStore::new());

        let request = RecommendPriceRequest::new(100).with_delivery_agency_fee(-500.0);
        let result = service.recommend_price(&request).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_list_settings_is_sanitized() {
        let service = service_with(
            MockSettingsStore::new()
                .with_setting_id(9_007_199_254_740_993, "BIG", "x")
                .with_setting_id(2, CNY_CURRENCY_KEY, "190"),
        );

        let listed = service.list_settings().await.unwrap();
        let rows = listed.as_array().unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["id"], json!("9007199254740993"));
        assert_eq!(rows[1]["id"], json!(2));
        assert!(rows[1]["updated_at"].as_str().unwrap().ends_with('Z'));
    }

    #[tokio::test]
    async fn test_update_setting_success() {
        let store = Arc::new(MockSettingsStore::new());
        let service = AppService::new(store.clone());

        let setting = service
            .update_setting(CNY_CURRENCY_KEY, &UpsertSettingRequest::new(" 188.4 "))
            .await
            .unwrap();

        assert_eq!(setting.value, "188.4");
        assert_eq!(service.cny_currency().await, CurrencyQuote::live(188.4));
    }

    #[tokio::test]
    async fn test_update_setting_rejects_bad_exchange_rate() {
        let store = Arc::new(MockSettingsStore::new());
        let service = AppService::new(store.clone());

        let result = service
            .update_setting(CNY_CURRENCY_KEY, &UpsertSettingRequest::new("one ninety"))
            .await;

        assert!(matches!(
            result,
            Err(AppError::Validation(ValidationError::InvalidField { .. }))
        ));
        assert!(store.get_all_settings().is_empty());
    }

    #[tokio::test]
    async fn test_update_setting_rejects_bad_key() {
        let service = service_with(MockSettingsStore::new());

        let long_key = "K".repeat(65);
        for key in ["", "lower", "WITH-DASH", long_key.as_str()] {
            let result = service
                .update_setting(key, &UpsertSettingRequest::new("1"))
                .await;
            assert!(matches!(result, Err(AppError::Validation(_))), "key {key:?}");
        }
    }

    #[tokio::test]
    async fn test_update_setting_store_failure() {
        let service = service_with(MockSettingsStore::with_config(MockConfig::failure(
            "write failed",
        )));

        let result = service
            .update_setting("FEATURE_FLAG", &UpsertSettingRequest::new("on"))
            .await;

        assert!(matches!(result, Err(AppError::Database(_))));
    }

    #[tokio::test]
    async fn test_health_check_healthy() {
        let service = service_with(MockSettingsStore::new());

        let health = service.health_check().await;

        assert_eq!(health.status, HealthStatus::Healthy);
        assert_eq!(health.database, HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn test_health_check_db_unhealthy() {
        let store = Arc::new(MockSettingsStore::new());
        store.set_healthy(false);
        let service = AppService::new(store);

        let health = service.health_check().await;

        assert_eq!(health.status, HealthStatus::Unhealthy);
        assert_eq!(health.database, HealthStatus::Unhealthy);
    }

    mod metrics_tests {
        use super::*;
        use metrics_exporter_prometheus::PrometheusBuilder;

        /// Runs `f` against a fresh recorder and returns the scrape output.
        fn render_with_recorder<F, Fut>(f: F) -> String
        where
            F: FnOnce() -> Fut,
            Fut: std::future::Future<Output = ()>,
        {
            let recorder = PrometheusBuilder::new().build_recorder();
            let handle = recorder.handle();
            metrics::with_local_recorder(&recorder, || tokio_test::block_on(f()));
            handle.render()
        }

        #[test]
        fn test_fallback_counter_by_reason() {
            let output = render_with_recorder(|| async {
                service_with(MockSettingsStore::new()).cny_currency().await;
                service_with(MockSettingsStore::new().with_setting(CNY_CURRENCY_KEY, "abc"))
                    .cny_currency()
                    .await;
                let failing = service_with(MockSettingsStore::failing("down"));
                failing.cny_currency().await;
                failing.cny_currency().await;
            });

            assert!(output.contains(r#"currency_lookup_fallback_total{reason="missing"} 1"#));
            assert!(output.contains(r#"currency_lookup_fallback_total{reason="invalid_value"} 1"#));
            assert!(output.contains(r#"currency_lookup_fallback_total{reason="store_error"} 2"#));
        }

        #[test]
        fn test_live_rate_is_not_counted_as_fallback() {
            let output = render_with_recorder(|| async {
                service_with(MockSettingsStore::new().with_setting(CNY_CURRENCY_KEY, "190"))
                    .cny_currency()
                    .await;
            });

            assert!(!output.contains("currency_lookup_fallback_total"));
        }

        #[test]
        fn test_recommendation_outcome_counter() {
            let output = render_with_recorder(|| async {
                let service = service_with(MockSettingsStore::new());
                let priced = RecommendPriceRequest::new(100).with_exchange_rate(195.0);
                let unpriced = RecommendPriceRequest::new("abc").with_exchange_rate(195.0);

                service.recommend_price(&priced).await.unwrap();
                service.recommend_price(&priced).await.unwrap();
                service.recommend_price(&unpriced).await.unwrap();
            });

            assert!(output.contains(r#"price_recommendations_total{outcome="priced"} 2"#));
            assert!(output.contains(r#"price_recommendations_total{outcome="unpriced"} 1"#));
        }
    }
}

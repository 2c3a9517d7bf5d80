//! Mock implementations for testing.
//!
//! These mocks provide in-memory implementations of domain traits
//! that can be configured to simulate various scenarios including
//! success, failure, and edge cases.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::domain::{AppError, DatabaseError, Setting, SettingsStore};

/// Configuration for mock behavior.
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// If true, operations will fail.
    pub should_fail: bool,
    /// Custom error message for failures.
    pub error_message: Option<String>,
    /// Simulated latency in milliseconds.
    pub latency_ms: Option<u64>,
}

impl MockConfig {
    /// Creates a config that always succeeds.
    #[must_use]
    pub fn success() -> Self {
        Self::default()
    }

    /// Creates a config that always fails.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            should_fail: true,
            error_message: Some(message.into()),
            latency_ms: None,
        }
    }

    /// Adds simulated latency.
    #[must_use]
    pub fn with_latency(mut self, ms: u64) -> Self {
        self.latency_ms = Some(ms);
        self
    }
}

/// Mock settings store for testing.
///
/// Keeps settings in an in-memory map and supports configurable
/// failure modes.
///
/// # Example
///
/// ```ignore
/// use sourcing_market::test_utils::{MockSettingsStore, mocks::MockConfig};
///
/// // Create a mock holding an exchange rate
/// let mock = MockSettingsStore::new().with_setting("CNY_CURRENCY", "190");
///
/// // Create a mock that fails
/// let failing_mock = MockSettingsStore::with_config(MockConfig::failure("DB error"));
/// ```
pub struct MockSettingsStore {
    storage: Arc<Mutex<BTreeMap<String, Setting>>>,
    config: MockConfig,
    call_count: AtomicU64,
    next_id: AtomicI64,
    is_healthy: AtomicBool,
}

impl MockSettingsStore {
    /// Creates a new mock with default (success) configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MockConfig::success())
    }

    /// Creates a new mock with the given configuration.
    #[must_use]
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            storage: Arc::new(Mutex::new(BTreeMap::new())),
            config,
            call_count: AtomicU64::new(0),
            next_id: AtomicI64::new(1),
            is_healthy: AtomicBool::new(true),
        }
    }

    /// Creates a mock that always fails.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_config(MockConfig::failure(message))
    }

    /// Seeds a setting without counting as a call.
    #[must_use]
    pub fn with_setting(self, key: &str, value: &str) -> Self {
        self.insert(key, value);
        self
    }

    /// Seeds a setting with an explicit row id.
    #[must_use]
    pub fn with_setting_id(self, id: i64, key: &str, value: &str) -> Self {
        self.storage
            .lock()
            .unwrap()
            .insert(key.to_string(), Setting::new(id, key, value));
        self
    }

    /// Gets the number of times any method was called.
    pub fn call_count(&self) -> u64 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Sets the health status.
    pub fn set_healthy(&self, healthy: bool) {
        self.is_healthy.store(healthy, Ordering::Relaxed);
    }

    /// Gets all stored settings.
    pub fn get_all_settings(&self) -> Vec<Setting> {
        self.storage.lock().unwrap().values().cloned().collect()
    }

    /// Clears all stored settings.
    pub fn clear(&self) {
        self.storage.lock().unwrap().clear();
    }

    fn insert(&self, key: &str, value: &str) -> Setting {
        let mut storage = self.storage.lock().unwrap();
        let setting = match storage.get(key) {
            Some(existing) => Setting {
                value: value.to_string(),
                updated_at: Utc::now(),
                ..existing.clone()
            },
            None => Setting::new(self.next_id.fetch_add(1, Ordering::Relaxed), key, value),
        };
        storage.insert(key.to_string(), setting.clone());
        setting
    }

    fn increment_call_count(&self) {
        self.call_count.fetch_add(1, Ordering::Relaxed);
    }

    async fn simulate_latency(&self) {
        if let Some(ms) = self.config.latency_ms {
            tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
        }
    }

    fn check_should_fail(&self) -> Result<(), AppError> {
        if self.config.should_fail {
            let msg = self
                .config
                .error_message
                .clone()
                .unwrap_or_else(|| "Mock database error".to_string());
            return Err(AppError::Database(DatabaseError::Query(msg)));
        }
        Ok(())
    }
}

impl Default for MockSettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SettingsStore for MockSettingsStore {
    async fn health_check(&self) -> Result<(), AppError> {
        self.increment_call_count();

        if !self.is_healthy.load(Ordering::Relaxed) {
            return Err(AppError::Database(DatabaseError::Connection(
                "Mock database unhealthy".to_string(),
            )));
        }

        self.check_should_fail()
    }

    async fn get_setting(&self, key: &str) -> Result<Option<Setting>, AppError> {
        self.increment_call_count();
        self.simulate_latency().await;
        self.check_should_fail()?;

        let storage = self.storage.lock().unwrap();
        Ok(storage.get(key).cloned())
    }

    async fn upsert_setting(&self, key: &str, value: &str) -> Result<Setting, AppError> {
        self.increment_call_count();
        self.simulate_latency().await;
        self.check_should_fail()?;

        Ok(self.insert(key, value))
    }

    async fn list_settings(&self) -> Result<Vec<Setting>, AppError> {
        self.increment_call_count();
        self.check_should_fail()?;

        Ok(self.get_all_settings())
    }
}

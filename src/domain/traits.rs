//! Domain traits defining contracts for external systems.

use async_trait::async_trait;

use super::error::AppError;
use super::types::Setting;

/// Key-value store holding operational settings such as the exchange rate.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Check store connectivity
    async fn health_check(&self) -> Result<(), AppError>;

    /// Get a single setting by key
    async fn get_setting(&self, key: &str) -> Result<Option<Setting>, AppError>;

    /// Create the setting or replace its value
    async fn upsert_setting(&self, key: &str, value: &str) -> Result<Setting, AppError>;

    /// List all settings ordered by key
    async fn list_settings(&self) -> Result<Vec<Setting>, AppError>;
}

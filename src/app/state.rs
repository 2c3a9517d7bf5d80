//! Application state management.
//!
//! This module provides the shared application state that is
//! accessible to all request handlers via Axum's State extractor.

use std::sync::Arc;

use secrecy::SecretString;

use crate::domain::SettingsStore;
use crate::infra::PrometheusHandle;

use super::service::AppService;

/// Shared application state for the Axum web server.
///
/// Everything a handler needs is injected here at startup; there is no
/// process-global state besides the metrics recorder.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
///
/// let store = Arc::new(PostgresClient::with_defaults(&database_url).await?);
/// let state = AppState::new(store, SecretString::from(api_key));
///
/// let router = create_router(Arc::new(state));
/// ```
#[derive(Clone)]
pub struct AppState {
    /// The application service containing business logic.
    pub service: Arc<AppService>,

    /// Key required in `x-api-key` for write requests.
    pub api_auth_key: SecretString,

    /// Prometheus handle rendered at `/metrics`, when a recorder is installed.
    pub metrics: Option<Arc<PrometheusHandle>>,
}

impl AppState {
    /// Creates a new `AppState`, wiring an `AppService` to the store.
    #[must_use]
    pub fn new(settings_store: Arc<dyn SettingsStore>, api_auth_key: SecretString) -> Self {
        let service = Arc::new(AppService::new(settings_store));

        Self {
            service,
            api_auth_key,
            metrics: None,
        }
    }

    /// Attaches the Prometheus handle served at `/metrics`.
    #[must_use]
    pub fn with_metrics(mut self, handle: Arc<PrometheusHandle>) -> Self {
        self.metrics = Some(handle);
        self
    }
}

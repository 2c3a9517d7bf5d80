//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::IntoResponse,
};
use tracing::error;

use crate::app::AppState;
use crate::domain::{
    AppError, CompetitionQuery, CompetitionResponse, CurrencyQuote, DatabaseError, ErrorDetail,
    ErrorResponse, HealthResponse, HealthStatus, ParseNumberRequest, ParseNumberResponse,
    RecommendPriceRequest, RecommendPriceResponse, SanitizeError, Setting, UpsertSettingRequest,
    ValidationError, get_number_from_string,
};

/// Current CNY exchange rate, falling back to the default when unset.
pub async fn currency_handler(State(state): State<Arc<AppState>>) -> Json<CurrencyQuote> {
    Json(state.service.cny_currency().await)
}

/// Recommended resale price for a sourced item.
pub async fn recommend_price_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RecommendPriceRequest>, JsonRejection>,
) -> Result<Json<RecommendPriceResponse>, AppError> {
    let Json(payload) = payload?;
    let response = state.service.recommend_price(&payload).await?;
    Ok(Json(response))
}

/// Competition level, label and badge style for a score.
pub async fn competition_handler(
    query: Result<Query<CompetitionQuery>, QueryRejection>,
) -> Result<Json<CompetitionResponse>, AppError> {
    let Query(query) = query?;
    Ok(Json(CompetitionResponse::from_score(query.score)))
}

/// Integer read from a loosely formatted value such as `"1,200개"`.
pub async fn parse_number_handler(
    payload: Result<Json<ParseNumberRequest>, JsonRejection>,
) -> Result<Json<ParseNumberResponse>, AppError> {
    let Json(payload) = payload?;
    Ok(Json(ParseNumberResponse {
        value: get_number_from_string(&payload.value),
    }))
}

/// All settings, with ids and timestamps made JSON-safe.
pub async fn list_settings_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let settings = state.service.list_settings().await?;
    Ok(Json(settings))
}

/// Single setting by key.
pub async fn get_setting_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<Setting>, AppError> {
    let setting = state
        .service
        .get_setting(&key)
        .await?
        .ok_or(AppError::Database(DatabaseError::NotFound(key)))?;
    Ok(Json(setting))
}

/// Create or replace a setting. Requires `x-api-key`.
pub async fn update_setting_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    payload: Result<Json<UpsertSettingRequest>, JsonRejection>,
) -> Result<Json<Setting>, AppError> {
    let Json(payload) = payload?;
    let setting = state.service.update_setting(&key, &payload).await?;
    Ok(Json(setting))
}

/// Detailed health check
pub async fn health_check_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let health = state.service.health_check().await;
    Json(health)
}

/// Kubernetes liveness probe
pub async fn liveness_handler() -> StatusCode {
    StatusCode::OK
}

/// Kubernetes readiness probe
pub async fn readiness_handler(State(state): State<Arc<AppState>>) -> StatusCode {
    let health = state.service.health_check().await;
    match health.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Prometheus scrape output.
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics recorder not installed").into_response(),
    }
}

// Malformed bodies and query strings are client input errors
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(ValidationError::InvalidFormat(rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(ValidationError::InvalidFormat(rejection.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_type, message) = match &self {
            AppError::Database(db_err) => match db_err {
                DatabaseError::Connection(_) | DatabaseError::PoolExhausted(_) => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "database_error",
                    self.to_string(),
                ),
                DatabaseError::NotFound(_) => {
                    (StatusCode::NOT_FOUND, "not_found", self.to_string())
                }
                DatabaseError::Duplicate(_) => {
                    (StatusCode::CONFLICT, "duplicate", self.to_string())
                }
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    self.to_string(),
                ),
            },
            AppError::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "configuration_error",
                self.to_string(),
            ),
            AppError::Validation(_) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                self.to_string(),
            ),
            AppError::Sanitize(SanitizeError::DepthExceeded { .. }) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "sanitize_error",
                self.to_string(),
            ),
            AppError::Authentication(_) => (
                StatusCode::UNAUTHORIZED,
                "authentication_error",
                self.to_string(),
            ),
            AppError::Serialization(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "serialization_error",
                self.to_string(),
            ),
        };

        if status.is_server_error() {
            error!(error_type = %error_type, message = %message, "Server error");
        }

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                r#type: error_type.to_string(),
                message,
            },
        });

        (status, body).into_response()
    }
}

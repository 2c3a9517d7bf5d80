//! HTTP routing configuration.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::app::AppState;

use super::handlers::{
    competition_handler, currency_handler, get_setting_handler, health_check_handler,
    list_settings_handler, liveness_handler, metrics_handler, parse_number_handler,
    readiness_handler, recommend_price_handler, update_setting_handler,
};
use super::middleware::auth_middleware;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Create router with the default 30 second request timeout
pub fn create_router(app_state: Arc<AppState>) -> Router {
    create_router_with_timeout(app_state, DEFAULT_REQUEST_TIMEOUT)
}

/// Create router with a custom request timeout
pub fn create_router_with_timeout(app_state: Arc<AppState>, timeout: Duration) -> Router {
    let layers = ServiceBuilder::new()
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ));

    // Reads are public, writes need x-api-key
    let settings_routes = Router::new()
        .route("/", get(list_settings_handler))
        .route(
            "/{key}",
            get(get_setting_handler).put(update_setting_handler),
        )
        .layer(middleware::from_fn_with_state(
            Arc::clone(&app_state),
            auth_middleware,
        ));

    let health_routes = Router::new()
        .route("/", get(health_check_handler))
        .route("/live", get(liveness_handler))
        .route("/ready", get(readiness_handler));

    Router::new()
        .route("/currency", get(currency_handler))
        .route("/prices/recommend", post(recommend_price_handler))
        .route("/competition", get(competition_handler))
        .route("/numbers/parse", post(parse_number_handler))
        .route("/metrics", get(metrics_handler))
        .nest("/settings", settings_routes)
        .nest("/health", health_routes)
        .layer(layers)
        .with_state(app_state)
}

//! Settings API flows through the full router.

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

use sourcing_market::api::create_router;
use sourcing_market::app::AppState;
use sourcing_market::domain::{CurrencyQuote, RateSource, Setting};
use sourcing_market::test_utils::MockSettingsStore;

const API_KEY: &str = "test-api-key";

fn create_test_router(store: Arc<MockSettingsStore>) -> Router {
    let state = AppState::new(store, SecretString::from(API_KEY));
    create_router(Arc::new(state))
}

async fn send(
    router: Router,
    method: Method,
    uri: &str,
    api_key: Option<&str>,
    payload: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(key) = api_key {
        builder = builder.header("x-api-key", key);
    }
    let body = payload.map_or_else(Body::empty, |p| Body::from(p.to_string()));

    let response = router.oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_exchange_rate_lifecycle() {
    let store = Arc::new(MockSettingsStore::new());
    let router = create_test_router(Arc::clone(&store));

    // 1. No rate stored yet
    let (status, body) = send(router.clone(), Method::GET, "/currency", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let quote: CurrencyQuote = serde_json::from_value(body).unwrap();
    assert_eq!(quote.source, RateSource::Fallback);

    // 2. Store a rate
    let (status, body) = send(
        router.clone(),
        Method::PUT,
        "/settings/CNY_CURRENCY",
        Some(API_KEY),
        Some(json!({"value": " 188.5 "})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let setting: Setting = serde_json::from_value(body).unwrap();
    assert_eq!(setting.key, "CNY_CURRENCY");
    assert_eq!(setting.value, "188.5");

    // 3. Lookup now uses it
    let (_, body) = send(router.clone(), Method::GET, "/currency", None, None).await;
    let quote: CurrencyQuote = serde_json::from_value(body).unwrap();
    assert_eq!(quote, CurrencyQuote::live(188.5));

    // 4. Fetch it back
    let (status, body) = send(
        router.clone(),
        Method::GET,
        "/settings/CNY_CURRENCY",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["value"], "188.5");

    // 5. Recommendation follows the stored rate
    let (status, body) = send(
        router,
        Method::POST,
        "/prices/recommend",
        None,
        Some(json!({"original_price": 100})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rate_source"], "live");
    assert_eq!(body["exchange_rate"], 188.5);

    assert_eq!(store.get_all_settings().len(), 1);
}

#[tokio::test]
async fn test_update_without_key_is_unauthorized() {
    let store = Arc::new(MockSettingsStore::new());
    let router = create_test_router(Arc::clone(&store));

    let (status, body) = send(
        router,
        Method::PUT,
        "/settings/CNY_CURRENCY",
        None,
        Some(json!({"value": "190"})),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["type"], "authentication_error");
    assert!(store.get_all_settings().is_empty());
}

#[tokio::test]
async fn test_update_with_wrong_key_is_unauthorized() {
    let router = create_test_router(Arc::new(MockSettingsStore::new()));

    let (status, _) = send(
        router,
        Method::PUT,
        "/settings/CNY_CURRENCY",
        Some("wrong-key"),
        Some(json!({"value": "190"})),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_exchange_rate_is_rejected() {
    let store = Arc::new(MockSettingsStore::new().with_setting("CNY_CURRENCY", "190"));
    let router = create_test_router(Arc::clone(&store));

    for bad in ["abc", "-5", "0", "   "] {
        let (status, body) = send(
            router.clone(),
            Method::PUT,
            "/settings/CNY_CURRENCY",
            Some(API_KEY),
            Some(json!({ "value": bad })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "value {bad:?}");
        assert_eq!(body["error"]["type"], "validation_error");
    }

    assert_eq!(store.get_all_settings()[0].value, "190");
}

#[tokio::test]
async fn test_malformed_key_is_rejected() {
    let router = create_test_router(Arc::new(MockSettingsStore::new()));

    let (status, _) = send(
        router,
        Method::PUT,
        "/settings/cny-currency",
        Some(API_KEY),
        Some(json!({"value": "190"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_settings_is_sanitized() {
    let store = Arc::new(
        MockSettingsStore::new()
            .with_setting_id(9_007_199_254_740_993, "BIG", "x")
            .with_setting_id(7, "CNY_CURRENCY", "190"),
    );
    let router = create_test_router(store);

    let (status, body) = send(router, Method::GET, "/settings", None, None).await;

    assert_eq!(status, StatusCode::OK);
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 2);

    // Ids past the safe integer range become strings, small ids stay numbers
    assert_eq!(list[0]["key"], "BIG");
    assert_eq!(list[0]["id"], "9007199254740993");
    assert_eq!(list[1]["id"], 7);

    // Timestamps are ISO-8601 strings
    let created = list[1]["created_at"].as_str().unwrap();
    assert!(created.ends_with('Z'));
    assert!(chrono::DateTime::parse_from_rfc3339(created).is_ok());
}

#[tokio::test]
async fn test_list_settings_store_failure() {
    let router = create_test_router(Arc::new(MockSettingsStore::failing("query failed")));

    let (status, body) = send(router, Method::GET, "/settings", None, None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["type"], "database_error");
}

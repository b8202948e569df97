//! HTTP surface tests. The chart backend is a throwaway axum server on a
//! random local port, reached through the real `BackendClient`.
//!
//! Run with: cargo test --test api_test

use axum::{
    body::Body,
    extract::Path,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceExt;

use sensor_chart::backend::{BackendClient, FetchError, SeriesSource};
use sensor_chart::chart::CHART_CANVAS_ID;
use sensor_chart::common::AppState;
use sensor_chart::config::{parse_timeframes, Config};
use sensor_chart::refresh::refresh_sessions;
use sensor_chart::routes::build_router;
use sensor_chart::selectors::{DEVICE_SELECT_ID, TIMEFRAME_SELECT_ID};

fn one_reading(temperature: f64) -> Response {
    Json(json!({
        "labels": ["2024-01-01T00:00:00"],
        "Temperature": [temperature],
        "Humidity": [40],
        "Pressure": [null]
    }))
    .into_response()
}

async fn backend_series(Path((timeframe, device)): Path<(String, String)>) -> Response {
    match (timeframe.as_str(), device.as_str()) {
        ("24h", "sensor1") => one_reading(21.5),
        (_, "barometer") => Json(json!({
            "labels": ["2024-01-01T00:00:00", "2024-01-01T00:05:00"],
            "Temperature": [20.0, null],
            "Humidity": [45.5, 46.0],
            "Pressure": [null, 1012.5]
        }))
        .into_response(),
        (_, "slow") => {
            tokio::time::sleep(Duration::from_millis(300)).await;
            one_reading(1.0)
        }
        (_, "fast") => one_reading(2.0),
        (_, "broken") => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        (_, "garbled") => "definitely not json".into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn spawn_backend() -> String {
    let app = Router::new().route("/{timeframe}/{device}", get(backend_series));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn test_config(backend_base_url: &str) -> Config {
    Config {
        backend_base_url: backend_base_url.to_string(),
        backend_timeout_seconds: 5,
        devices: vec![
            "sensor1".into(),
            "barometer".into(),
            "broken".into(),
            "slow".into(),
            "fast".into(),
        ],
        timeframes: parse_timeframes("24h:1 Day,168:1 Week").unwrap(),
        api_host: "127.0.0.1".into(),
        api_port: 0,
        session_idle_seconds: 60,
        max_sessions: 100,
        refresh_interval_seconds: 0,
        disable_rate_limiting: true,
        rate_limit_per_second: 60,
        rate_limit_burst: 60,
    }
}

async fn test_app() -> (AppState, Router) {
    let base = spawn_backend().await;
    let config = test_config(&base);
    let client = BackendClient::with_timeout(&base, Duration::from_secs(5)).unwrap();
    let state = AppState::new(config, Arc::new(client));
    let app = build_router(state.clone()).unwrap();
    (state, app)
}

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn put_selection(session: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(format!("/api/sessions/{session}/selection"))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Open a session the way a freshly loaded page does; returns its id.
async fn open_session(app: &Router) -> String {
    let response = app.clone().oneshot(post_request("/api/sessions")).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_str().unwrap().to_string()
}

async fn select(app: &Router, session: &str, body: Value) -> Value {
    let response = app.clone().oneshot(put_selection(session, body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

async fn session_state(app: &Router, session: &str) -> Value {
    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/sessions/{session}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

fn temperature(chart: &Value) -> Value {
    chart["data"]["datasets"][0]["data"].clone()
}

#[tokio::test]
async fn health_endpoint() {
    let (_, app) = test_app().await;
    let response = app.oneshot(get_request("/healthz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn page_is_a_static_shell() {
    let (_, app) = test_app().await;
    let response = app.oneshot(get_request("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains(&format!("<select id=\"{DEVICE_SELECT_ID}\"></select>")));
    assert!(html.contains(&format!("<select id=\"{TIMEFRAME_SELECT_ID}\"></select>")));
    assert!(html.contains(&format!("<canvas id=\"{CHART_CANVAS_ID}\">")));
    assert!(html.contains("/api/sessions"));
}

#[tokio::test]
async fn selectors_endpoint_lists_options_in_order() {
    let (_, app) = test_app().await;
    let json = body_json(app.oneshot(get_request("/api/selectors")).await.unwrap()).await;

    let devices: Vec<&str> = json["device"]["options"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["value"].as_str().unwrap())
        .collect();
    assert_eq!(devices, vec!["sensor1", "barometer", "broken", "slow", "fast"]);
    assert_eq!(json["timeframe"]["options"][1]["text"], "1 Week");
    assert_eq!(json["device"]["selected"], 0);
}

#[tokio::test]
async fn new_session_has_default_selection_and_empty_chart() {
    let (_, app) = test_app().await;
    let response = app.oneshot(post_request("/api/sessions")).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert!(json["id"].as_str().is_some());
    assert_eq!(json["selectors"]["device"]["selected"], 0);
    assert_eq!(json["selectors"]["timeframe"]["options"][0]["value"], "24h");

    let chart = &json["chart"];
    assert_eq!(chart["canvasId"], "chart");
    assert_eq!(chart["type"], "line");
    assert_eq!(chart["revision"], 0);
    assert_eq!(chart["data"]["datasets"], json!([]));
    assert_eq!(chart["options"]["scales"]["xAxes"][0]["type"], "time");
}

#[tokio::test]
async fn single_point_response_is_charted() {
    let (_, app) = test_app().await;
    let session = open_session(&app).await;

    let json = select(&app, &session, json!({"device": "sensor1", "timeframe": "24h"})).await;
    assert_eq!(json["outcome"], "applied");

    let chart = &json["chart"];
    assert_eq!(chart["data"]["labels"].as_array().unwrap().len(), 1);
    let datasets = chart["data"]["datasets"].as_array().unwrap();
    assert_eq!(datasets.len(), 2);
    assert_eq!(datasets[0]["label"], "Temperature");
    assert_eq!(datasets[0]["data"], json!([21.5]));
}

#[tokio::test]
async fn pressure_appears_when_backend_reports_it() {
    let (_, app) = test_app().await;
    let session = open_session(&app).await;

    let json = select(&app, &session, json!({"device": "barometer"})).await;
    assert_eq!(json["outcome"], "applied");
    let datasets = json["chart"]["data"]["datasets"].as_array().unwrap();
    assert_eq!(datasets.len(), 3);
    assert_eq!(datasets[2]["label"], "Pressure");
    assert_eq!(datasets[2]["data"], json!([null, 1012.5]));
}

#[tokio::test]
async fn backend_500_leaves_chart_untouched() {
    let (_, app) = test_app().await;
    let session = open_session(&app).await;

    let applied = select(&app, &session, json!({"device": "sensor1"})).await;
    assert_eq!(applied["outcome"], "applied");
    let before = session_state(&app, &session).await["chart"].clone();

    let json = select(&app, &session, json!({"device": "broken"})).await;
    assert_eq!(json["outcome"], "failed");
    assert_eq!(json["chart"]["revision"], 1);

    let after = session_state(&app, &session).await;
    assert_eq!(after["chart"], before);
    // The selection itself did change.
    assert_eq!(after["selectors"]["device"]["selected"], 2);
}

#[tokio::test]
async fn unknown_selection_is_rejected() {
    let (state, app) = test_app().await;
    let session = open_session(&app).await;

    let response = app
        .clone()
        .oneshot(put_selection(&session, json!({"device": "barometer", "timeframe": "1y"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Unknown timeframe '1y'");

    // Neither selector moved and nothing was requested.
    let handle = state.session(session.parse().unwrap()).await.unwrap();
    let selectors = handle.selectors().await;
    assert_eq!(selectors.device.value(), Some("sensor1"));
    assert_eq!(selectors.timeframe.value(), Some("24h"));
    assert_eq!(handle.orchestrator().latest_generation(), 0);
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let (_, app) = test_app().await;

    let missing = "00000000-0000-4000-8000-000000000000";
    let response = app
        .clone()
        .oneshot(put_selection(missing, json!({"device": "sensor1"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/sessions/{missing}/chart")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(get_request("/api/sessions/not-a-uuid")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn refresh_uses_current_selection() {
    let (_, app) = test_app().await;
    let session = open_session(&app).await;

    let json = body_json(
        app.oneshot(post_request(&format!("/api/sessions/{session}/refresh")))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(json["outcome"], "applied");
    assert_eq!(temperature(&json["chart"]), json!([21.5]));
}

#[tokio::test]
async fn chart_exports_as_csv() {
    let (_, app) = test_app().await;
    let session = open_session(&app).await;
    select(&app, &session, json!({"device": "sensor1"})).await;

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/sessions/{session}/chart?format=csv")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "text/csv");
    assert_eq!(
        body_text(response).await,
        "time,Temperature,Humidity\n2024-01-01T00:00:00+00:00,21.5,40\n"
    );

    let response = app
        .oneshot(get_request(&format!("/api/sessions/{session}/chart?format=xml")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn concurrent_pages_keep_their_own_charts() {
    let (_, app) = test_app().await;
    let page_a = open_session(&app).await;
    let page_b = open_session(&app).await;

    // Page A's backend call is still in flight when page B selects.
    let slow = tokio::spawn(
        app.clone()
            .oneshot(put_selection(&page_a, json!({"device": "slow"}))),
    );
    tokio::time::sleep(Duration::from_millis(50)).await;
    let b = select(&app, &page_b, json!({"device": "fast"})).await;
    let a = body_json(slow.await.unwrap().unwrap()).await;

    assert_eq!(a["outcome"], "applied");
    assert_eq!(temperature(&a["chart"]), json!([1.0]));
    assert_eq!(b["outcome"], "applied");
    assert_eq!(temperature(&b["chart"]), json!([2.0]));

    let a = session_state(&app, &page_a).await;
    assert_eq!(a["selectors"]["device"]["selected"], 3);
    assert_eq!(temperature(&a["chart"]), json!([1.0]));
}

#[tokio::test]
async fn periodic_refresh_keeps_each_page_on_its_own_selection() {
    let (state, app) = test_app().await;
    let page_a = open_session(&app).await;
    let page_b = open_session(&app).await;
    select(&app, &page_a, json!({"device": "sensor1"})).await;
    select(&app, &page_b, json!({"device": "fast"})).await;

    assert_eq!(refresh_sessions(&state).await, 2);

    let a = session_state(&app, &page_a).await;
    assert_eq!(a["chart"]["revision"], 2);
    assert_eq!(temperature(&a["chart"]), json!([21.5]));

    let b = session_state(&app, &page_b).await;
    assert_eq!(b["chart"]["revision"], 2);
    assert_eq!(temperature(&b["chart"]), json!([2.0]));
}

#[tokio::test]
async fn api_is_rate_limited_when_enabled() {
    let base = spawn_backend().await;
    let mut config = test_config(&base);
    config.disable_rate_limiting = false;
    config.rate_limit_per_second = 60;
    config.rate_limit_burst = 1;

    let client = BackendClient::with_timeout(&base, Duration::from_secs(5)).unwrap();
    let app = build_router(AppState::new(config, Arc::new(client))).unwrap();

    let first = app.clone().oneshot(get_request("/api/selectors")).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let second = app.clone().oneshot(get_request("/api/selectors")).await.unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);

    // The page is outside the limiter.
    let page = app.oneshot(get_request("/")).await.unwrap();
    assert_eq!(page.status(), StatusCode::OK);
}

#[tokio::test]
async fn backend_client_maps_failures() {
    let base = spawn_backend().await;
    let client = BackendClient::with_timeout(&base, Duration::from_secs(5)).unwrap();

    assert!(matches!(
        client.fetch("/24h/broken").await,
        Err(FetchError::Http { status: 500 })
    ));
    assert!(matches!(
        client.fetch("/24h/garbled").await,
        Err(FetchError::Decode(_))
    ));

    // Nothing listens on the discard port.
    let unreachable = BackendClient::with_timeout("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
    assert!(matches!(
        unreachable.fetch("/24h/sensor1").await,
        Err(FetchError::Network(_))
    ));
}

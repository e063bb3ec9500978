//! Integration tests for the API Server
//!
//! Tests HTTP endpoints, health checks, metrics, and signal queries.


use confluence::config::TelegramConfig;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::fixtures::{strong_call_short, uptrend_long};
use crate::test_utils::ScriptedProvider;
use test_utils::TestApiServer;

fn rising_provider(symbol: &str) -> ScriptedProvider {
    let provider = ScriptedProvider::new();
    provider.set_series(symbol, strong_call_short(), uptrend_long());
    provider
}

#[tokio::test]
async fn health_endpoint_reports_healthy_status() {
    let app = TestApiServer::new(ScriptedProvider::new(), &[]).await;
    let response = app.server.get("/health").await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert!(body["uptime_seconds"].as_u64().is_some());
    assert_eq!(body["service"], "confluence-signal-engine");
    assert_eq!(body["scheduler_running"], false);
    assert_eq!(body["cycle_in_progress"], false);
    assert!(body["last_cycle_at"].is_null());
}

#[tokio::test]
async fn health_reflects_completed_cycles() {
    let app = TestApiServer::new(rising_provider("EURUSD=X"), &["EURUSD=X"]).await;
    app.harness.orchestrator.run_cycle().await;

    let body: Value = app.server.get("/health").await.json();
    assert_eq!(body["status"], "healthy");
    assert!(body["last_cycle_at"].is_string());
}

#[tokio::test]
async fn metrics_endpoint_exposes_prometheus_metrics() {
    let app = TestApiServer::new(ScriptedProvider::new(), &[]).await;
    for _ in 0..3 {
        let _ = app.server.get("/health").await;
    }

    let response = app.server.get("/metrics").await;
    assert_eq!(response.status_code(), 200);

    let body = response.text();
    assert!(body.contains("http_requests_total 3"), "Expected three counted requests");
    assert!(body.contains("http_request_duration_seconds"));
    assert!(body.contains("analysis_cycles_total"));
    assert!(body.contains("analysis_cycles_skipped_total"));
}

#[tokio::test]
async fn scheduler_status_and_last_signals() {
    let app = TestApiServer::new(rising_provider("EURUSD=X"), &["EURUSD=X"]).await;

    let status: Value = app.server.get("/api/scheduler/status").await.json();
    assert_eq!(status["is_running"], false);
    assert_eq!(status["cycle_in_progress"], false);
    assert!(status["last_cycle_at"].is_null());

    app.harness.orchestrator.run_cycle().await;

    let status: Value = app.server.get("/api/scheduler/status").await.json();
    assert_eq!(status["instrument_count"], 1);
    assert!(status["last_cycle_at"].is_string());

    let signals: Value = app.server.get("/api/scheduler/signals").await.json();
    assert_eq!(
        signals,
        json!([{
            "symbol": "EURUSD=X",
            "direction": "CALL",
            "strength": 3,
            "votes": {
                "ema": "CALL",
                "rsi": "CALL",
                "bollinger": "NEUTRAL",
                "macd": "CALL",
                "trend": "CALL"
            },
            "emitted_at": signals[0]["emitted_at"]
        }])
    );
}

#[tokio::test]
async fn signal_queries_return_persisted_rows() {
    let app = TestApiServer::new(rising_provider("EURUSD=X"), &["EURUSD=X"]).await;
    app.harness.orchestrator.run_cycle().await;

    let recent: Value = app.server.get("/api/signals").await.json();
    assert_eq!(recent.as_array().unwrap().len(), 1);
    assert_eq!(recent[0]["symbol"], "EURUSD=X");
    assert_eq!(recent[0]["interval"], "5m");

    let by_symbol: Value = app.server.get("/api/signals/EURUSD=X").await.json();
    assert_eq!(by_symbol.as_array().unwrap().len(), 1);

    let strong: Value = app
        .server
        .get("/api/signals/strong")
        .add_query_param("min_strength", 4)
        .await
        .json();
    assert!(strong.as_array().unwrap().is_empty());

    let strong: Value = app.server.get("/api/signals/strong").await.json();
    assert_eq!(strong.as_array().unwrap().len(), 1);

    let unbounded = app
        .server
        .get("/api/signals")
        .add_query_param("limit", u64::MAX)
        .await;
    assert_eq!(unbounded.status_code(), 200);
    assert_eq!(unbounded.json::<Value>().as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn analyze_endpoint_runs_pipeline() {
    let app = TestApiServer::new(rising_provider("BTC-USD"), &[]).await;

    let response = app.server.post("/api/analyze/BTC-USD").await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["direction"], "CALL");
    assert_eq!(body["strength"], 3);
    assert_eq!(body["tier"], "strong");

    let missing = app.server.post("/api/analyze/NOPE").await;
    assert_eq!(missing.status_code(), 422);
}

#[tokio::test]
async fn instrument_management() {
    let app = TestApiServer::new(ScriptedProvider::new(), &[]).await;

    let seeded: Value = app.server.post("/api/instruments/defaults").await.json();
    assert_eq!(seeded["seeded"], 12);

    let created = app
        .server
        .post("/api/instruments")
        .json(&json!({"symbol": "ETH-USD", "display_name": "Ethereum", "category": "crypto"}))
        .await;
    assert_eq!(created.status_code(), 201);
    let id = created.json::<Value>()["id"].as_i64().unwrap();

    let duplicate = app
        .server
        .post("/api/instruments")
        .json(&json!({"symbol": "ETH-USD", "category": "crypto"}))
        .await;
    assert_eq!(duplicate.status_code(), 409);

    let invalid = app
        .server
        .post("/api/instruments")
        .json(&json!({"symbol": "XAU", "category": "metal"}))
        .await;
    assert_eq!(invalid.status_code(), 400);

    let updated = app
        .server
        .put(&format!("/api/instruments/{}/active", id))
        .json(&json!({"active": false}))
        .await;
    assert_eq!(updated.status_code(), 200);
    assert_eq!(updated.json::<Value>()["active"], false);

    let all: Value = app.server.get("/api/instruments").await.json();
    assert_eq!(all.as_array().unwrap().len(), 13);
    let active: Value = app
        .server
        .get("/api/instruments")
        .add_query_param("active", true)
        .await
        .json();
    assert_eq!(active.as_array().unwrap().len(), 12);

    let unknown = app
        .server
        .put("/api/instruments/9999/active")
        .json(&json!({"active": true}))
        .await;
    assert_eq!(unknown.status_code(), 404);
}

#[tokio::test]
async fn telegram_endpoints() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/botabc/sendMessage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let app = TestApiServer::with_telegram(
        ScriptedProvider::new(),
        &[],
        TelegramConfig {
            api_url: server.uri(),
            bot_token: Some("abc".to_string()),
            chat_id: Some("55512345".to_string()),
        },
    )
    .await;

    let status: Value = app.server.get("/api/telegram/status").await.json();
    assert_eq!(status, json!({"configured": true, "chat_id": "555***"}));

    let sent: Value = app.server.post("/api/telegram/test").await.json();
    assert_eq!(sent["success"], true);
}

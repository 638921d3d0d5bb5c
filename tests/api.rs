//! End-to-end tests for the HTTP command API.
//!
//! Each test builds the real router over an in-memory store and a manual
//! clock and drives it with `tower::ServiceExt::oneshot`; no TCP port is
//! bound.

use std::{sync::Arc, time::Duration};

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use multitimer::{
    api::create_router,
    state::{AppState, CompletionEvent, TimerStore},
    tasks::ManualClock,
};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tower::ServiceExt;

struct TestApp {
    state: Arc<AppState>,
    clock: Arc<ManualClock>,
    completions: mpsc::UnboundedReceiver<CompletionEvent>,
}

impl TestApp {
    fn new() -> Self {
        let clock = Arc::new(ManualClock::new());
        let (tx, rx) = mpsc::unbounded_channel();
        let state = Arc::new(AppState::new(
            20554,
            "127.0.0.1".to_string(),
            Duration::from_millis(100),
            TimerStore::new(),
            clock.clone(),
            tx,
        ));
        Self {
            state,
            clock,
            completions: rx,
        }
    }

    fn router(&self) -> Router {
        create_router(Arc::clone(&self.state))
    }

    fn advance(&self, seconds: f64) {
        self.clock.advance(Duration::from_secs_f64(seconds));
        self.state.tick();
    }

    async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create(&self, body: Value) -> String {
        let (status, timer) = self.send("POST", "/timers", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        timer["id"].as_str().unwrap().to_string()
    }
}

// ---------------------------------------------------------------------------
// Health and status
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_return_ok_when_health_check_called() {
    let app = TestApp::new();
    let (status, body) = app.send("GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn should_report_counts_in_status() {
    let app = TestApp::new();
    let id = app.create(json!({"duration": 10})).await;
    app.create(json!({"duration": 10})).await;
    app.send("POST", &format!("/timers/{id}/toggle"), None).await;

    let (status, body) = app.send("GET", "/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timers"], 2);
    assert_eq!(body["counts"]["running"], 1);
    assert_eq!(body["counts"]["idle"], 1);
    assert_eq!(body["tickMs"], 100);
}

// ---------------------------------------------------------------------------
// Create / list / get
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_create_idle_timer_with_defaults() {
    let app = TestApp::new();
    let (status, body) = app
        .send("POST", "/timers", Some(json!({"duration": 90})))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["label"], "Timer #1");
    assert_eq!(body["totalDuration"], 90.0);
    assert_eq!(body["remainingTime"], 90.0);
    assert_eq!(body["status"], "idle");
    assert_eq!(body["display"], "01:30");
    assert_eq!(body["volume"], 0.5);
    assert_eq!(body["sound"], "beep");
    assert_eq!(body["canReset"], false);
}

#[tokio::test]
async fn should_reject_non_positive_duration() {
    let app = TestApp::new();
    let (status, body) = app
        .send("POST", "/timers", Some(json!({"duration": 0})))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert!(app.state.snapshot().is_empty());
}

#[tokio::test]
async fn should_reject_out_of_range_volume_on_create() {
    let app = TestApp::new();
    let (status, body) = app
        .send("POST", "/timers", Some(json!({"duration": 10, "volume": 5.0})))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "volume must be within [0, 1], got 5");
    assert!(app.state.snapshot().is_empty());
}

#[tokio::test]
async fn should_list_running_timers_first() {
    let app = TestApp::new();
    app.create(json!({"duration": 5, "label": "idle"})).await;
    let running = app.create(json!({"duration": 5, "label": "running"})).await;
    app.send("POST", &format!("/timers/{running}/toggle"), None)
        .await;

    let (status, body) = app.send("GET", "/timers", None).await;
    assert_eq!(status, StatusCode::OK);
    let labels: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["label"].as_str().unwrap())
        .collect();
    assert_eq!(labels, ["running", "idle"]);
}

#[tokio::test]
async fn should_return_not_found_for_unknown_timer() {
    let app = TestApp::new();
    let (status, _) = app
        .send("GET", "/timers/5f0c6a3e-7d3b-4c43-9d2a-0a5e4f5b6c7d", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn should_reject_malformed_timer_id() {
    let app = TestApp::new();
    let (status, body) = app.send("POST", "/timers/abc/reset", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "invalid timer id: abc");
}

// ---------------------------------------------------------------------------
// Lifecycle commands
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_run_timer_to_completion_and_reset() {
    let mut app = TestApp::new();
    let id = app
        .create(json!({"duration": 2, "label": "Eggs", "useNotification": true}))
        .await;

    let (_, body) = app
        .send("POST", &format!("/timers/{id}/toggle"), None)
        .await;
    assert_eq!(body["status"], "running");

    app.advance(1.0);
    let (_, body) = app.send("GET", &format!("/timers/{id}"), None).await;
    assert_eq!(body["remainingTime"], 1.0);
    assert_eq!(body["progress"], 0.5);

    app.advance(1.5);
    let (_, body) = app.send("GET", &format!("/timers/{id}"), None).await;
    assert_eq!(body["status"], "completed");
    assert_eq!(body["remainingTime"], 0.0);
    assert_eq!(body["canReset"], true);

    let event = app.completions.try_recv().unwrap();
    assert_eq!(event.label, "Eggs");
    assert!(event.notify);

    let (status, body) = app
        .send("POST", &format!("/timers/{id}/reset"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "idle");
    assert_eq!(body["remainingTime"], 2.0);
}

#[tokio::test]
async fn should_pause_timer_on_second_toggle() {
    let app = TestApp::new();
    let id = app.create(json!({"duration": 10})).await;
    let toggle = format!("/timers/{id}/toggle");

    app.send("POST", &toggle, None).await;
    app.advance(4.0);
    let (_, body) = app.send("POST", &toggle, None).await;
    assert_eq!(body["status"], "paused");

    app.advance(4.0);
    let (_, body) = app.send("GET", &format!("/timers/{id}"), None).await;
    assert_eq!(body["remainingTime"], 6.0);
}

#[tokio::test]
async fn should_delete_timer() {
    let app = TestApp::new();
    let id = app.create(json!({"duration": 10})).await;

    let (status, _) = app.send("DELETE", &format!("/timers/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.send("DELETE", &format!("/timers/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn should_update_volume_while_running() {
    let app = TestApp::new();
    let id = app.create(json!({"duration": 10, "volume": 0.3})).await;
    app.send("POST", &format!("/timers/{id}/toggle"), None).await;

    let (status, body) = app
        .send("PUT", &format!("/timers/{id}/volume"), Some(json!({"volume": 0.8})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["volume"], 0.8);
    assert_eq!(body["status"], "running");
}

#[tokio::test]
async fn should_reject_out_of_range_volume() {
    let app = TestApp::new();
    let id = app.create(json!({"duration": 10})).await;

    let (status, _) = app
        .send("PUT", &format!("/timers/{id}/volume"), Some(json!({"volume": 1.5})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = app.send("GET", &format!("/timers/{id}"), None).await;
    assert_eq!(body["volume"], 0.5);
}

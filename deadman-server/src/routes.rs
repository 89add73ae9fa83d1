//! HTTP route handlers.
//!
//! `/time` and `/delCode` keep the plain-text wire format the bundled page
//! polls; `/api/*` adds JSON status and a health probe.

use axum::Router;
use axum::extract::State;
use axum::response::Json;
use axum::routing::{get, post};
use serde::Serialize;

use crate::state::AppState;

/// Body returned by `POST /delCode`, whether or not a countdown was already running.
pub const ARM_RESPONSE: &str = "Countdown started. Files will be deleted after the countdown ends.";

/// Build the full router (countdown routes plus `/api`).
pub fn app_router() -> Router<AppState> {
    Router::new()
        .route("/time", get(get_time))
        .route("/delCode", post(arm_countdown))
        .nest("/api", api_router())
}

fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/status", get(get_status))
}

async fn health() -> &'static str {
    "ok"
}

/// GET /time - remaining seconds as a plain integer.
async fn get_time(State(state): State<AppState>) -> String {
    state.controller.remaining_seconds().await.to_string()
}

/// POST /delCode - arm the countdown with the startup configuration.
async fn arm_countdown(State(state): State<AppState>) -> &'static str {
    state.controller.arm(&state.config).await;
    ARM_RESPONSE
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    armed: bool,
    remaining_seconds: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    deadline: Option<String>,
}

/// GET /api/status - countdown snapshot as JSON.
async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let snapshot = state.controller.snapshot().await;
    Json(StatusResponse {
        armed: snapshot.armed,
        remaining_seconds: snapshot.remaining_seconds,
        deadline: snapshot.deadline.map(|deadline| deadline.to_rfc3339()),
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use deadman::countdown::CountdownController;
    use deadman::deletion::DeletionExecutor;
    use deadman::test_support::GuardedTrees;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;

    fn app(trees: &GuardedTrees, time_limit_seconds: u64) -> Router {
        let controller = CountdownController::new(DeletionExecutor::default())
            .with_poll_interval(Duration::from_millis(50));
        app_router().with_state(AppState::new(trees.config(time_limit_seconds), controller))
    }

    async fn send(app: &Router, method: Method, uri: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("request");
        let response = app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (status, String::from_utf8(bytes.to_vec()).expect("utf8 body"))
    }

    #[tokio::test]
    async fn time_is_zero_before_arming() {
        let trees = GuardedTrees::new().expect("trees");
        let app = app(&trees, 60);

        let (status, body) = send(&app, Method::GET, "/time").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "0");
    }

    #[tokio::test]
    async fn del_code_arms_and_time_counts_down() {
        let trees = GuardedTrees::new().expect("trees");
        let app = app(&trees, 60);

        let (status, body) = send(&app, Method::POST, "/delCode").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, ARM_RESPONSE);

        let (_, body) = send(&app, Method::GET, "/time").await;
        let remaining: u64 = body.parse().expect("integer body");
        assert!((59..=60).contains(&remaining), "remaining = {remaining}");
    }

    #[tokio::test]
    async fn repeated_del_code_keeps_same_response() {
        let trees = GuardedTrees::new().expect("trees");
        let app = app(&trees, 60);

        send(&app, Method::POST, "/delCode").await;
        let (status, body) = send(&app, Method::POST, "/delCode").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, ARM_RESPONSE);
    }

    #[tokio::test]
    async fn del_code_rejects_get() {
        let trees = GuardedTrees::new().expect("trees");
        let app = app(&trees, 60);

        let (status, _) = send(&app, Method::GET, "/delCode").await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        let (_, body) = send(&app, Method::GET, "/time").await;
        assert_eq!(body, "0");
    }

    #[tokio::test]
    async fn status_reports_snapshot() {
        let trees = GuardedTrees::new().expect("trees");
        let app = app(&trees, 60);

        let (_, body) = send(&app, Method::GET, "/api/status").await;
        let idle: Value = serde_json::from_str(&body).expect("json");
        assert_eq!(idle["armed"], Value::Bool(false));
        assert!(idle.get("deadline").is_none());

        send(&app, Method::POST, "/delCode").await;
        let (_, body) = send(&app, Method::GET, "/api/status").await;
        let armed: Value = serde_json::from_str(&body).expect("json");
        assert_eq!(armed["armed"], Value::Bool(true));
        assert!(armed["deadline"].is_string());
        assert!(armed["remaining_seconds"].as_u64().expect("u64") <= 60);
    }

    #[tokio::test]
    async fn health_is_ok() {
        let trees = GuardedTrees::new().expect("trees");
        let app = app(&trees, 60);
        let (status, body) = send(&app, Method::GET, "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn countdown_expiry_wipes_roots() {
        let trees = GuardedTrees::new().expect("trees");
        let app = app(&trees, 1);

        send(&app, Method::POST, "/delCode").await;
        tokio::time::timeout(Duration::from_secs(10), async {
            loop {
                let (_, body) = send(&app, Method::GET, "/api/status").await;
                let status: Value = serde_json::from_str(&body).expect("json");
                if status["armed"] == Value::Bool(false) {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        })
        .await
        .expect("countdown should expire");

        assert_eq!(trees.remaining_files(), 0);
        let (_, body) = send(&app, Method::GET, "/time").await;
        assert_eq!(body, "0");
    }
}

//! In-process stub backend for exercising the client against real HTTP.
//!
//! Simulates just enough of the REST surface: the refresh endpoint, the
//! profile probe, and one protected resource. Handlers accept the
//! tokens the scenarios mint ("good-token" before refresh,
//! "fresh-token" after) and count every hit so tests can assert on
//! exactly how many calls the protocol made.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use presenta_core::{AppConfig, SessionStore};
use presenta_client::ApiClient;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default)]
pub struct StubOptions {
    /// Refresh endpoint rejects instead of rotating tokens.
    pub fail_refresh: bool,
    /// Protected endpoint 401s with a message that is not about tokens.
    pub plain_401: bool,
    /// Profile endpoint starts failing after this many successes.
    pub fail_profile_after: Option<usize>,
    /// Slows the refresh endpoint down to widen race windows.
    pub refresh_delay_ms: u64,
}

pub struct StubState {
    pub options: StubOptions,
    pub refresh_calls: AtomicUsize,
    pub profile_calls: AtomicUsize,
    pub recent_calls: AtomicUsize,
    pub total_calls: AtomicUsize,
}

pub struct Stub {
    pub addr: SocketAddr,
    pub state: Arc<StubState>,
}

const VALID_TOKENS: [&str; 2] = ["good-token", "fresh-token"];

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

fn token_is_valid(headers: &HeaderMap) -> bool {
    bearer(headers).is_some_and(|t| VALID_TOKENS.contains(&t.as_str()))
}

async fn refresh(
    State(state): State<Arc<StubState>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.total_calls.fetch_add(1, Ordering::SeqCst);
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);
    if state.options.refresh_delay_ms > 0 {
        tokio::time::sleep(std::time::Duration::from_millis(state.options.refresh_delay_ms)).await;
    }
    if state.options.fail_refresh || body.get("refresh").and_then(Value::as_str).is_none() {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Token is invalid or expired" })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({ "access": "fresh-token", "refresh": "rotated-refresh" })),
    )
}

async fn profile(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    state.total_calls.fetch_add(1, Ordering::SeqCst);
    if !token_is_valid(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Given token not valid for any token type" })),
        );
    }
    let hits = state.profile_calls.fetch_add(1, Ordering::SeqCst) + 1;
    if let Some(limit) = state.options.fail_profile_after {
        if hits > limit {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "profile backend unavailable" })),
            );
        }
    }
    (
        StatusCode::OK,
        Json(json!({
            "user": {
                "id": 7,
                "first_name": "Dana",
                "last_name": "Reyes",
                "email": "dana@reyesrealty.com",
                "headshot": "/media/old-headshot.jpg",
                "profile": {
                    "company_name": "Reyes Realty",
                    "shortest_sale": "9 days",
                    "headshot": "/media/new-headshot.jpg"
                }
            }
        })),
    )
}

async fn recent(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    state.total_calls.fetch_add(1, Ordering::SeqCst);
    state.recent_calls.fetch_add(1, Ordering::SeqCst);
    if state.options.plain_401 {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "No active account found with the given credentials" })),
        );
    }
    if !token_is_valid(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Token is invalid or expired" })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "analyses": [{
                "id": 1,
                "address": "1428 Elm Street, Springwood",
                "package_name": "Pro",
                "created_at": "2026-07-01T12:00:00Z"
            }]
        })),
    )
}

pub async fn start(options: StubOptions) -> Stub {
    let state = Arc::new(StubState {
        options,
        refresh_calls: AtomicUsize::new(0),
        profile_calls: AtomicUsize::new(0),
        recent_calls: AtomicUsize::new(0),
        total_calls: AtomicUsize::new(0),
    });
    let app = Router::new()
        .route("/api/auth/refresh/", post(refresh))
        .route("/api/auth/profile/", get(profile))
        .route("/api/auth/analyses/recent/", get(recent))
        .with_state(Arc::clone(&state));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub backend");
    let addr = listener.local_addr().expect("stub addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub backend");
    });
    Stub { addr, state }
}

/// A client wired to the stub with a fresh temp store.
pub fn client_for(addr: SocketAddr, dir: &tempfile::TempDir) -> ApiClient {
    let config = AppConfig {
        api_base_url: format!("http://{addr}/api"),
        share_base_url: format!("http://{addr}"),
        storage_path: dir.path().display().to_string(),
        request_timeout_secs: 5,
        refresh_interval_hours: 3,
        refresh_lead_minutes: 30,
        export_dir: dir.path().display().to_string(),
        pdf_command: None,
        payment_gateway_url: format!("http://{addr}"),
        payment_publishable_key: None,
    };
    let store = Arc::new(SessionStore::open_path(config.session_store_path()).expect("open store"));
    ApiClient::new(&config, store).expect("build client")
}

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};

use trendwatch::api::ApiClient;
use trendwatch::session::{now_timestamp, Session};

/// Password the mock backend accepts for any username
pub const PASSWORD: &str = "secret";

/// Request the mock backend saw
#[derive(Debug, Clone)]
pub struct Seen {
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub query: HashMap<String, String>,
    /// JSON body fields, or multipart parts (`name` -> text, or `file_name:len` for files)
    pub body: HashMap<String, String>,
}

#[derive(Clone, Default)]
pub struct MockState {
    pub seen: Arc<Mutex<Vec<Seen>>>,
    /// Artificial latency for `/api/stats`, in milliseconds
    pub stats_delay_ms: Arc<AtomicU64>,
    /// Rows served by `/api/post-trends`
    pub post_trend_rows: Arc<AtomicU64>,
    /// Hashtag ids deactivated through the API
    pub deactivated: Arc<Mutex<Vec<String>>>,
}

impl MockState {
    fn record(&self, path: &str, headers: &HeaderMap, query: HashMap<String, String>) {
        self.record_body(path, headers, query, HashMap::new());
    }

    fn record_body(
        &self,
        path: &str,
        headers: &HeaderMap,
        query: HashMap<String, String>,
        body: HashMap<String, String>,
    ) {
        let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string);
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(Seen {
                path: path.to_string(),
                authorization: header("authorization"),
                content_type: header("content-type"),
                query,
                body,
            });
        }
    }

    pub fn requests(&self) -> Vec<Seen> {
        self.seen.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn last(&self, path: &str) -> Option<Seen> {
        self.requests().into_iter().rev().find(|s| s.path == path)
    }
}

pub struct MockBackend {
    pub base_url: String,
    pub state: MockState,
}

/// Start an in-process backend on a free port
pub async fn spawn_backend() -> Result<MockBackend> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let state = MockState::default();
    state.post_trend_rows.store(23, Ordering::SeqCst);

    let app = Router::new()
        .route("/api/login", post(login))
        .route("/api/hashtags", get(hashtags))
        .route("/api/hashtag", post(add_hashtag))
        .route("/api/hashtags/:id/deactivate", patch(deactivate_hashtag))
        .route("/api/search/multimodal", post(multimodal_search))
        .route("/api/posts", get(posts))
        .route("/api/stats", get(stats))
        .route("/api/post-trends", get(post_trends))
        .route("/api/author-trends", get(author_trends))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(MockBackend {
        base_url: format!("http://127.0.0.1:{}", port),
        state,
    })
}

async fn login(State(state): State<MockState>, headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    state.record("/api/login", &headers, HashMap::new());

    if body.get("password").and_then(Value::as_str) != Some(PASSWORD) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Incorrect username or password" })),
        );
    }

    let username = body.get("username").and_then(Value::as_str).unwrap_or_default();
    let token = token_for(username, 3600);
    (StatusCode::OK, Json(json!({ "access_token": token, "token_type": "bearer" })))
}

async fn hashtags(State(state): State<MockState>, headers: HeaderMap) -> Json<Value> {
    state.record("/api/hashtags", &headers, HashMap::new());
    let deactivated = state.deactivated.lock().map(|d| d.clone()).unwrap_or_default();
    let active: Vec<Value> = [("h1", "fyp"), ("h2", "dance")]
        .into_iter()
        .filter(|(id, _)| !deactivated.iter().any(|d| d == id))
        .map(|(id, title)| json!({ "id": id, "title": title, "active": true }))
        .collect();
    Json(Value::Array(active))
}

async fn add_hashtag(State(state): State<MockState>, headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    let fields = body
        .as_object()
        .map(|map| {
            map.iter()
                .map(|(k, v)| (k.clone(), v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string())))
                .collect()
        })
        .unwrap_or_default();
    state.record_body("/api/hashtag", &headers, HashMap::new(), fields);
    Json(json!({ "message": "Hashtag added successfully" }))
}

async fn deactivate_hashtag(
    State(state): State<MockState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    state.record(&format!("/api/hashtags/{}/deactivate", id), &headers, HashMap::new());
    if id == "missing" {
        return (StatusCode::NOT_FOUND, Json(json!({ "detail": "Hashtag not found" })));
    }
    if let Ok(mut deactivated) = state.deactivated.lock() {
        deactivated.push(id);
    }
    (StatusCode::OK, Json(json!({ "message": "Hashtag deactivated successfully" })))
}

async fn multimodal_search(
    State(state): State<MockState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    let mut parts = HashMap::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let Ok(bytes) = field.bytes().await else {
            return (StatusCode::BAD_REQUEST, Json(json!({ "detail": "unreadable part" })));
        };
        let value = match file_name {
            Some(file_name) => format!("{}:{}", file_name, bytes.len()),
            None => String::from_utf8_lossy(&bytes).into_owned(),
        };
        parts.insert(name, value);
    }
    state.record_body("/api/search/multimodal", &headers, HashMap::new(), parts);
    (StatusCode::OK, Json(json!([])))
}

async fn posts(
    State(state): State<MockState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let missing = !query.contains_key("hashtag");
    state.record("/api/posts", &headers, query);

    // the posts request model declares `hashtag` without a default
    if missing {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "detail": [{ "loc": ["query", "hashtag"], "msg": "field required", "type": "value_error.missing" }] })),
        );
    }
    (StatusCode::OK, Json(json!([])))
}

async fn stats(State(state): State<MockState>, headers: HeaderMap) -> Json<Value> {
    state.record("/api/stats", &headers, HashMap::new());

    let delay = state.stats_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    Json(json!({
        "author_count": 1200,
        "post_count": 45210,
        "active_hashtags_count": 12,
        "challenge_count": 310
    }))
}

async fn post_trends(
    State(state): State<MockState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    state.record("/api/post-trends", &headers, query);

    let rows = state.post_trend_rows.load(Ordering::SeqCst);
    let items: Vec<Value> = (0..rows)
        .map(|i| {
            json!({
                "post_id": format!("p{}", i),
                "author_name": "ana",
                "post_description": "dance, dance",
                "collected_at": "2024-03-01T10:00:00",
                "current_views": 1_000_000 + i,
                "daily_change": 1500,
                "weekly_change": 7000,
                "monthly_change": 30000,
                "daily_growth_rate": 1.5,
                "weekly_growth_rate": 12.25,
                "monthly_growth_rate": 80.0,
                "challenges": ["fyp", "dance"]
            })
        })
        .collect();

    Json(json!({ "items": items, "total": rows }))
}

async fn author_trends(State(state): State<MockState>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    state.record("/api/author-trends", &headers, HashMap::new());
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "detail": "Error fetching author trends" })),
    )
}

/// Token the backend would issue, expiring `secs` from now (negative for past)
pub fn token_for(username: &str, secs: i64) -> String {
    encode(
        &Header::default(),
        &json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "roles": "[\"user\"]",
            "exp": now_timestamp() + secs
        }),
        &EncodingKey::from_secret(b"backend-secret"),
    )
    .unwrap_or_default()
}

pub fn client(backend: &MockBackend, session: Session) -> Result<ApiClient> {
    Ok(ApiClient::with_timeout(&backend.base_url, Duration::from_millis(1000), session)?)
}

/// Fresh directory under the system temp dir
pub fn temp_dir() -> PathBuf {
    std::env::temp_dir().join(format!("trendwatch-test-{}", uuid::Uuid::new_v4()))
}

//! Shared fixtures for unit and router tests.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use crate::auth::SessionService;
use crate::config::{AppConfig, DEV_ADMIN_PASSWORD};
use crate::settings::SettingsService;
use crate::state::AppState;
use crate::store::{ContentStore, MemoryStore};

/// In-memory state with a fast bcrypt cost.
pub fn test_state() -> AppState {
    let config = AppConfig::default();
    let store: Arc<dyn ContentStore> = Arc::new(MemoryStore::new());
    let settings = SettingsService::new(store.clone());
    let sessions = SessionService::new(
        &config.session_secret,
        config.session_ttl_hours,
        false,
        settings.clone(),
    )
    .with_bcrypt_cost(4);
    AppState::with_sessions(config, store, settings, sessions)
}

/// Seeded state plus a valid admin bearer token.
pub async fn seeded() -> (AppState, String) {
    let state = test_state();
    crate::seed::seed_defaults(&state).await.unwrap();
    let session = state
        .sessions()
        .login(Some(DEV_ADMIN_PASSWORD.to_string()))
        .await
        .unwrap();
    (state, session.token)
}

pub async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    request("GET", uri, token, None)
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    request(method, uri, token, Some(body))
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

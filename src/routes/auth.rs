/**
 * Admin Auth Routes
 * Password login, logout and session status for the admin panel
 */
use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::AdminSession;
use crate::error::AppResult;
use crate::routes::{ApiJson, SuccessResponse};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for POST /api/admin/login
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: Option<String>,
}

/// Response for POST /api/admin/login
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Response for GET /api/admin/session
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Request body for PUT /api/admin/password
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/admin/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let sessions = state.sessions();
    let session = sessions.login(body.password).await?;
    let cookie = sessions.session_cookie(&session);

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            success: true,
            token: session.token,
            expires_at: session.expires_at,
        }),
    ))
}

/// POST /api/admin/logout
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    tracing::info!("admin logged out");
    (
        [(header::SET_COOKIE, state.sessions().clear_cookie())],
        Json(SuccessResponse::ok()),
    )
}

/// GET /api/admin/session
pub async fn session_status(State(state): State<AppState>, headers: HeaderMap) -> Json<SessionResponse> {
    let claims = state.sessions().authenticate(&headers);
    Json(SessionResponse {
        authenticated: claims.is_some(),
        expires_at: claims.and_then(|c| Utc.timestamp_opt(c.exp, 0).single()),
    })
}

/// PUT /api/admin/password
pub async fn change_password(
    _admin: AdminSession,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ChangePasswordRequest>,
) -> AppResult<Json<SuccessResponse>> {
    state
        .sessions()
        .change_password(&body.current_password, &body.new_password)
        .await?;
    Ok(Json(SuccessResponse::ok()))
}

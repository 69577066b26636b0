/**
 * Settings Routes
 * Admin key/value settings
 */
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::auth::AdminSession;
use crate::error::{AppError, AppResult};
use crate::routes::ApiJson;
use crate::settings::AdminSetting;
use crate::state::AppState;

/// Request body for PUT /api/admin/settings/{key}
#[derive(Debug, Deserialize)]
pub struct UpdateSettingRequest {
    pub value: Option<Value>,
}

/// GET /api/admin/settings
pub async fn list_settings(
    _admin: AdminSession,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<AdminSetting>>> {
    Ok(Json(state.settings().list().await?))
}

/// GET /api/admin/settings/{key}
pub async fn get_setting(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<Json<AdminSetting>> {
    Ok(Json(state.settings().get(&key).await?))
}

/// PUT /api/admin/settings/{key}
pub async fn put_setting(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(key): Path<String>,
    ApiJson(body): ApiJson<UpdateSettingRequest>,
) -> AppResult<Json<AdminSetting>> {
    let value = body
        .value
        .ok_or_else(|| AppError::validation("Setting value is required"))?;
    Ok(Json(state.settings().put(&key, value).await?))
}

/**
 * Content Type Routes
 * Admin endpoints for registering and toggling content types
 */
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::auth::AdminSession;
use crate::content::{
    ContentItem, ContentType, ContentTypeWithCount, CreateItem, ItemWrite, RegisterContentType,
};
use crate::error::{AppError, AppResult};
use crate::routes::ApiJson;
use crate::state::AppState;

/// Query parameters for GET /api/admin/content-types
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTypesQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

/// Request body for PATCH /api/admin/content-types/{slug}
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleRequest {
    pub is_active: Option<bool>,
}

/// GET /api/admin/content-types
pub async fn list_content_types(
    _admin: AdminSession,
    State(state): State<AppState>,
    Query(query): Query<ListTypesQuery>,
) -> AppResult<Json<Vec<ContentTypeWithCount>>> {
    let types = state
        .content_types()
        .list_with_counts(!query.include_inactive)
        .await?;
    Ok(Json(types))
}

/// POST /api/admin/content-types
pub async fn create_content_type(
    _admin: AdminSession,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterContentType>,
) -> AppResult<(StatusCode, Json<ContentType>)> {
    let content_type = state.content_types().register(body).await?;
    Ok((StatusCode::CREATED, Json(content_type)))
}

/// PATCH /api/admin/content-types/{slug}
pub async fn toggle_content_type(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    ApiJson(body): ApiJson<ToggleRequest>,
) -> AppResult<Json<ContentType>> {
    let is_active = body
        .is_active
        .ok_or_else(|| AppError::validation("isActive is required"))?;
    Ok(Json(state.content_types().set_active(&slug, is_active).await?))
}

/// GET /api/admin/content-types/{slug}/items
pub async fn list_type_items(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<Vec<ContentItem>>> {
    Ok(Json(state.items().list_by_type(&slug).await?))
}

/// POST /api/admin/content-types/{slug}/items
pub async fn create_type_item(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    ApiJson(body): ApiJson<CreateItem>,
) -> AppResult<(StatusCode, Json<ItemWrite>)> {
    let written = state.items().create_for_type(&slug, body).await?;
    Ok((StatusCode::CREATED, Json(written)))
}

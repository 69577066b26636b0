/**
 * Content Item Routes
 * Admin CRUD for content items addressed by slug
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::auth::AdminSession;
use crate::content::{ContentItemPatch, CreateItem, ItemWrite, ResolvedItem};
use crate::error::AppResult;
use crate::routes::{ApiJson, SuccessResponse};
use crate::state::AppState;

/// POST /api/admin/content
pub async fn create_item(
    _admin: AdminSession,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateItem>,
) -> AppResult<(StatusCode, Json<ItemWrite>)> {
    let written = state.items().create(body).await?;
    Ok((StatusCode::CREATED, Json(written)))
}

/// GET /api/admin/content/{slug}
/// Admins see drafts and private items too.
pub async fn get_item(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ResolvedItem>> {
    Ok(Json(state.items().get_by_slug(&slug).await?))
}

/// PUT /api/admin/content/{slug}
pub async fn update_item(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    ApiJson(patch): ApiJson<ContentItemPatch>,
) -> AppResult<Json<ItemWrite>> {
    Ok(Json(state.items().update(&slug, patch).await?))
}

/// DELETE /api/admin/content/{slug}
pub async fn delete_item(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<SuccessResponse>> {
    state.items().delete(&slug).await?;
    Ok(Json(SuccessResponse::ok()))
}

/**
 * Social Link Routes
 * Admin CRUD for the navigation dock links
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::auth::AdminSession;
use crate::error::AppResult;
use crate::routes::ApiJson;
use crate::social::{CreateSocialLink, SocialLink, SocialLinkPatch};
use crate::state::AppState;

/// GET /api/admin/social
pub async fn list_links(
    _admin: AdminSession,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<SocialLink>>> {
    Ok(Json(state.social().list().await?))
}

/// POST /api/admin/social
pub async fn create_link(
    _admin: AdminSession,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateSocialLink>,
) -> AppResult<(StatusCode, Json<SocialLink>)> {
    let link = state.social().create(body).await?;
    Ok((StatusCode::CREATED, Json(link)))
}

/// PUT /api/admin/social/{id}
pub async fn update_link(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<SocialLinkPatch>,
) -> AppResult<Json<SocialLink>> {
    Ok(Json(state.social().update(&id, patch).await?))
}

/// DELETE /api/admin/social/{id}
/// Returns the removed link.
pub async fn delete_link(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<SocialLink>> {
    Ok(Json(state.social().delete(&id).await?))
}

/**
 * Public Routes
 * Read-only endpoints backing the portfolio site
 */
use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::content::{FeedFilter, PublicFeed, RenderResult, ResolvedItem};
use crate::error::AppResult;
use crate::social::SocialLink;
use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

/// Response for GET /api/content and GET /api/content/home
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedResponse {
    pub content: PublicFeed,
    pub social_links: Vec<SocialLink>,
    pub timestamp: DateTime<Utc>,
}

/// Response for GET /api/pages/{slug}
#[derive(Debug, Serialize)]
pub struct PageResponse {
    pub item: ResolvedItem,
    pub render: RenderResult,
}

// ============================================================================
// Handlers
// ============================================================================

async fn feed_response(state: &AppState, content: PublicFeed) -> AppResult<Json<FeedResponse>> {
    let social_links = state.social().list_visible().await?;
    Ok(Json(FeedResponse {
        content,
        social_links,
        timestamp: Utc::now(),
    }))
}

/// GET /api/content?type=...&publicOnly=...
pub async fn get_content(
    State(state): State<AppState>,
    Query(filter): Query<FeedFilter>,
) -> AppResult<Json<FeedResponse>> {
    let content = state.visibility().resolve_public_feed(&filter).await?;
    tracing::debug!(
        type_slug = ?filter.type_slug,
        public_only = filter.public_only,
        groups = content.len(),
        "public feed resolved"
    );
    feed_response(&state, content).await
}

/// GET /api/content/home
pub async fn get_home(State(state): State<AppState>) -> AppResult<Json<FeedResponse>> {
    let content = state.visibility().resolve_homepage_feed().await?;
    feed_response(&state, content).await
}

/// GET /api/pages/{slug}
/// Resolves a published item and renders it through its layout.
pub async fn get_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<PageResponse>> {
    let item = state.visibility().resolve_by_slug(&slug).await?;
    let render = state.layouts().dispatch(&item);
    if render.fallback {
        tracing::warn!(
            slug = %slug,
            layout = %item.content_type.layout_component,
            "page rendered with raw fallback"
        );
    }
    Ok(Json(PageResponse { item, render }))
}

/// GET /api/social
pub async fn get_social(State(state): State<AppState>) -> AppResult<Json<Vec<SocialLink>>> {
    Ok(Json(state.social().list_visible().await?))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::create_app;
    use crate::test_support::{get, json_request, seeded, send, test_state};

    async fn publish_about(token: &str, app: &axum::Router, slug: &str, public: bool) {
        let (status, _) = send(
            app.clone(),
            json_request(
                "POST",
                "/api/admin/content-types/about/items",
                Some(token),
                json!({
                    "slug": slug,
                    "title": "About Me",
                    "data": {
                        "title": "Khang",
                        "content": "<p>Builds things</p>",
                        "skills": ["rust"]
                    },
                    "isPublic": public,
                    "isPublished": true
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_feed_on_empty_store_is_empty() {
        let app = create_app(test_state());
        let (status, body) = send(app, get("/api/content", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["content"], json!({}));
        assert_eq!(body["socialLinks"], json!([]));
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_feed_lists_public_published_items() {
        let (state, token) = seeded().await;
        let app = create_app(state);
        publish_about(&token, &app, "about-me", true).await;
        publish_about(&token, &app, "secret-about", false).await;

        let (status, body) = send(app.clone(), get("/api/content", None)).await;
        assert_eq!(status, StatusCode::OK);
        let items = body["content"]["about"]["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["slug"], "about-me");
        assert_eq!(body["content"]["about"]["contentType"]["slug"], "about");
        assert_eq!(body["socialLinks"].as_array().unwrap().len(), 4);

        let (_, all) = send(app, get("/api/content?type=about&publicOnly=false", None)).await;
        assert_eq!(all["content"]["about"]["items"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_feed_unknown_type_is_empty() {
        let (state, _) = seeded().await;
        let (status, body) = send(create_app(state), get("/api/content?type=nope", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["content"], json!({}));
    }

    #[tokio::test]
    async fn test_page_renders_through_layout() {
        let (state, token) = seeded().await;
        let app = create_app(state);
        publish_about(&token, &app, "about-me", false).await;

        let (status, body) = send(app, get("/api/pages/about-me", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["item"]["slug"], "about-me");
        assert_eq!(body["render"]["layout"], "AboutLayout");
        assert_eq!(body["render"]["fallback"], false);
        assert!(body["render"]["html"].as_str().unwrap().contains("Khang"));
    }

    #[tokio::test]
    async fn test_missing_page_is_404_with_message() {
        let (state, _) = seeded().await;
        let (status, body) = send(create_app(state), get("/api/pages/ghost", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "No content found for \"ghost\"");
    }

    #[tokio::test]
    async fn test_public_social_hides_invisible_links() {
        let (state, token) = seeded().await;
        let app = create_app(state);
        let (status, _) = send(
            app.clone(),
            json_request(
                "PUT",
                "/api/admin/social/fandom",
                Some(&token),
                json!({ "isVisible": false }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(app, get("/api/social", None)).await;
        let ids: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|l| l["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["github", "linkedin", "twitter"]);
    }
}

//! Public visibility rules.
//!
//! The aggregate feed lists items that are both public and published; a
//! direct slug lookup only requires the item to be published.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::items::ItemService;
use super::model::{ContentItem, ContentTypeSummary, ResolvedItem};
use crate::error::{AppError, AppResult};
use crate::store::{ContentStore, ItemOrder, ItemQuery};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedFilter {
    #[serde(default, rename = "type")]
    pub type_slug: Option<String>,
    #[serde(default = "default_public_only")]
    pub public_only: bool,
}

fn default_public_only() -> bool {
    true
}

impl Default for FeedFilter {
    fn default() -> Self {
        Self {
            type_slug: None,
            public_only: true,
        }
    }
}

/// The public projection of an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub data: Value,
    pub is_public: bool,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl From<ContentItem> for FeedItem {
    fn from(item: ContentItem) -> Self {
        Self {
            id: item.id,
            slug: item.slug,
            title: item.title,
            data: item.data,
            is_public: item.is_public,
            meta_title: item.meta_title,
            meta_description: item.meta_description,
            published_at: item.published_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedGroup {
    pub content_type: ContentTypeSummary,
    pub items: Vec<FeedItem>,
}

/// Feed grouped by content type slug. Items keep feed order within a group.
pub type PublicFeed = BTreeMap<String, FeedGroup>;

#[derive(Clone)]
pub struct VisibilityResolver {
    store: Arc<dyn ContentStore>,
    items: ItemService,
}

impl VisibilityResolver {
    pub fn new(store: Arc<dyn ContentStore>, items: ItemService) -> Self {
        Self { store, items }
    }

    pub async fn resolve_public_feed(&self, filter: &FeedFilter) -> AppResult<PublicFeed> {
        let content_type_id = match filter.type_slug.as_deref() {
            Some(slug) => match self.store.find_content_type(slug).await? {
                Some(t) => Some(t.id),
                None => return Ok(PublicFeed::new()),
            },
            None => None,
        };

        let items = self
            .store
            .query_items(ItemQuery {
                content_type_id,
                published_only: true,
                public_only: filter.public_only,
                order: ItemOrder::RecentlyPublished,
            })
            .await?;

        let types: BTreeMap<Uuid, ContentTypeSummary> = self
            .store
            .list_content_types(false)
            .await?
            .iter()
            .map(|t| (t.id, ContentTypeSummary::from(t)))
            .collect();

        let mut feed = PublicFeed::new();
        for item in items {
            let Some(summary) = types.get(&item.content_type_id) else {
                tracing::warn!(slug = %item.slug, "feed item has no content type, skipping");
                continue;
            };
            feed.entry(summary.slug.clone())
                .or_insert_with(|| FeedGroup {
                    content_type: summary.clone(),
                    items: Vec::new(),
                })
                .items
                .push(item.into());
        }

        tracing::debug!(
            groups = feed.len(),
            type_slug = ?filter.type_slug,
            public_only = filter.public_only,
            "resolved public feed"
        );
        Ok(feed)
    }

    pub async fn resolve_homepage_feed(&self) -> AppResult<PublicFeed> {
        self.resolve_public_feed(&FeedFilter::default()).await
    }

    /// Published item at `slug`, public or not.
    pub async fn resolve_by_slug(&self, slug: &str) -> AppResult<ResolvedItem> {
        let not_found = || AppError::NotFound(format!("No content found for \"{}\"", slug));

        let item = self
            .store
            .find_item(slug)
            .await?
            .filter(ContentItem::is_resolvable)
            .ok_or_else(not_found)?;

        self.items.resolve(item).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::model::{ContentItemPatch, CreateItem};
    use crate::content::registry::ContentTypeRegistry;
    use crate::store::MemoryStore;
    use serde_json::json;

    struct Fixture {
        items: ItemService,
        resolver: VisibilityResolver,
        registry: ContentTypeRegistry,
    }

    async fn fixture() -> Fixture {
        let store: Arc<dyn ContentStore> = Arc::new(MemoryStore::new());
        let registry = ContentTypeRegistry::new(store.clone());
        registry.seed_builtin().await.unwrap();
        let items = ItemService::new(store.clone(), registry.clone());
        let resolver = VisibilityResolver::new(store, items.clone());
        Fixture {
            items,
            resolver,
            registry,
        }
    }

    async fn create(f: &Fixture, type_slug: &str, title: &str, public: bool, published: bool) {
        f.items
            .create_for_type(
                type_slug,
                CreateItem {
                    title: Some(title.to_string()),
                    data: Some(json!({ "title": title })),
                    is_public: Some(public),
                    is_published: Some(published),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    fn slugs(feed: &PublicFeed, group: &str) -> Vec<String> {
        feed.get(group)
            .map(|g| g.items.iter().map(|i| i.slug.clone()).collect())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_feed_contains_only_public_published() {
        let f = fixture().await;
        create(&f, "about", "Live", true, true).await;
        create(&f, "about", "Draft", true, false).await;
        create(&f, "about", "Unlisted", false, true).await;
        create(&f, "about", "Hidden Draft", false, false).await;

        let feed = f.resolver.resolve_homepage_feed().await.unwrap();
        assert_eq!(slugs(&feed, "about"), vec!["live"]);
        assert_eq!(feed["about"].content_type.layout_component, "AboutLayout");

        let all = f
            .resolver
            .resolve_public_feed(&FeedFilter {
                type_slug: None,
                public_only: false,
            })
            .await
            .unwrap();
        let mut included = slugs(&all, "about");
        included.sort();
        assert_eq!(included, vec!["live", "unlisted"]);
    }

    #[tokio::test]
    async fn test_feed_groups_by_type_and_filters() {
        let f = fixture().await;
        create(&f, "about", "Me", true, true).await;
        create(&f, "work", "Projects", true, true).await;

        let feed = f.resolver.resolve_homepage_feed().await.unwrap();
        assert_eq!(feed.keys().cloned().collect::<Vec<_>>(), vec!["about", "work"]);

        let work_only = f
            .resolver
            .resolve_public_feed(&FeedFilter {
                type_slug: Some("work".to_string()),
                public_only: true,
            })
            .await
            .unwrap();
        assert_eq!(work_only.len(), 1);
        assert_eq!(slugs(&work_only, "work"), vec!["projects"]);
    }

    #[tokio::test]
    async fn test_unknown_type_yields_empty_feed() {
        let f = fixture().await;
        create(&f, "about", "Me", true, true).await;
        let feed = f
            .resolver
            .resolve_public_feed(&FeedFilter {
                type_slug: Some("nonexistent".to_string()),
                public_only: true,
            })
            .await
            .unwrap();
        assert!(feed.is_empty());
    }

    #[tokio::test]
    async fn test_feed_newest_published_first() {
        let f = fixture().await;
        create(&f, "about", "Older", true, true).await;
        create(&f, "about", "Newer", true, false).await;
        f.items
            .update(
                "newer",
                ContentItemPatch {
                    is_published: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let feed = f.resolver.resolve_homepage_feed().await.unwrap();
        assert_eq!(slugs(&feed, "about"), vec!["newer", "older"]);
    }

    #[tokio::test]
    async fn test_resolve_by_slug_requires_published_only() {
        let f = fixture().await;
        create(&f, "about", "Unlisted", false, true).await;
        create(&f, "about", "Draft", true, false).await;

        let resolved = f.resolver.resolve_by_slug("unlisted").await.unwrap();
        assert_eq!(resolved.content_type.slug, "about");

        let err = f.resolver.resolve_by_slug("draft").await.unwrap_err();
        assert_eq!(err.to_string(), "No content found for \"draft\"");
        assert!(matches!(
            f.resolver.resolve_by_slug("missing").await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_unpublish_removes_from_feed_and_direct_lookup() {
        let f = fixture().await;
        let about = f.registry.get_by_slug("about").await.unwrap();
        f.items
            .create(CreateItem {
                content_type_id: Some(about.id),
                title: Some("About Me".to_string()),
                data: Some(json!({ "title": "About Me", "content": "<p>Hi</p>" })),
                is_public: Some(true),
                is_published: Some(true),
                ..Default::default()
            })
            .await
            .unwrap();
        let feed = f.resolver.resolve_homepage_feed().await.unwrap();
        assert_eq!(slugs(&feed, "about"), vec!["about-me"]);

        let updated = f
            .items
            .update(
                "about-me",
                ContentItemPatch {
                    is_published: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.item.item.published_at, None);

        let feed = f.resolver.resolve_homepage_feed().await.unwrap();
        assert!(feed.get("about").is_none());
        assert!(matches!(
            f.resolver.resolve_by_slug("about-me").await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_published_item_without_public_flag_stays_off_feed() {
        let f = fixture().await;
        f.items
            .create_for_type(
                "about",
                CreateItem {
                    title: Some("Quiet Page".to_string()),
                    data: Some(json!({ "title": "Quiet Page" })),
                    is_published: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let feed = f.resolver.resolve_homepage_feed().await.unwrap();
        assert!(feed.is_empty());

        // Still reachable at its own URL.
        let resolved = f.resolver.resolve_by_slug("quiet-page").await.unwrap();
        assert!(!resolved.item.is_public);
    }
}

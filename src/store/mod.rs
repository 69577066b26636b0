//! Storage backends.
//!
//! All reads and writes of content types, items, social links and settings go
//! through [`ContentStore`]. Uniqueness of slugs and link ids is enforced by
//! the backend itself (a unique index in PostgreSQL, a single critical section
//! in memory), never by a read-then-write in the services.

mod memory;
mod postgres;

use std::cmp::Ordering;
use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::content::{ContentItem, ContentItemPatch, ContentType, NewContentItem, NewContentType};
use crate::settings::AdminSetting;
use crate::social::{NewSocialLink, SocialLink, SocialLinkPatch};

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write; carries the constraint name.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    /// A stored row could not be decoded into its model.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Sort order for item queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOrder {
    /// `updated_at` desc, then `created_at` desc. Editors' view.
    RecentlyUpdated,
    /// `published_at` desc, then `created_at` desc. Public feeds.
    RecentlyPublished,
}

impl ItemOrder {
    pub(crate) fn sql(self) -> &'static str {
        match self {
            ItemOrder::RecentlyUpdated => "updated_at DESC, created_at DESC, slug ASC",
            ItemOrder::RecentlyPublished => {
                "published_at DESC NULLS LAST, created_at DESC, slug ASC"
            }
        }
    }

    pub(crate) fn compare(self, a: &ContentItem, b: &ContentItem) -> Ordering {
        let primary = match self {
            ItemOrder::RecentlyUpdated => b.updated_at.cmp(&a.updated_at),
            // `None` sorts last, matching NULLS LAST.
            ItemOrder::RecentlyPublished => match (a.published_at, b.published_at) {
                (Some(x), Some(y)) => y.cmp(&x),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        };
        primary
            .then_with(|| b.created_at.cmp(&a.created_at))
            .then_with(|| a.slug.cmp(&b.slug))
    }
}

/// Filter for [`ContentStore::query_items`].
#[derive(Debug, Clone, Copy)]
pub struct ItemQuery {
    pub content_type_id: Option<Uuid>,
    pub published_only: bool,
    pub public_only: bool,
    pub order: ItemOrder,
}

impl ItemQuery {
    pub(crate) fn matches(&self, item: &ContentItem) -> bool {
        self.content_type_id
            .map_or(true, |id| item.content_type_id == id)
            && (!self.published_only || item.is_published)
            && (!self.public_only || item.is_public)
    }
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Short backend name for health output ("postgres", "memory").
    fn backend(&self) -> &'static str;

    /// Round-trip check; returns the latency.
    async fn ping(&self) -> Result<Duration, StoreError>;

    async fn insert_content_type(&self, new: NewContentType) -> Result<ContentType, StoreError>;
    async fn list_content_types(&self, active_only: bool) -> Result<Vec<ContentType>, StoreError>;
    async fn find_content_type(&self, slug: &str) -> Result<Option<ContentType>, StoreError>;
    async fn find_content_type_by_id(&self, id: Uuid) -> Result<Option<ContentType>, StoreError>;
    async fn set_content_type_active(
        &self,
        slug: &str,
        is_active: bool,
    ) -> Result<Option<ContentType>, StoreError>;
    async fn count_items_by_type(&self) -> Result<HashMap<Uuid, i64>, StoreError>;

    /// Insert an item, stamping `published_at` when it is published.
    async fn insert_item(&self, new: NewContentItem) -> Result<ContentItem, StoreError>;
    async fn find_item(&self, slug: &str) -> Result<Option<ContentItem>, StoreError>;
    /// Apply a patch as a single write, including the publish transition.
    async fn update_item(
        &self,
        slug: &str,
        patch: &ContentItemPatch,
    ) -> Result<Option<ContentItem>, StoreError>;
    async fn delete_item(&self, slug: &str) -> Result<bool, StoreError>;
    async fn query_items(&self, query: ItemQuery) -> Result<Vec<ContentItem>, StoreError>;

    /// All links, ascending by `order`.
    async fn list_social_links(&self) -> Result<Vec<SocialLink>, StoreError>;
    /// Insert a link; a missing `order` becomes the current count plus one.
    async fn insert_social_link(&self, new: NewSocialLink) -> Result<SocialLink, StoreError>;
    async fn update_social_link(
        &self,
        id: &str,
        patch: &SocialLinkPatch,
    ) -> Result<Option<SocialLink>, StoreError>;
    async fn delete_social_link(&self, id: &str) -> Result<Option<SocialLink>, StoreError>;

    async fn get_setting(&self, key: &str) -> Result<Option<AdminSetting>, StoreError>;
    async fn list_settings(&self) -> Result<Vec<AdminSetting>, StoreError>;
    async fn put_setting(&self, key: &str, value: Value) -> Result<AdminSetting, StoreError>;
    /// Insert only when the key is absent; returns whether a row was written.
    async fn insert_setting_if_absent(&self, key: &str, value: Value) -> Result<bool, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, Utc};
    use serde_json::json;

    fn item(slug: &str, minutes_ago: i64, published: bool) -> ContentItem {
        let at = Utc::now() - ChronoDuration::minutes(minutes_ago);
        ContentItem {
            id: Uuid::new_v4(),
            content_type_id: Uuid::nil(),
            slug: slug.to_string(),
            title: slug.to_string(),
            data: json!({}),
            is_public: true,
            is_published: published,
            meta_title: None,
            meta_description: None,
            published_at: published.then_some(at),
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_recently_published_puts_unpublished_last() {
        let mut items = vec![item("draft", 0, false), item("old", 30, true), item("new", 5, true)];
        items.sort_by(|a, b| ItemOrder::RecentlyPublished.compare(a, b));
        let slugs: Vec<&str> = items.iter().map(|i| i.slug.as_str()).collect();
        assert_eq!(slugs, vec!["new", "old", "draft"]);
    }

    #[test]
    fn test_recently_updated_ties_break_on_created_at() {
        let mut a = item("a", 60, false);
        let b = item("b", 10, false);
        a.updated_at = b.updated_at;
        let mut items = vec![a, b];
        items.sort_by(|x, y| ItemOrder::RecentlyUpdated.compare(x, y));
        assert_eq!(items[0].slug, "b");
    }

    #[test]
    fn test_query_matches() {
        let mut private = item("private", 1, true);
        private.is_public = false;
        let feed = ItemQuery {
            content_type_id: None,
            published_only: true,
            public_only: true,
            order: ItemOrder::RecentlyPublished,
        };
        assert!(!feed.matches(&private));
        assert!(feed.matches(&item("public", 1, true)));
        assert!(!feed.matches(&item("draft", 1, false)));
    }
}

//! In-process store for development without a database and for tests.
//!
//! Every write takes the single write lock, so the uniqueness checks and the
//! inserts they guard happen in one critical section.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ContentStore, ItemQuery, StoreError};
use crate::content::{ContentItem, ContentItemPatch, ContentType, NewContentItem, NewContentType};
use crate::settings::AdminSetting;
use crate::social::{NewSocialLink, SocialLink, SocialLinkPatch};

#[derive(Default)]
struct Tables {
    content_types: HashMap<String, ContentType>,
    items: HashMap<String, ContentItem>,
    social_links: HashMap<String, SocialLink>,
    settings: BTreeMap<String, AdminSetting>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<Duration, StoreError> {
        let start = Instant::now();
        let _tables = self.tables.read().await;
        Ok(start.elapsed())
    }

    async fn insert_content_type(&self, new: NewContentType) -> Result<ContentType, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.content_types.contains_key(&new.slug) {
            return Err(StoreError::UniqueViolation("content_types_slug_key".to_string()));
        }

        let now = Utc::now();
        let content_type = ContentType {
            id: Uuid::new_v4(),
            slug: new.slug,
            name: new.name,
            icon: new.icon,
            schema: new.schema,
            layout_component: new.layout_component,
            admin_form_config: new.admin_form_config,
            is_active: new.is_active,
            created_at: now,
            updated_at: now,
        };
        tables
            .content_types
            .insert(content_type.slug.clone(), content_type.clone());
        Ok(content_type)
    }

    async fn list_content_types(&self, active_only: bool) -> Result<Vec<ContentType>, StoreError> {
        let tables = self.tables.read().await;
        let mut types: Vec<ContentType> = tables
            .content_types
            .values()
            .filter(|t| !active_only || t.is_active)
            .cloned()
            .collect();
        types.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.slug.cmp(&b.slug)));
        Ok(types)
    }

    async fn find_content_type(&self, slug: &str) -> Result<Option<ContentType>, StoreError> {
        Ok(self.tables.read().await.content_types.get(slug).cloned())
    }

    async fn find_content_type_by_id(&self, id: Uuid) -> Result<Option<ContentType>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.content_types.values().find(|t| t.id == id).cloned())
    }

    async fn set_content_type_active(
        &self,
        slug: &str,
        is_active: bool,
    ) -> Result<Option<ContentType>, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables.content_types.get_mut(slug).map(|t| {
            t.is_active = is_active;
            t.updated_at = Utc::now();
            t.clone()
        }))
    }

    async fn count_items_by_type(&self) -> Result<HashMap<Uuid, i64>, StoreError> {
        let tables = self.tables.read().await;
        let mut counts = HashMap::new();
        for item in tables.items.values() {
            *counts.entry(item.content_type_id).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn insert_item(&self, new: NewContentItem) -> Result<ContentItem, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables
            .content_types
            .values()
            .any(|t| t.id == new.content_type_id)
        {
            return Err(StoreError::ForeignKeyViolation(
                "content_items_content_type_id_fkey".to_string(),
            ));
        }
        if tables.items.contains_key(&new.slug) {
            return Err(StoreError::UniqueViolation("content_items_slug_key".to_string()));
        }

        let now = Utc::now();
        let item = ContentItem {
            id: Uuid::new_v4(),
            content_type_id: new.content_type_id,
            slug: new.slug,
            title: new.title,
            data: new.data,
            is_public: new.is_public,
            is_published: new.is_published,
            meta_title: new.meta_title,
            meta_description: new.meta_description,
            published_at: new.is_published.then_some(now),
            created_at: now,
            updated_at: now,
        };
        tables.items.insert(item.slug.clone(), item.clone());
        Ok(item)
    }

    async fn find_item(&self, slug: &str) -> Result<Option<ContentItem>, StoreError> {
        Ok(self.tables.read().await.items.get(slug).cloned())
    }

    async fn update_item(
        &self,
        slug: &str,
        patch: &ContentItemPatch,
    ) -> Result<Option<ContentItem>, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables.items.get_mut(slug).map(|item| {
            patch.apply(item, Utc::now());
            item.clone()
        }))
    }

    async fn delete_item(&self, slug: &str) -> Result<bool, StoreError> {
        Ok(self.tables.write().await.items.remove(slug).is_some())
    }

    async fn query_items(&self, query: ItemQuery) -> Result<Vec<ContentItem>, StoreError> {
        let tables = self.tables.read().await;
        let mut items: Vec<ContentItem> = tables
            .items
            .values()
            .filter(|i| query.matches(i))
            .cloned()
            .collect();
        items.sort_by(|a, b| query.order.compare(a, b));
        Ok(items)
    }

    async fn list_social_links(&self) -> Result<Vec<SocialLink>, StoreError> {
        let tables = self.tables.read().await;
        let mut links: Vec<SocialLink> = tables.social_links.values().cloned().collect();
        links.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        Ok(links)
    }

    async fn insert_social_link(&self, new: NewSocialLink) -> Result<SocialLink, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.social_links.contains_key(&new.id) {
            return Err(StoreError::UniqueViolation("social_links_pkey".to_string()));
        }

        let order = match new.order {
            Some(order) => order,
            None => tables.social_links.len() as i32 + 1,
        };
        let now = Utc::now();
        let link = SocialLink {
            id: new.id,
            platform: new.platform,
            url: new.url,
            icon: new.icon,
            label: new.label,
            order,
            is_visible: new.is_visible,
            created_at: now,
            updated_at: now,
        };
        tables.social_links.insert(link.id.clone(), link.clone());
        Ok(link)
    }

    async fn update_social_link(
        &self,
        id: &str,
        patch: &SocialLinkPatch,
    ) -> Result<Option<SocialLink>, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables.social_links.get_mut(id).map(|link| {
            patch.apply(link, Utc::now());
            link.clone()
        }))
    }

    async fn delete_social_link(&self, id: &str) -> Result<Option<SocialLink>, StoreError> {
        Ok(self.tables.write().await.social_links.remove(id))
    }

    async fn get_setting(&self, key: &str) -> Result<Option<AdminSetting>, StoreError> {
        Ok(self.tables.read().await.settings.get(key).cloned())
    }

    async fn list_settings(&self) -> Result<Vec<AdminSetting>, StoreError> {
        Ok(self.tables.read().await.settings.values().cloned().collect())
    }

    async fn put_setting(&self, key: &str, value: Value) -> Result<AdminSetting, StoreError> {
        let setting = AdminSetting {
            key: key.to_string(),
            value,
            updated_at: Utc::now(),
        };
        self.tables
            .write()
            .await
            .settings
            .insert(key.to_string(), setting.clone());
        Ok(setting)
    }

    async fn insert_setting_if_absent(&self, key: &str, value: Value) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.settings.contains_key(key) {
            return Ok(false);
        }
        tables.settings.insert(
            key.to_string(),
            AdminSetting {
                key: key.to_string(),
                value,
                updated_at: Utc::now(),
            },
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{AdminFormConfig, ContentTypeSchema};
    use serde_json::json;
    use std::sync::Arc;

    fn new_type(slug: &str) -> NewContentType {
        NewContentType {
            slug: slug.to_string(),
            name: slug.to_string(),
            icon: "📄".to_string(),
            schema: ContentTypeSchema::default(),
            layout_component: "AboutLayout".to_string(),
            admin_form_config: AdminFormConfig::default(),
            is_active: true,
        }
    }

    fn new_item(type_id: Uuid, slug: &str) -> NewContentItem {
        NewContentItem {
            content_type_id: type_id,
            slug: slug.to_string(),
            title: slug.to_string(),
            data: json!({}),
            is_public: true,
            is_published: false,
            meta_title: None,
            meta_description: None,
        }
    }

    #[tokio::test]
    async fn test_item_requires_existing_type() {
        let store = MemoryStore::new();
        let err = store
            .insert_item(new_item(Uuid::new_v4(), "orphan"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ForeignKeyViolation(_)));
    }

    #[tokio::test]
    async fn test_concurrent_inserts_same_slug_one_wins() {
        let store = Arc::new(MemoryStore::new());
        let t = store.insert_content_type(new_type("work")).await.unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.insert_item(new_item(t.id, "project")).await })
            })
            .collect();

        let mut ok = 0;
        let mut dup = 0;
        for h in handles {
            match h.await.unwrap() {
                Ok(_) => ok += 1,
                Err(StoreError::UniqueViolation(_)) => dup += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!((ok, dup), (1, 7));
    }

    #[tokio::test]
    async fn test_counts_and_active_filter() {
        let store = MemoryStore::new();
        let about = store.insert_content_type(new_type("about")).await.unwrap();
        store.insert_content_type(new_type("work")).await.unwrap();
        store.insert_item(new_item(about.id, "a")).await.unwrap();
        store.insert_item(new_item(about.id, "b")).await.unwrap();

        let counts = store.count_items_by_type().await.unwrap();
        assert_eq!(counts.get(&about.id), Some(&2));

        store.set_content_type_active("work", false).await.unwrap();
        let active = store.list_content_types(true).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(store.list_content_types(false).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_insert_setting_if_absent_keeps_existing() {
        let store = MemoryStore::new();
        assert!(store.insert_setting_if_absent("k", json!(1)).await.unwrap());
        assert!(!store.insert_setting_if_absent("k", json!(2)).await.unwrap());
        assert_eq!(store.get_setting("k").await.unwrap().unwrap().value, json!(1));
    }
}

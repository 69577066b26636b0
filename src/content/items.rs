//! Content item operations.

use std::sync::Arc;

use super::model::{
    ContentItem, ContentItemPatch, ContentType, CreateItem, ItemWrite, NewContentItem,
    ResolvedItem,
};
use super::registry::ContentTypeRegistry;
use super::slug::{is_valid_slug, slugify};
use crate::error::{AppError, AppResult};
use crate::store::{ContentStore, ItemOrder, ItemQuery, StoreError};

const DUPLICATE_SLUG: &str = "Content item with this slug already exists";

#[derive(Clone)]
pub struct ItemService {
    store: Arc<dyn ContentStore>,
    registry: ContentTypeRegistry,
}

impl ItemService {
    pub fn new(store: Arc<dyn ContentStore>, registry: ContentTypeRegistry) -> Self {
        Self { store, registry }
    }

    /// Create an item under the type named by `contentTypeId`.
    pub async fn create(&self, input: CreateItem) -> AppResult<ItemWrite> {
        let mut missing = Vec::new();
        if input.content_type_id.is_none() {
            missing.push("contentTypeId");
        }
        missing.extend(missing_body_fields(&input));
        let (Some(type_id), true) = (input.content_type_id, missing.is_empty()) else {
            return Err(AppError::validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        };

        let content_type = self
            .store
            .find_content_type_by_id(type_id)
            .await?
            .ok_or_else(|| AppError::not_found("Content type"))?;

        self.insert(content_type, input).await
    }

    /// Create an item under the type with the given slug. Any
    /// `contentTypeId` in the body is ignored.
    pub async fn create_for_type(&self, type_slug: &str, input: CreateItem) -> AppResult<ItemWrite> {
        let missing = missing_body_fields(&input);
        if !missing.is_empty() {
            return Err(AppError::validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        let content_type = self.registry.get_by_slug(type_slug).await?;
        self.insert(content_type, input).await
    }

    async fn insert(&self, content_type: ContentType, input: CreateItem) -> AppResult<ItemWrite> {
        let title = input.title.unwrap_or_default().trim().to_string();
        let data = input.data.unwrap_or_default();

        let slug = match input.slug.filter(|s| !s.trim().is_empty()) {
            Some(slug) if is_valid_slug(&slug) => slug,
            Some(_) => {
                return Err(AppError::validation(
                    "Slug must contain only lowercase letters, numbers and single hyphens",
                ))
            }
            None => slugify(&title),
        };
        if slug.is_empty() {
            return Err(AppError::validation(
                "Title must contain at least one letter or number",
            ));
        }

        let warnings = self.registry.validate_data(&content_type, &data);

        let item = self
            .store
            .insert_item(NewContentItem {
                content_type_id: content_type.id,
                slug,
                title,
                data,
                is_public: input.is_public.unwrap_or(false),
                is_published: input.is_published.unwrap_or(false),
                meta_title: input.meta_title,
                meta_description: input.meta_description,
            })
            .await
            .map_err(|e| AppError::from_store(e, DUPLICATE_SLUG))?;

        tracing::info!(
            slug = %item.slug,
            content_type = %content_type.slug,
            published = item.is_published,
            "content item created"
        );

        Ok(ItemWrite {
            item: ResolvedItem { item, content_type },
            warnings,
        })
    }

    pub async fn get_by_slug(&self, slug: &str) -> AppResult<ResolvedItem> {
        let item = self
            .store
            .find_item(slug)
            .await?
            .ok_or_else(|| AppError::not_found("Content item"))?;
        self.resolve(item).await
    }

    /// Attach the owning content type.
    pub(crate) async fn resolve(&self, item: ContentItem) -> AppResult<ResolvedItem> {
        let content_type = self.type_of(&item).await?;
        Ok(ResolvedItem { item, content_type })
    }

    async fn type_of(&self, item: &ContentItem) -> AppResult<ContentType> {
        self.store
            .find_content_type_by_id(item.content_type_id)
            .await?
            .ok_or_else(|| {
                AppError::Storage(StoreError::Corrupt(format!(
                    "item '{}' references missing content type {}",
                    item.slug, item.content_type_id
                )))
            })
    }

    /// Apply a partial update. An empty patch returns the item untouched.
    pub async fn update(&self, slug: &str, patch: ContentItemPatch) -> AppResult<ItemWrite> {
        if patch.is_empty() {
            return Ok(ItemWrite {
                item: self.get_by_slug(slug).await?,
                warnings: Vec::new(),
            });
        }
        if patch.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(AppError::validation("Title cannot be empty"));
        }

        let item = self
            .store
            .update_item(slug, &patch)
            .await?
            .ok_or_else(|| AppError::not_found("Content item"))?;
        let resolved = self.resolve(item).await?;

        let warnings = match &patch.data {
            Some(data) => self.registry.validate_data(&resolved.content_type, data),
            None => Vec::new(),
        };

        tracing::info!(
            slug = %slug,
            published = resolved.item.is_published,
            "content item updated"
        );

        Ok(ItemWrite {
            item: resolved,
            warnings,
        })
    }

    pub async fn delete(&self, slug: &str) -> AppResult<()> {
        if !self.store.delete_item(slug).await? {
            return Err(AppError::not_found("Content item"));
        }
        tracing::info!(slug = %slug, "content item deleted");
        Ok(())
    }

    /// All items of a type, drafts included, most recently edited first.
    pub async fn list_by_type(&self, type_slug: &str) -> AppResult<Vec<ContentItem>> {
        let content_type = self.registry.get_by_slug(type_slug).await?;
        Ok(self
            .store
            .query_items(ItemQuery {
                content_type_id: Some(content_type.id),
                published_only: false,
                public_only: false,
                order: ItemOrder::RecentlyUpdated,
            })
            .await?)
    }
}

fn missing_body_fields(input: &CreateItem) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if input.title.as_deref().map_or(true, |t| t.trim().is_empty()) {
        missing.push("title");
    }
    if input.data.as_ref().map_or(true, |d| d.is_null()) {
        missing.push("data");
    }
    missing
}

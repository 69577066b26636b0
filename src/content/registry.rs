//! Content type registry.

use std::sync::Arc;

use serde_json::Value;

use super::builtin;
use super::model::{ContentType, ContentTypeWithCount, NewContentType, RegisterContentType};
use super::schema::SchemaWarning;
use super::slug::is_valid_slug;
use crate::error::{AppError, AppResult};
use crate::store::ContentStore;

const DEFAULT_ICON: &str = "📄";

#[derive(Clone)]
pub struct ContentTypeRegistry {
    store: Arc<dyn ContentStore>,
}

impl ContentTypeRegistry {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    pub async fn register(&self, input: RegisterContentType) -> AppResult<ContentType> {
        let name = input.name.filter(|s| !s.trim().is_empty());
        let slug = input.slug.filter(|s| !s.trim().is_empty());
        let layout = input.layout_component.filter(|s| !s.trim().is_empty());

        let (Some(name), Some(slug), Some(schema), Some(layout_component)) =
            (name, slug, input.schema, layout)
        else {
            return Err(AppError::validation(
                "Missing required fields: name, slug, schema, layoutComponent",
            ));
        };
        if !is_valid_slug(&slug) {
            return Err(AppError::validation(
                "Slug must contain only lowercase letters, numbers and single hyphens",
            ));
        }

        self.insert(NewContentType {
            slug,
            name,
            icon: input.icon.unwrap_or_else(|| DEFAULT_ICON.to_string()),
            schema,
            layout_component,
            admin_form_config: input.admin_form_config.unwrap_or_default(),
            is_active: input.is_active.unwrap_or(true),
        })
        .await
    }

    async fn insert(&self, new: NewContentType) -> AppResult<ContentType> {
        let content_type = self
            .store
            .insert_content_type(new)
            .await
            .map_err(|e| AppError::from_store(e, "Content type with this slug already exists"))?;

        tracing::info!(
            slug = %content_type.slug,
            layout = %content_type.layout_component,
            "content type registered"
        );
        Ok(content_type)
    }

    pub async fn list(&self, active_only: bool) -> AppResult<Vec<ContentType>> {
        Ok(self.store.list_content_types(active_only).await?)
    }

    pub async fn list_with_counts(&self, active_only: bool) -> AppResult<Vec<ContentTypeWithCount>> {
        let types = self.store.list_content_types(active_only).await?;
        let counts = self.store.count_items_by_type().await?;

        Ok(types
            .into_iter()
            .map(|content_type| ContentTypeWithCount {
                item_count: counts.get(&content_type.id).copied().unwrap_or(0),
                content_type,
            })
            .collect())
    }

    pub async fn get_by_slug(&self, slug: &str) -> AppResult<ContentType> {
        self.store
            .find_content_type(slug)
            .await?
            .ok_or_else(|| AppError::not_found("Content type"))
    }

    pub async fn set_active(&self, slug: &str, is_active: bool) -> AppResult<ContentType> {
        let content_type = self
            .store
            .set_content_type_active(slug, is_active)
            .await?
            .ok_or_else(|| AppError::not_found("Content type"))?;

        tracing::info!(slug = %slug, is_active, "content type toggled");
        Ok(content_type)
    }

    /// Register any built-in type whose slug is not taken yet. Returns how
    /// many were added.
    pub async fn seed_builtin(&self) -> AppResult<usize> {
        let mut added = 0;
        for def in builtin::definitions() {
            let slug = def.slug.clone();
            match self.insert(def).await {
                Ok(_) => added += 1,
                Err(AppError::DuplicateSlug(_)) => {
                    tracing::debug!(slug = %slug, "built-in content type already present");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(added)
    }

    /// Advisory check of `data` against the type's schema.
    pub fn validate_data(&self, content_type: &ContentType, data: &Value) -> Vec<SchemaWarning> {
        let warnings = content_type.schema.check(data);
        if !warnings.is_empty() {
            tracing::warn!(
                content_type = %content_type.slug,
                count = warnings.len(),
                "payload does not match schema"
            );
        }
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::schema::ContentTypeSchema;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn registry() -> ContentTypeRegistry {
        ContentTypeRegistry::new(Arc::new(MemoryStore::new()))
    }

    fn gallery() -> RegisterContentType {
        RegisterContentType {
            name: Some("Gallery".to_string()),
            slug: Some("gallery".to_string()),
            schema: Some(ContentTypeSchema::default()),
            layout_component: Some("GalleryLayout".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_register_and_get() {
        let reg = registry();
        let t = reg.register(gallery()).await.unwrap();
        assert_eq!(t.icon, DEFAULT_ICON);
        assert!(t.is_active);
        assert_eq!(reg.get_by_slug("gallery").await.unwrap().id, t.id);
    }

    #[tokio::test]
    async fn test_register_requires_fields_and_valid_slug() {
        let reg = registry();
        let mut missing = gallery();
        missing.schema = None;
        assert!(matches!(
            reg.register(missing).await.unwrap_err(),
            AppError::Validation(_)
        ));

        let mut bad = gallery();
        bad.slug = Some("My Gallery".to_string());
        assert!(matches!(
            reg.register(bad).await.unwrap_err(),
            AppError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_slug() {
        let reg = registry();
        reg.register(gallery()).await.unwrap();
        let err = reg.register(gallery()).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateSlug(_)));
    }

    #[tokio::test]
    async fn test_seed_builtin_is_idempotent() {
        let reg = registry();
        assert_eq!(reg.seed_builtin().await.unwrap(), 5);
        assert_eq!(reg.seed_builtin().await.unwrap(), 0);

        let names: Vec<String> = reg.list(true).await.unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec!["About Me", "Mindset", "My Work", "Skills", "Sports/Events"]
        );
    }

    #[tokio::test]
    async fn test_set_active_hides_from_active_list() {
        let reg = registry();
        reg.seed_builtin().await.unwrap();
        let t = reg.set_active("sports", false).await.unwrap();
        assert!(!t.is_active);

        let counts = reg.list_with_counts(true).await.unwrap();
        assert_eq!(counts.len(), 4);
        assert!(counts.iter().all(|c| c.item_count == 0));
        assert_eq!(reg.list(false).await.unwrap().len(), 5);

        assert!(matches!(
            reg.set_active("nope", true).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_validate_data_is_advisory() {
        let reg = registry();
        reg.seed_builtin().await.unwrap();
        let about = reg.get_by_slug("about").await.unwrap();
        let warnings = reg.validate_data(&about, &json!({ "title": "About" }));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field, "content");
    }
}

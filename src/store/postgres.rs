//! PostgreSQL store.
//!
//! Constraint failures are recognised from the database error and mapped to
//! [`StoreError::UniqueViolation`] / [`StoreError::ForeignKeyViolation`].

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::{ContentStore, ItemQuery, StoreError};
use crate::content::{ContentItem, ContentItemPatch, ContentType, NewContentItem, NewContentType};
use crate::db::models::{AdminSettingRow, ContentItemRow, ContentTypeRow, SocialLinkRow};
use crate::settings::AdminSetting;
use crate::social::{NewSocialLink, SocialLink, SocialLinkPatch};

const TYPE_COLUMNS: &str = "id, slug, name, icon, schema, layout_component, admin_form_config, \
     is_active, created_at, updated_at";

const ITEM_COLUMNS: &str = "id, content_type_id, slug, title, data, is_public, is_published, \
     meta_title, meta_description, published_at, created_at, updated_at";

const LINK_COLUMNS: &str =
    "id, platform, url, icon, label, sort_order, is_visible, created_at, updated_at";

fn classify(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        let constraint = db_err.constraint().unwrap_or_default().to_string();
        if db_err.is_unique_violation() {
            return StoreError::UniqueViolation(constraint);
        }
        if db_err.is_foreign_key_violation() {
            return StoreError::ForeignKeyViolation(constraint);
        }
    }
    StoreError::Database(err)
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentStore for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<Duration, StoreError> {
        let start = Instant::now();
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(start.elapsed())
    }

    async fn insert_content_type(&self, new: NewContentType) -> Result<ContentType, StoreError> {
        let schema = serde_json::to_value(&new.schema)
            .map_err(|e| StoreError::Corrupt(format!("schema: {}", e)))?;
        let form = serde_json::to_value(&new.admin_form_config)
            .map_err(|e| StoreError::Corrupt(format!("form config: {}", e)))?;

        let row = sqlx::query_as::<_, ContentTypeRow>(&format!(
            r#"
            INSERT INTO content_types
                (slug, name, icon, schema, layout_component, admin_form_config, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {TYPE_COLUMNS}
            "#
        ))
        .bind(&new.slug)
        .bind(&new.name)
        .bind(&new.icon)
        .bind(schema)
        .bind(&new.layout_component)
        .bind(form)
        .bind(new.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)?;

        row.try_into()
    }

    async fn list_content_types(&self, active_only: bool) -> Result<Vec<ContentType>, StoreError> {
        let rows = sqlx::query_as::<_, ContentTypeRow>(&format!(
            "SELECT {TYPE_COLUMNS} FROM content_types \
             WHERE (NOT $1 OR is_active) ORDER BY name ASC, slug ASC"
        ))
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ContentType::try_from).collect()
    }

    async fn find_content_type(&self, slug: &str) -> Result<Option<ContentType>, StoreError> {
        let row = sqlx::query_as::<_, ContentTypeRow>(&format!(
            "SELECT {TYPE_COLUMNS} FROM content_types WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ContentType::try_from).transpose()
    }

    async fn find_content_type_by_id(&self, id: Uuid) -> Result<Option<ContentType>, StoreError> {
        let row = sqlx::query_as::<_, ContentTypeRow>(&format!(
            "SELECT {TYPE_COLUMNS} FROM content_types WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ContentType::try_from).transpose()
    }

    async fn set_content_type_active(
        &self,
        slug: &str,
        is_active: bool,
    ) -> Result<Option<ContentType>, StoreError> {
        let row = sqlx::query_as::<_, ContentTypeRow>(&format!(
            "UPDATE content_types SET is_active = $2, updated_at = now() \
             WHERE slug = $1 RETURNING {TYPE_COLUMNS}"
        ))
        .bind(slug)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ContentType::try_from).transpose()
    }

    async fn count_items_by_type(&self) -> Result<HashMap<Uuid, i64>, StoreError> {
        let rows: Vec<(Uuid, i64)> = sqlx::query_as(
            "SELECT content_type_id, COUNT(*) FROM content_items GROUP BY content_type_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }

    async fn insert_item(&self, new: NewContentItem) -> Result<ContentItem, StoreError> {
        let row = sqlx::query_as::<_, ContentItemRow>(&format!(
            r#"
            INSERT INTO content_items
                (content_type_id, slug, title, data, is_public, is_published,
                 meta_title, meta_description, published_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, CASE WHEN $6 THEN now() ELSE NULL END)
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(new.content_type_id)
        .bind(&new.slug)
        .bind(&new.title)
        .bind(Json(&new.data))
        .bind(new.is_public)
        .bind(new.is_published)
        .bind(&new.meta_title)
        .bind(&new.meta_description)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)?;

        Ok(row.into())
    }

    async fn find_item(&self, slug: &str) -> Result<Option<ContentItem>, StoreError> {
        let row = sqlx::query_as::<_, ContentItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM content_items WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn update_item(
        &self,
        slug: &str,
        patch: &ContentItemPatch,
    ) -> Result<Option<ContentItem>, StoreError> {
        // Right-hand sides see the pre-update row, so the CASE on
        // `is_published` reads the old flag.
        let row = sqlx::query_as::<_, ContentItemRow>(&format!(
            r#"
            UPDATE content_items SET
                title = COALESCE($2, title),
                data = COALESCE($3, data),
                is_public = COALESCE($4, is_public),
                published_at = CASE
                    WHEN $5::boolean IS NULL THEN published_at
                    WHEN $5 AND NOT is_published THEN now()
                    WHEN $5 THEN published_at
                    ELSE NULL
                END,
                is_published = COALESCE($5, is_published),
                meta_title = CASE WHEN $6 THEN $7 ELSE meta_title END,
                meta_description = CASE WHEN $8 THEN $9 ELSE meta_description END,
                updated_at = now()
            WHERE slug = $1
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(slug)
        .bind(patch.title.as_deref())
        .bind(patch.data.as_ref().map(Json))
        .bind(patch.is_public)
        .bind(patch.is_published)
        .bind(patch.meta_title.is_some())
        .bind(patch.meta_title.clone().flatten())
        .bind(patch.meta_description.is_some())
        .bind(patch.meta_description.clone().flatten())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn delete_item(&self, slug: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM content_items WHERE slug = $1")
            .bind(slug)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn query_items(&self, query: ItemQuery) -> Result<Vec<ContentItem>, StoreError> {
        let rows = sqlx::query_as::<_, ContentItemRow>(&format!(
            r#"
            SELECT {ITEM_COLUMNS} FROM content_items
            WHERE ($1::uuid IS NULL OR content_type_id = $1)
              AND (NOT $2 OR is_published)
              AND (NOT $3 OR is_public)
            ORDER BY {}
            "#,
            query.order.sql()
        ))
        .bind(query.content_type_id)
        .bind(query.published_only)
        .bind(query.public_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_social_links(&self) -> Result<Vec<SocialLink>, StoreError> {
        let rows = sqlx::query_as::<_, SocialLinkRow>(&format!(
            "SELECT {LINK_COLUMNS} FROM social_links ORDER BY sort_order ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert_social_link(&self, new: NewSocialLink) -> Result<SocialLink, StoreError> {
        let row = sqlx::query_as::<_, SocialLinkRow>(&format!(
            r#"
            INSERT INTO social_links (id, platform, url, icon, label, sort_order, is_visible)
            SELECT $1, $2, $3, $4, $5,
                   COALESCE($6, (SELECT COUNT(*)::int + 1 FROM social_links)), $7
            RETURNING {LINK_COLUMNS}
            "#
        ))
        .bind(&new.id)
        .bind(&new.platform)
        .bind(&new.url)
        .bind(&new.icon)
        .bind(&new.label)
        .bind(new.order)
        .bind(new.is_visible)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)?;

        Ok(row.into())
    }

    async fn update_social_link(
        &self,
        id: &str,
        patch: &SocialLinkPatch,
    ) -> Result<Option<SocialLink>, StoreError> {
        let row = sqlx::query_as::<_, SocialLinkRow>(&format!(
            r#"
            UPDATE social_links SET
                platform = COALESCE($2, platform),
                url = COALESCE($3, url),
                icon = COALESCE($4, icon),
                label = COALESCE($5, label),
                sort_order = COALESCE($6, sort_order),
                is_visible = COALESCE($7, is_visible),
                updated_at = now()
            WHERE id = $1
            RETURNING {LINK_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.platform.as_deref())
        .bind(patch.url.as_deref())
        .bind(patch.icon.as_deref())
        .bind(patch.label.as_deref())
        .bind(patch.order)
        .bind(patch.is_visible)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn delete_social_link(&self, id: &str) -> Result<Option<SocialLink>, StoreError> {
        let row = sqlx::query_as::<_, SocialLinkRow>(&format!(
            "DELETE FROM social_links WHERE id = $1 RETURNING {LINK_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn get_setting(&self, key: &str) -> Result<Option<AdminSetting>, StoreError> {
        let row = sqlx::query_as::<_, AdminSettingRow>(
            "SELECT key, value, updated_at FROM admin_settings WHERE key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list_settings(&self) -> Result<Vec<AdminSetting>, StoreError> {
        let rows = sqlx::query_as::<_, AdminSettingRow>(
            "SELECT key, value, updated_at FROM admin_settings ORDER BY key ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn put_setting(&self, key: &str, value: Value) -> Result<AdminSetting, StoreError> {
        let row = sqlx::query_as::<_, AdminSettingRow>(
            r#"
            INSERT INTO admin_settings (key, value, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = now()
            RETURNING key, value, updated_at
            "#,
        )
        .bind(key)
        .bind(Json(value))
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn insert_setting_if_absent(&self, key: &str, value: Value) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "INSERT INTO admin_settings (key, value) VALUES ($1, $2) ON CONFLICT (key) DO NOTHING",
        )
        .bind(key)
        .bind(Json(value))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{AdminFormConfig, ContentTypeSchema};
    use crate::db::{init_pool, run_migrations, DbConfig};

    /// Connects to `TEST_DATABASE_URL`; tests are skipped when it is unset.
    async fn test_store() -> Option<PgStore> {
        let url = std::env::var("TEST_DATABASE_URL").ok()?;
        let pool = init_pool(&DbConfig::from_env(url)).await.unwrap();

        // Concurrent CREATE TABLE IF NOT EXISTS can still collide.
        let mut lock = pool.acquire().await.unwrap();
        sqlx::query("SELECT pg_advisory_lock(7301)")
            .execute(&mut *lock)
            .await
            .unwrap();
        run_migrations(&pool).await.unwrap();
        sqlx::query("SELECT pg_advisory_unlock(7301)")
            .execute(&mut *lock)
            .await
            .unwrap();

        Some(PgStore::new(pool))
    }

    fn unique(prefix: &str) -> String {
        format!("{}-{}", prefix, Uuid::new_v4().simple())
    }

    async fn scratch_type(store: &PgStore) -> ContentType {
        store
            .insert_content_type(NewContentType {
                slug: unique("scratch"),
                name: "Scratch".to_string(),
                icon: "📄".to_string(),
                schema: ContentTypeSchema::default(),
                layout_component: "AboutLayout".to_string(),
                admin_form_config: AdminFormConfig::default(),
                is_active: true,
            })
            .await
            .unwrap()
    }

    fn new_item(content_type_id: Uuid, slug: &str, is_published: bool) -> NewContentItem {
        NewContentItem {
            content_type_id,
            slug: slug.to_string(),
            title: "Scratch".to_string(),
            data: serde_json::json!({ "title": "Scratch" }),
            is_public: true,
            is_published,
            meta_title: None,
            meta_description: None,
        }
    }

    async fn drop_type(store: &PgStore, content_type: &ContentType) {
        sqlx::query("DELETE FROM content_items WHERE content_type_id = $1")
            .bind(content_type.id)
            .execute(&store.pool)
            .await
            .unwrap();
        sqlx::query("DELETE FROM content_types WHERE id = $1")
            .bind(content_type.id)
            .execute(&store.pool)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_publish_timestamp_transitions() {
        let Some(store) = test_store().await else {
            return;
        };
        let content_type = scratch_type(&store).await;
        let slug = unique("item");

        let item = store
            .insert_item(new_item(content_type.id, &slug, true))
            .await
            .unwrap();
        let first = item.published_at.unwrap();

        let publish = ContentItemPatch {
            is_published: Some(true),
            ..Default::default()
        };
        let again = store.update_item(&slug, &publish).await.unwrap().unwrap();
        assert_eq!(again.published_at, Some(first));

        let retitle = ContentItemPatch {
            title: Some("Renamed".to_string()),
            ..Default::default()
        };
        let renamed = store.update_item(&slug, &retitle).await.unwrap().unwrap();
        assert_eq!(renamed.published_at, Some(first));
        assert!(renamed.is_published);

        let unpublish = ContentItemPatch {
            is_published: Some(false),
            ..Default::default()
        };
        let hidden = store.update_item(&slug, &unpublish).await.unwrap().unwrap();
        assert!(!hidden.is_published);
        assert!(hidden.published_at.is_none());

        let republished = store.update_item(&slug, &publish).await.unwrap().unwrap();
        assert!(republished.published_at.is_some());

        drop_type(&store, &content_type).await;
    }

    #[tokio::test]
    async fn test_constraint_errors_are_classified() {
        let Some(store) = test_store().await else {
            return;
        };
        let content_type = scratch_type(&store).await;
        let slug = unique("item");

        store
            .insert_item(new_item(content_type.id, &slug, false))
            .await
            .unwrap();
        let duplicate = store.insert_item(new_item(content_type.id, &slug, false)).await;
        assert!(matches!(duplicate, Err(StoreError::UniqueViolation(_))));

        let orphan = store
            .insert_item(new_item(Uuid::new_v4(), &unique("orphan"), false))
            .await;
        assert!(matches!(orphan, Err(StoreError::ForeignKeyViolation(_))));

        drop_type(&store, &content_type).await;
    }

    #[tokio::test]
    async fn test_social_link_order_defaults_to_count_plus_one() {
        let Some(store) = test_store().await else {
            return;
        };
        let before = store.list_social_links().await.unwrap().len() as i32;
        let id = unique("link");

        let link = store
            .insert_social_link(NewSocialLink {
                id: id.clone(),
                platform: "Scratch".to_string(),
                url: "https://example.com".to_string(),
                icon: "SiGlobe".to_string(),
                label: "Scratch".to_string(),
                order: None,
                is_visible: true,
            })
            .await
            .unwrap();
        assert_eq!(link.order, before + 1);

        store.delete_social_link(&id).await.unwrap();
    }
}

//! Database rows - structs mirroring the tables, converted into domain models.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::content::{AdminFormConfig, ContentItem, ContentType, ContentTypeSchema};
use crate::settings::AdminSetting;
use crate::social::SocialLink;
use crate::store::StoreError;

/// Content type row. `schema` and `admin_form_config` are JSONB.
#[derive(Debug, Clone, FromRow)]
pub struct ContentTypeRow {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub icon: String,
    pub schema: serde_json::Value,
    pub layout_component: String,
    pub admin_form_config: serde_json::Value,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ContentTypeRow> for ContentType {
    type Error = StoreError;

    fn try_from(row: ContentTypeRow) -> Result<Self, Self::Error> {
        let schema: ContentTypeSchema = serde_json::from_value(row.schema).map_err(|e| {
            StoreError::Corrupt(format!("content type '{}' schema: {}", row.slug, e))
        })?;
        let admin_form_config: AdminFormConfig = serde_json::from_value(row.admin_form_config)
            .map_err(|e| {
                StoreError::Corrupt(format!("content type '{}' form config: {}", row.slug, e))
            })?;

        Ok(ContentType {
            id: row.id,
            slug: row.slug,
            name: row.name,
            icon: row.icon,
            schema,
            layout_component: row.layout_component,
            admin_form_config,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ContentItemRow {
    pub id: Uuid,
    pub content_type_id: Uuid,
    pub slug: String,
    pub title: String,
    pub data: Json<serde_json::Value>,
    pub is_public: bool,
    pub is_published: bool,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ContentItemRow> for ContentItem {
    fn from(row: ContentItemRow) -> Self {
        ContentItem {
            id: row.id,
            content_type_id: row.content_type_id,
            slug: row.slug,
            title: row.title,
            data: row.data.0,
            is_public: row.is_public,
            is_published: row.is_published,
            meta_title: row.meta_title,
            meta_description: row.meta_description,
            published_at: row.published_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Social link row; `order` is stored as `sort_order`.
#[derive(Debug, Clone, FromRow)]
pub struct SocialLinkRow {
    pub id: String,
    pub platform: String,
    pub url: String,
    pub icon: String,
    pub label: String,
    pub sort_order: i32,
    pub is_visible: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SocialLinkRow> for SocialLink {
    fn from(row: SocialLinkRow) -> Self {
        SocialLink {
            id: row.id,
            platform: row.platform,
            url: row.url,
            icon: row.icon,
            label: row.label,
            order: row.sort_order,
            is_visible: row.is_visible,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct AdminSettingRow {
    pub key: String,
    pub value: Json<serde_json::Value>,
    pub updated_at: DateTime<Utc>,
}

impl From<AdminSettingRow> for AdminSetting {
    fn from(row: AdminSettingRow) -> Self {
        AdminSetting {
            key: row.key,
            value: row.value.0,
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn type_row(schema: serde_json::Value) -> ContentTypeRow {
        ContentTypeRow {
            id: Uuid::new_v4(),
            slug: "about".to_string(),
            name: "About".to_string(),
            icon: "👤".to_string(),
            schema,
            layout_component: "AboutLayout".to_string(),
            admin_form_config: json!({}),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_content_type_row_decodes_schema() {
        let row = type_row(json!({
            "fields": [{ "name": "title", "type": "text", "required": true, "label": "Title" }],
            "layout": { "sections": ["header"] }
        }));
        let t = ContentType::try_from(row).unwrap();
        assert!(t.schema.field("title").unwrap().required);
        assert!(t.admin_form_config.sections.is_empty());
    }

    #[test]
    fn test_content_type_row_with_bad_schema_is_corrupt() {
        let row = type_row(json!({ "fields": "nope" }));
        let err = ContentType::try_from(row).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(msg) if msg.contains("about")));
    }
}

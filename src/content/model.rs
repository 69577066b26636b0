//! Content types and content items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::schema::{AdminFormConfig, ContentTypeSchema, SchemaWarning};

/// A named, schema-bearing category of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentType {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub icon: String,
    pub schema: ContentTypeSchema,
    pub layout_component: String,
    pub admin_form_config: AdminFormConfig,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The fields of a content type the public feed exposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTypeSummary {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub icon: String,
    pub layout_component: String,
}

impl From<&ContentType> for ContentTypeSummary {
    fn from(t: &ContentType) -> Self {
        Self {
            id: t.id,
            name: t.name.clone(),
            slug: t.slug.clone(),
            icon: t.icon.clone(),
            layout_component: t.layout_component.clone(),
        }
    }
}

/// Validated content type ready for insertion.
#[derive(Debug, Clone)]
pub struct NewContentType {
    pub slug: String,
    pub name: String,
    pub icon: String,
    pub schema: ContentTypeSchema,
    pub layout_component: String,
    pub admin_form_config: AdminFormConfig,
    pub is_active: bool,
}

/// Request body for registering a content type.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterContentType {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub icon: Option<String>,
    pub schema: Option<ContentTypeSchema>,
    pub layout_component: Option<String>,
    pub admin_form_config: Option<AdminFormConfig>,
    pub is_active: Option<bool>,
}

/// Content type plus the number of items referencing it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTypeWithCount {
    #[serde(flatten)]
    pub content_type: ContentType,
    pub item_count: i64,
}

/// A stored piece of content.
///
/// `published_at` is `Some` exactly when `is_published` is true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: Uuid,
    pub content_type_id: Uuid,
    pub slug: String,
    pub title: String,
    pub data: Value,
    pub is_public: bool,
    pub is_published: bool,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContentItem {
    /// Shown on the aggregate feed.
    pub fn is_listed(&self) -> bool {
        self.is_public && self.is_published
    }

    /// Reachable at its direct URL.
    pub fn is_resolvable(&self) -> bool {
        self.is_published
    }
}

/// An item together with its owning content type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedItem {
    #[serde(flatten)]
    pub item: ContentItem,
    pub content_type: ContentType,
}

/// Result of a create or update: the stored item plus advisory schema
/// warnings for the editor.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemWrite {
    #[serde(flatten)]
    pub item: ResolvedItem,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<SchemaWarning>,
}

/// Item as handed to the store, slug already resolved.
#[derive(Debug, Clone)]
pub struct NewContentItem {
    pub content_type_id: Uuid,
    pub slug: String,
    pub title: String,
    pub data: Value,
    pub is_public: bool,
    pub is_published: bool,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
}

/// Request body for creating an item.
///
/// Every field is optional at the wire level so missing required fields
/// surface as validation errors rather than extractor rejections.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItem {
    pub content_type_id: Option<Uuid>,
    pub slug: Option<String>,
    pub title: Option<String>,
    pub data: Option<Value>,
    pub is_public: Option<bool>,
    pub is_published: Option<bool>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
}

/// Partial update. Absent fields are left untouched; `metaTitle` and
/// `metaDescription` can be cleared with an explicit `null`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub meta_title: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub meta_description: Option<Option<String>>,
}

impl ContentItemPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Apply the patch in place. `now` stamps a false -> true publish
    /// transition; a true -> false transition clears `published_at`.
    pub fn apply(&self, item: &mut ContentItem, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            item.title = title.clone();
        }
        if let Some(data) = &self.data {
            item.data = data.clone();
        }
        if let Some(is_public) = self.is_public {
            item.is_public = is_public;
        }
        if let Some(is_published) = self.is_published {
            match (item.is_published, is_published) {
                (false, true) => item.published_at = Some(now),
                (_, false) => item.published_at = None,
                (true, true) => {}
            }
            item.is_published = is_published;
        }
        if let Some(meta_title) = &self.meta_title {
            item.meta_title = meta_title.clone();
        }
        if let Some(meta_description) = &self.meta_description {
            item.meta_description = meta_description.clone();
        }
        item.updated_at = now;
    }
}

/// Distinguishes a missing field (`None`) from an explicit null (`Some(None)`).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

//! Ordered social links shown in the navigation dock.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::slug::platform_id;
use crate::error::{AppError, AppResult};
use crate::store::ContentStore;

pub const DEFAULT_ICON: &str = "SiGlobe";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLink {
    pub id: String,
    pub platform: String,
    pub url: String,
    pub icon: String,
    pub label: String,
    pub order: i32,
    pub is_visible: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Link as handed to the store. `order: None` means "append".
#[derive(Debug, Clone)]
pub struct NewSocialLink {
    pub id: String,
    pub platform: String,
    pub url: String,
    pub icon: String,
    pub label: String,
    pub order: Option<i32>,
    pub is_visible: bool,
}

/// Request body for creating a link.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSocialLink {
    pub id: Option<String>,
    pub platform: Option<String>,
    pub url: Option<String>,
    pub icon: Option<String>,
    pub label: Option<String>,
    pub order: Option<i32>,
    pub is_visible: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLinkPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_visible: Option<bool>,
}

impl SocialLinkPatch {
    pub fn apply(&self, link: &mut SocialLink, now: DateTime<Utc>) {
        if let Some(platform) = &self.platform {
            link.platform = platform.clone();
        }
        if let Some(url) = &self.url {
            link.url = url.clone();
        }
        if let Some(icon) = &self.icon {
            link.icon = icon.clone();
        }
        if let Some(label) = &self.label {
            link.label = label.clone();
        }
        if let Some(order) = self.order {
            link.order = order;
        }
        if let Some(is_visible) = self.is_visible {
            link.is_visible = is_visible;
        }
        link.updated_at = now;
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl CreateSocialLink {
    /// Fill in defaults: id from the platform name, `SiGlobe` icon, label
    /// equal to the platform.
    pub fn into_new(self) -> AppResult<NewSocialLink> {
        let (Some(platform), Some(url)) = (non_blank(self.platform), non_blank(self.url)) else {
            return Err(AppError::validation("Platform and URL are required"));
        };

        let id = match non_blank(self.id) {
            Some(id) => id,
            None => platform_id(&platform),
        };

        Ok(NewSocialLink {
            id,
            icon: non_blank(self.icon).unwrap_or_else(|| DEFAULT_ICON.to_string()),
            label: non_blank(self.label).unwrap_or_else(|| platform.clone()),
            platform,
            url,
            order: self.order,
            is_visible: self.is_visible.unwrap_or(true),
        })
    }
}

#[derive(Clone)]
pub struct SocialLinkService {
    store: Arc<dyn ContentStore>,
}

impl SocialLinkService {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> AppResult<Vec<SocialLink>> {
        Ok(self.store.list_social_links().await?)
    }

    pub async fn list_visible(&self) -> AppResult<Vec<SocialLink>> {
        let mut links = self.store.list_social_links().await?;
        links.retain(|l| l.is_visible);
        Ok(links)
    }

    pub async fn create(&self, input: CreateSocialLink) -> AppResult<SocialLink> {
        let new = input.into_new()?;
        let link = self
            .store
            .insert_social_link(new)
            .await
            .map_err(|e| AppError::from_store(e, "Social link with this id already exists"))?;

        tracing::info!(id = %link.id, order = link.order, "social link created");
        Ok(link)
    }

    pub async fn update(&self, id: &str, patch: SocialLinkPatch) -> AppResult<SocialLink> {
        self.store
            .update_social_link(id, &patch)
            .await?
            .ok_or_else(|| AppError::not_found("Social link"))
    }

    pub async fn delete(&self, id: &str) -> AppResult<SocialLink> {
        let link = self
            .store
            .delete_social_link(id)
            .await?
            .ok_or_else(|| AppError::not_found("Social link"))?;

        tracing::info!(id = %link.id, "social link deleted");
        Ok(link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn service() -> SocialLinkService {
        SocialLinkService::new(Arc::new(MemoryStore::new()))
    }

    fn link(platform: &str, url: &str) -> CreateSocialLink {
        CreateSocialLink {
            platform: Some(platform.to_string()),
            url: Some(url.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let new = link("Stack Overflow", "https://stackoverflow.com/u/1")
            .into_new()
            .unwrap();
        assert_eq!(new.id, "stack-overflow");
        assert_eq!(new.icon, DEFAULT_ICON);
        assert_eq!(new.label, "Stack Overflow");
        assert_eq!(new.order, None);
        assert!(new.is_visible);
    }

    #[test]
    fn test_platform_and_url_required() {
        let err = CreateSocialLink {
            platform: Some("GitHub".to_string()),
            url: Some("   ".to_string()),
            ..Default::default()
        }
        .into_new()
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_order_defaults_to_count_plus_one() {
        let svc = service();
        svc.create(link("GitHub", "https://github.com/x")).await.unwrap();
        svc.create(link("LinkedIn", "https://linkedin.com/in/x"))
            .await
            .unwrap();

        let third = svc.create(link("Mastodon", "https://mastodon.social/@x")).await.unwrap();
        assert_eq!(third.order, 3);

        let orders: Vec<i32> = svc.list().await.unwrap().iter().map(|l| l.order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_list_is_ascending_with_gaps() {
        let svc = service();
        let mut late = link("Twitter", "https://twitter.com/x");
        late.order = Some(10);
        svc.create(late).await.unwrap();
        let mut early = link("GitHub", "https://github.com/x");
        early.order = Some(2);
        svc.create(early).await.unwrap();

        let ids: Vec<String> = svc.list().await.unwrap().into_iter().map(|l| l.id).collect();
        assert_eq!(ids, vec!["github", "twitter"]);
    }

    #[tokio::test]
    async fn test_duplicate_id_is_rejected() {
        let svc = service();
        svc.create(link("GitHub", "https://github.com/a")).await.unwrap();
        let err = svc
            .create(link("github", "https://github.com/b"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateSlug(_)));
        assert_eq!(svc.list().await.unwrap()[0].url, "https://github.com/a");
    }

    #[tokio::test]
    async fn test_hidden_links_are_not_visible() {
        let svc = service();
        svc.create(link("GitHub", "https://github.com/x")).await.unwrap();
        svc.update(
            "github",
            SocialLinkPatch {
                is_visible: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert!(svc.list_visible().await.unwrap().is_empty());
        assert_eq!(svc.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing() {
        let svc = service();
        let err = svc
            .update("nope", SocialLinkPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(matches!(
            svc.delete("nope").await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }
}

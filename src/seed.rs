//! Startup seeding. Never overwrites existing rows.

use serde_json::json;

use crate::auth::hash_password;
use crate::config::DEV_ADMIN_PASSWORD;
use crate::error::{AppError, AppResult};
use crate::settings::{default_site_settings, ADMIN_PASSWORD_KEY, SITE_SETTINGS_KEY};
use crate::social::NewSocialLink;
use crate::state::AppState;
use crate::store::StoreError;

/// What a seeding run added.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub content_types: usize,
    pub social_links: usize,
    pub settings: usize,
}

fn default_social_links() -> Vec<NewSocialLink> {
    [
        ("github", "GitHub", "https://github.com/mattswildadventures", "SiGithub"),
        ("linkedin", "LinkedIn", "https://www.linkedin.com/in/khangnd", "FaLinkedinIn"),
        ("twitter", "Twitter", "https://twitter.com/_khangnd", "SiTwitter"),
        ("fandom", "Fandom", "https://dev.fandom.com/wiki/User:KhangND", "SiFandom"),
    ]
    .into_iter()
    .zip(1..)
    .map(|((id, platform, url, icon), order)| NewSocialLink {
        id: id.to_string(),
        platform: platform.to_string(),
        url: url.to_string(),
        icon: icon.to_string(),
        label: platform.to_string(),
        order: Some(order),
        is_visible: true,
    })
    .collect()
}

pub async fn seed_defaults(state: &AppState) -> AppResult<SeedReport> {
    let mut report = SeedReport {
        content_types: state.content_types().seed_builtin().await?,
        ..Default::default()
    };

    let store = state.store();
    for link in default_social_links() {
        let id = link.id.clone();
        match store.insert_social_link(link).await {
            Ok(_) => report.social_links += 1,
            Err(StoreError::UniqueViolation(_)) => {
                tracing::debug!(id = %id, "social link already present");
            }
            Err(e) => return Err(AppError::Storage(e)),
        }
    }

    if store.get_setting(ADMIN_PASSWORD_KEY).await?.is_none() {
        let password = match &state.config().admin_password {
            Some(p) => p.clone(),
            None => {
                tracing::warn!(
                    "ADMIN_PASSWORD not set, seeding the development default password"
                );
                DEV_ADMIN_PASSWORD.to_string()
            }
        };
        let hash = hash_password(password, state.sessions().bcrypt_cost()).await?;
        if store
            .insert_setting_if_absent(ADMIN_PASSWORD_KEY, json!({ "hash": hash }))
            .await?
        {
            report.settings += 1;
        }
    }

    if store
        .insert_setting_if_absent(SITE_SETTINGS_KEY, default_site_settings())
        .await?
    {
        report.settings += 1;
    }

    tracing::info!(
        content_types = report.content_types,
        social_links = report.social_links,
        settings = report.settings,
        "seeding complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_state;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let state = test_state();
        let first = seed_defaults(&state).await.unwrap();
        assert_eq!(
            first,
            SeedReport {
                content_types: 5,
                social_links: 4,
                settings: 2
            }
        );

        let second = seed_defaults(&state).await.unwrap();
        assert_eq!(second, SeedReport::default());
    }

    #[tokio::test]
    async fn test_seeded_links_and_settings() {
        let state = test_state();
        seed_defaults(&state).await.unwrap();

        let links = state.social().list().await.unwrap();
        let ids: Vec<&str> = links.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["github", "linkedin", "twitter", "fandom"]);
        assert_eq!(links[1].icon, "FaLinkedinIn");

        let site = state.settings().get(SITE_SETTINGS_KEY).await.unwrap();
        assert_eq!(site.value["theme"], "flat");
        assert!(state.settings().password_hash().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_seeded_password_logs_in() {
        let state = test_state();
        seed_defaults(&state).await.unwrap();
        assert!(state
            .sessions()
            .login(Some(DEV_ADMIN_PASSWORD.to_string()))
            .await
            .is_ok());
    }
}

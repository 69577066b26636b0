//! Key/value admin settings.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::store::ContentStore;

/// Holds `{"hash": "<bcrypt>"}`. Only readable through the session service.
pub const ADMIN_PASSWORD_KEY: &str = "admin_password";
pub const SITE_SETTINGS_KEY: &str = "site_settings";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSetting {
    pub key: String,
    pub value: Value,
    pub updated_at: DateTime<Utc>,
}

pub fn default_site_settings() -> Value {
    json!({
        "title": "Portfolio",
        "description": "Personal portfolio website",
        "theme": "flat"
    })
}

#[derive(Clone)]
pub struct SettingsService {
    store: Arc<dyn ContentStore>,
}

impl SettingsService {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> AppResult<Vec<AdminSetting>> {
        let mut settings = self.store.list_settings().await?;
        settings.retain(|s| s.key != ADMIN_PASSWORD_KEY);
        Ok(settings)
    }

    pub async fn get(&self, key: &str) -> AppResult<AdminSetting> {
        if key == ADMIN_PASSWORD_KEY {
            return Err(AppError::not_found("Setting"));
        }
        self.store
            .get_setting(key)
            .await?
            .ok_or_else(|| AppError::not_found("Setting"))
    }

    pub async fn put(&self, key: &str, value: Value) -> AppResult<AdminSetting> {
        if key == ADMIN_PASSWORD_KEY {
            return Err(AppError::validation(
                "Use the password endpoint to change the admin password",
            ));
        }
        if key.trim().is_empty() {
            return Err(AppError::validation("Setting key is required"));
        }

        let setting = self.store.put_setting(key, value).await?;
        tracing::info!(key = %key, "setting updated");
        Ok(setting)
    }

    pub(crate) async fn password_hash(&self) -> AppResult<Option<String>> {
        let Some(setting) = self.store.get_setting(ADMIN_PASSWORD_KEY).await? else {
            return Ok(None);
        };
        Ok(setting
            .value
            .get("hash")
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    pub(crate) async fn store_password_hash(&self, hash: String) -> AppResult<()> {
        self.store
            .put_setting(ADMIN_PASSWORD_KEY, json!({ "hash": hash }))
            .await?;
        Ok(())
    }
}

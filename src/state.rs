//! Application state shared across all handlers.

use std::sync::Arc;
use std::time::Instant;

use crate::auth::SessionService;
use crate::config::AppConfig;
use crate::content::{ContentTypeRegistry, ItemService, LayoutDispatcher, VisibilityResolver};
use crate::settings::SettingsService;
use crate::social::SocialLinkService;
use crate::store::ContentStore;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    store: Arc<dyn ContentStore>,
    content_types: ContentTypeRegistry,
    items: ItemService,
    visibility: VisibilityResolver,
    layouts: LayoutDispatcher,
    social: SocialLinkService,
    settings: SettingsService,
    sessions: SessionService,
    started_at: Instant,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn ContentStore>) -> Self {
        let settings = SettingsService::new(store.clone());
        let sessions = SessionService::new(
            &config.session_secret,
            config.session_ttl_hours,
            config.is_production(),
            settings.clone(),
        );
        Self::with_sessions(config, store, settings, sessions)
    }

    pub(crate) fn with_sessions(
        config: AppConfig,
        store: Arc<dyn ContentStore>,
        settings: SettingsService,
        sessions: SessionService,
    ) -> Self {
        let content_types = ContentTypeRegistry::new(store.clone());
        let items = ItemService::new(store.clone(), content_types.clone());
        let visibility = VisibilityResolver::new(store.clone(), items.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                social: SocialLinkService::new(store.clone()),
                store,
                content_types,
                items,
                visibility,
                layouts: LayoutDispatcher::with_builtin(),
                settings,
                sessions,
                started_at: Instant::now(),
            }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<dyn ContentStore> {
        &self.inner.store
    }

    pub fn content_types(&self) -> &ContentTypeRegistry {
        &self.inner.content_types
    }

    pub fn items(&self) -> &ItemService {
        &self.inner.items
    }

    pub fn visibility(&self) -> &VisibilityResolver {
        &self.inner.visibility
    }

    pub fn layouts(&self) -> &LayoutDispatcher {
        &self.inner.layouts
    }

    pub fn social(&self) -> &SocialLinkService {
        &self.inner.social
    }

    pub fn settings(&self) -> &SettingsService {
        &self.inner.settings
    }

    pub fn sessions(&self) -> &SessionService {
        &self.inner.sessions
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.inner.started_at.elapsed().as_secs()
    }
}

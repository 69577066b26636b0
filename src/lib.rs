//! Portfolio CMS - library for app logic and testing

pub mod auth;
pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod logging;
pub mod routes;
pub mod seed;
pub mod settings;
pub mod social;
pub mod state;
pub mod store;

#[cfg(test)]
mod test_support;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::db::DbConfig;
use crate::state::AppState;
use crate::store::{ContentStore, MemoryStore, PgStore};

/// Request bodies above 2 MB are rejected.
const BODY_LIMIT: usize = 2 * 1024 * 1024;

/// CORS for the configured frontend origins. Credentials are allowed so the
/// admin session cookie reaches the API.
pub fn configure_cors(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// Create and configure the application router.
pub fn create_app(state: AppState) -> Router {
    let cors = configure_cors(state.config());

    let public = Router::new()
        .route("/api/content", get(routes::public::get_content))
        .route("/api/content/home", get(routes::public::get_home))
        .route("/api/pages/{slug}", get(routes::public::get_page))
        .route("/api/social", get(routes::public::get_social));

    let admin = Router::new()
        .route("/api/admin/login", post(routes::auth::login))
        .route("/api/admin/logout", post(routes::auth::logout))
        .route("/api/admin/session", get(routes::auth::session_status))
        .route("/api/admin/password", put(routes::auth::change_password))
        .route(
            "/api/admin/content-types",
            get(routes::content_types::list_content_types)
                .post(routes::content_types::create_content_type),
        )
        .route(
            "/api/admin/content-types/{slug}",
            patch(routes::content_types::toggle_content_type),
        )
        .route(
            "/api/admin/content-types/{slug}/items",
            get(routes::content_types::list_type_items)
                .post(routes::content_types::create_type_item),
        )
        .route("/api/admin/content", post(routes::content_items::create_item))
        .route(
            "/api/admin/content/{slug}",
            get(routes::content_items::get_item)
                .put(routes::content_items::update_item)
                .delete(routes::content_items::delete_item),
        )
        .route(
            "/api/admin/social",
            get(routes::social::list_links).post(routes::social::create_link),
        )
        .route(
            "/api/admin/social/{id}",
            put(routes::social::update_link).delete(routes::social::delete_link),
        )
        .route("/api/admin/settings", get(routes::settings::list_settings))
        .route(
            "/api/admin/settings/{key}",
            get(routes::settings::get_setting).put(routes::settings::put_setting),
        );

    let health = Router::new()
        .route("/health", get(routes::health::health_ping))
        .route("/health/detailed", get(routes::health::health_detailed))
        .route("/health/database", get(routes::health::health_database))
        .route("/health/ready", get(routes::health::health_ready));

    Router::new()
        .merge(public)
        .merge(admin)
        .merge(health)
        .with_state(state)
        .layer(logging::middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(logging::middleware::log_request))
        .layer(logging::middleware::request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .layer(cors)
}

/// Postgres when `DATABASE_URL` is set, otherwise the in-process store.
async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn ContentStore>> {
    let Some(url) = &config.database_url else {
        tracing::warn!("DATABASE_URL not set. Content is kept in memory and lost on restart.");
        return Ok(Arc::new(MemoryStore::new()));
    };

    let db_config = DbConfig::from_env(url.clone());
    let pool = db::init_pool(&db_config)
        .await
        .context("failed to connect to the database")?;
    db::run_migrations(&pool)
        .await
        .context("failed to run database migrations")?;
    Ok(Arc::new(PgStore::new(pool)))
}

/// Run the server (used by main).
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Dropping the guards stops the background writers and loses buffered lines.
    let _log_guards = logging::init(&logging::LoggingConfig::from_env());

    let config = AppConfig::from_env();
    config.validate()?;
    let addr: SocketAddr = config.bind_addr()?;

    let store = open_store(&config).await?;
    let state = AppState::new(config, store);

    if state.config().seed_defaults {
        seed::seed_defaults(&state)
            .await
            .context("failed to seed default content")?;
    } else {
        tracing::info!("SEED_DEFAULTS disabled, skipping seeding");
    }

    let app = create_app(state);

    tracing::info!(%addr, "starting server");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("server error")?;

    Ok(())
}

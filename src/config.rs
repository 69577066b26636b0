//! Process configuration read from the environment.

use std::net::SocketAddr;

use thiserror::Error;

pub const DEFAULT_SESSION_SECRET: &str = "default-session-secret-change-in-production";
pub const DEV_ADMIN_PASSWORD: &str = "admin123";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("SESSION_SECRET must be set to a secure, unique value in production")]
    InsecureSessionSecret,

    #[error("invalid HOST/PORT configuration: {0}")]
    InvalidAddress(String),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: String,
    pub host: String,
    pub port: u16,
    /// `None` runs on the in-process store.
    pub database_url: Option<String>,
    pub session_secret: String,
    pub session_ttl_hours: i64,
    /// Initial admin password used when seeding an empty settings table.
    pub admin_password: Option<String>,
    pub seed_defaults: bool,
    /// From `ALLOWED_ORIGINS` (comma-separated) or `FRONTEND_ORIGIN`.
    pub allowed_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            host: "127.0.0.1".to_string(),
            port: 3001,
            database_url: None,
            session_secret: DEFAULT_SESSION_SECRET.to_string(),
            session_ttl_hours: 24,
            admin_password: None,
            seed_defaults: true,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

fn var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_flag(raw: &str) -> bool {
    !matches!(raw.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off")
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let allowed_origins = var("ALLOWED_ORIGINS")
            .map(|s| parse_origins(&s))
            .filter(|o| !o.is_empty())
            .or_else(|| var("FRONTEND_ORIGIN").map(|o| vec![o.trim().to_string()]))
            .unwrap_or(defaults.allowed_origins);

        Self {
            environment: var("ENVIRONMENT").unwrap_or(defaults.environment),
            host: var("HOST").unwrap_or(defaults.host),
            port: var("PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            database_url: var("DATABASE_URL"),
            session_secret: var("SESSION_SECRET").unwrap_or(defaults.session_secret),
            session_ttl_hours: var("SESSION_TTL_HOURS")
                .and_then(|s| s.parse().ok())
                .filter(|h: &i64| *h > 0)
                .unwrap_or(defaults.session_ttl_hours),
            admin_password: var("ADMIN_PASSWORD"),
            seed_defaults: var("SEED_DEFAULTS")
                .map(|s| parse_flag(&s))
                .unwrap_or(defaults.seed_defaults),
            allowed_origins,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Refuse to run in production with the default session secret.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.is_production() && self.session_secret == DEFAULT_SESSION_SECRET {
            return Err(ConfigError::InsecureSessionSecret);
        }
        if self.is_production() && self.admin_password.is_none() {
            tracing::warn!(
                "SECURITY: ADMIN_PASSWORD is not set. A fresh database will be seeded \
                 with the insecure development password."
            );
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ConfigError::InvalidAddress(addr))
    }
}

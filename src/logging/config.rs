use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level: {}", other)),
        }
    }
}

/// Where and how much to log.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub dir: PathBuf,
    /// JSON output instead of pretty console lines.
    pub production: bool,
}

impl LoggingConfig {
    /// Reads `ENVIRONMENT`, `LOG_LEVEL` and `LOG_DIR`. The level defaults to
    /// `info` in production and `debug` elsewhere.
    pub fn from_env() -> Self {
        let production = std::env::var("ENVIRONMENT").is_ok_and(|e| e == "production");
        let default_level = if production {
            LogLevel::Info
        } else {
            LogLevel::Debug
        };

        let level = match std::env::var("LOG_LEVEL") {
            Ok(raw) => raw.parse().unwrap_or_else(|e| {
                eprintln!("{}, falling back to {}", e, default_level);
                default_level
            }),
            Err(_) => default_level,
        };

        Self {
            level,
            dir: std::env::var("LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("logs")),
            production,
        }
    }

    /// Default directive when `RUST_LOG` is not set.
    pub fn filter_directive(&self) -> String {
        format!("portfolio_cms={},tower_http=debug,axum=debug", self.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_parsing() {
        assert_eq!("INFO".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_filter_directive_targets_crate() {
        let config = LoggingConfig {
            level: LogLevel::Warn,
            dir: PathBuf::from("logs"),
            production: true,
        };
        assert_eq!(
            config.filter_directive(),
            "portfolio_cms=warn,tower_http=debug,axum=debug"
        );
    }
}

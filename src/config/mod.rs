//! Configuration for pagesift

mod http;
mod logging;
mod render;
mod scraping;

pub use http::HttpConfig;
pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use render::RenderConfig;
pub use scraping::ScrapingConfig;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

/// Default user agent for the static fetch
pub const DEFAULT_USER_AGENT: &str = concat!("pagesift/", env!("CARGO_PKG_VERSION"));

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "pagesift.toml";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP API server configuration
    #[serde(default)]
    pub http: HttpConfig,
    /// Static fetch configuration
    #[serde(default)]
    pub scraping: ScrapingConfig,
    /// Headless exploration configuration
    #[serde(default)]
    pub render: RenderConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Load the file if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Serialize to TOML, as written by `pagesift init`.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate all configuration fields.
    ///
    /// Collects all validation errors and reports them together.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        // HTTP validation
        if self.http.listen_addr.parse::<SocketAddr>().is_err() {
            errors.push(format!(
                "http.listen_addr '{}' is not a valid socket address",
                self.http.listen_addr
            ));
        }

        // Scraping validation
        if self.scraping.request_timeout_secs == 0 {
            errors.push("scraping.request_timeout_secs must be positive".to_string());
        }
        if self.scraping.max_content_size == 0 {
            errors.push("scraping.max_content_size must be positive".to_string());
        }
        if self.scraping.user_agent.trim().is_empty() {
            errors.push("scraping.user_agent must not be empty".to_string());
        }

        // Render validation
        if self.render.navigation_timeout_ms == 0 {
            errors.push("render.navigation_timeout_ms must be positive".to_string());
        }
        if self.render.click_timeout_ms == 0 {
            errors.push("render.click_timeout_ms must be positive".to_string());
        }
        if self.render.scroll_delta <= 0 {
            errors.push("render.scroll_delta must be positive".to_string());
        }
        if self.render.description_max_chars == 0 {
            errors.push("render.description_max_chars must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_passes_validation() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn default_render_budget_matches_exploration_contract() {
        let render = RenderConfig::default();
        assert_eq!(render.scrolls, 3);
        assert_eq!(render.navigation_timeout_ms, 15_000);
        assert_eq!(render.max_click_attempts, 2);
        assert_eq!(render.target_pages, 3);
        assert_eq!(render.target_clicks, 1);
    }

    #[test]
    fn validate_collects_all_errors() {
        let mut cfg = Config::default();
        cfg.http.listen_addr = "not-an-address".to_string();
        cfg.scraping.request_timeout_secs = 0;
        cfg.render.navigation_timeout_ms = 0;

        let err = cfg.validate().unwrap_err().to_string();
        assert!(err.contains("http.listen_addr"), "got: {}", err);
        assert!(err.contains("request_timeout_secs"), "got: {}", err);
        assert!(err.contains("navigation_timeout_ms"), "got: {}", err);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [render]
            scrolls = 5

            [logging]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.render.scrolls, 5);
        assert_eq!(cfg.render.scroll_settle_ms, 1500);
        assert_eq!(cfg.logging.format, LogFormat::Json);
        assert_eq!(cfg.logging.level, LogLevel::Info);
        assert_eq!(cfg.scraping.request_timeout_secs, 10);
    }

    #[test]
    fn toml_round_trip_through_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);

        let mut cfg = Config::default();
        cfg.http.listen_addr = "0.0.0.0:9000".to_string();
        std::fs::write(&path, cfg.to_toml().unwrap()).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.http.listen_addr, "0.0.0.0:9000");
    }

    #[test]
    fn load_or_default_without_file() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::load_or_default(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(cfg.http.listen_addr, "127.0.0.1:8080");
    }

    #[test]
    fn load_rejects_invalid_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[render]\nclick_timeout_ms = 0\n").unwrap();
        assert!(Config::load(&path).is_err());
    }
}

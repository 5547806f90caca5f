//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Filesystem roots for assets and the page store
    #[serde(default)]
    pub paths: PathsConfig,

    /// Page identity and rendering defaults
    #[serde(default)]
    pub page: PageConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.http.page_timeout_secs == 0 {
            return Err(AppError::validation("http.page_timeout_secs must be > 0"));
        }
        if self.page.default_template.trim().is_empty() {
            return Err(AppError::validation("page.default_template is empty"));
        }
        if self.page.max_slug_length == 0 {
            return Err(AppError::validation("page.max_slug_length must be > 0"));
        }
        Ok(())
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Timeout for stylesheet and image requests, in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Timeout for the page HTML request, in seconds
    #[serde(default = "defaults::page_timeout")]
    pub page_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            page_timeout_secs: defaults::page_timeout(),
        }
    }
}

/// Filesystem layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Build-time assets: `<static_root>/page_<slug>/{css,images}`
    #[serde(default = "defaults::static_root")]
    pub static_root: PathBuf,

    /// Runtime-servable images: `<media_root>/page_<slug>/images`
    #[serde(default = "defaults::media_root")]
    pub media_root: PathBuf,

    /// Directory holding the local page store
    #[serde(default = "defaults::data_dir")]
    pub data_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            static_root: defaults::static_root(),
            media_root: defaults::media_root(),
            data_dir: defaults::data_dir(),
        }
    }
}

/// Page identity and rendering defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    /// Template name assigned to newly imported pages
    #[serde(default = "defaults::template")]
    pub default_template: String,

    /// Slugs are truncated to this many characters
    #[serde(default = "defaults::max_slug_length")]
    pub max_slug_length: usize,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            default_template: defaults::template(),
            max_slug_length: defaults::max_slug_length(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; page-import/0.1)".into()
    }
    pub fn timeout() -> u64 {
        10
    }
    pub fn page_timeout() -> u64 {
        15
    }

    // Path defaults
    pub fn static_root() -> PathBuf {
        PathBuf::from("static")
    }
    pub fn media_root() -> PathBuf {
        PathBuf::from("media")
    }
    pub fn data_dir() -> PathBuf {
        PathBuf::from("data")
    }

    // Page defaults
    pub fn template() -> String {
        "landing_basic.html".into()
    }
    pub fn max_slug_length() -> usize {
        50
    }

    pub fn log_level() -> String {
        "info".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.http.timeout_secs, 10);
        assert_eq!(config.http.page_timeout_secs, 15);
        assert_eq!(config.page.max_slug_length, 50);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [paths]
            static_root = "/srv/static"

            [http]
            timeout_secs = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.paths.static_root, PathBuf::from("/srv/static"));
        assert_eq!(config.paths.media_root, PathBuf::from("media"));
        assert_eq!(config.http.timeout_secs, 3);
        assert_eq!(config.http.page_timeout_secs, 15);
        assert_eq!(config.page.default_template, "landing_basic.html");
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.http.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default("definitely/not/here.toml");
        assert_eq!(config.logging.level, "info");
    }
}

//! Configuration loading for athlete-finder.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at ~/.config/athlete-finder/config.toml.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::FinderError;

/// Maximum number of records one session ever retains.
pub const HARD_CAP: usize = 5000;

/// Visible matches the auto-scan tries to surface before stopping.
pub const TARGET_MATCHES: usize = 10;

/// Pages one auto-scan run may fetch.
pub const MAX_SCAN_PAGES: u32 = 10;

/// Queries shorter than this (after trimming) never match anything.
pub const MIN_QUERY_LEN: usize = 2;

/// Records requested per upstream page.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Upstream athlete listing endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Records requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Maximum accumulated records per session
    #[serde(default = "default_hard_cap")]
    pub hard_cap: usize,

    /// Matches the auto-scan aims for
    #[serde(default = "default_target_matches")]
    pub target_matches: usize,

    /// Pages one auto-scan run may fetch
    #[serde(default = "default_max_scan_pages")]
    pub max_scan_pages: u32,

    /// Minimum query length (chars, after trimming)
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,

    /// Per-request timeout in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Retries for transient upstream failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Upstream sort field
    #[serde(default = "default_sort_by")]
    pub sort_by: String,

    /// Upstream sort order (asc, desc)
    #[serde(default = "default_sort_order")]
    pub sort_order: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_endpoint() -> String {
    "http://127.0.0.1:8080/api/athletes".to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_hard_cap() -> usize {
    HARD_CAP
}

fn default_target_matches() -> usize {
    TARGET_MATCHES
}

fn default_max_scan_pages() -> u32 {
    MAX_SCAN_PAGES
}

fn default_min_query_len() -> usize {
    MIN_QUERY_LEN
}

fn default_request_timeout_ms() -> u64 {
    15_000
}

fn default_max_retries() -> u32 {
    2
}

fn default_sort_by() -> String {
    "createdAt".to_string()
}

fn default_sort_order() -> String {
    "desc".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            page_size: default_page_size(),
            hard_cap: default_hard_cap(),
            target_matches: default_target_matches(),
            max_scan_pages: default_max_scan_pages(),
            min_query_len: default_min_query_len(),
            request_timeout_ms: default_request_timeout_ms(),
            max_retries: default_max_retries(),
            sort_by: default_sort_by(),
            sort_order: default_sort_order(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/athlete-finder/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (FINDER_*)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, FinderError> {
        let config_dir = ProjectDirs::from("", "", "athlete-finder")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("endpoint", default_endpoint())?
            .set_default("page_size", default_page_size() as i64)?
            .set_default("hard_cap", default_hard_cap() as i64)?
            .set_default("target_matches", default_target_matches() as i64)?
            .set_default("max_scan_pages", default_max_scan_pages() as i64)?
            .set_default("min_query_len", default_min_query_len() as i64)?
            .set_default("request_timeout_ms", default_request_timeout_ms() as i64)?
            .set_default("max_retries", default_max_retries() as i64)?
            .set_default("sort_by", default_sort_by())?
            .set_default("sort_order", default_sort_order())?
            .set_default("log_level", default_log_level())?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // FINDER_PAGE_SIZE, FINDER_ENDPOINT, ...
        builder = builder.add_source(Environment::with_prefix("FINDER").try_parsing(true));

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), FinderError> {
        if self.endpoint.trim().is_empty() {
            return Err(FinderError::Config("endpoint must not be empty".to_string()));
        }
        if self.page_size == 0 {
            return Err(FinderError::Config("page_size must be > 0".to_string()));
        }
        if self.hard_cap == 0 {
            return Err(FinderError::Config("hard_cap must be > 0".to_string()));
        }
        if self.target_matches == 0 {
            return Err(FinderError::Config("target_matches must be > 0".to_string()));
        }
        if self.max_scan_pages == 0 {
            return Err(FinderError::Config("max_scan_pages must be > 0".to_string()));
        }
        if self.request_timeout_ms == 0 {
            return Err(FinderError::Config(
                "request_timeout_ms must be > 0".to_string(),
            ));
        }
        match self.sort_order.as_str() {
            "asc" | "desc" => Ok(()),
            other => Err(FinderError::Config(format!(
                "sort_order must be asc or desc, got {}",
                other
            ))),
        }
    }

    /// Request timeout as a Duration.
    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.request_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.page_size, 50);
        assert_eq!(settings.hard_cap, 5000);
        assert_eq!(settings.target_matches, 10);
        assert_eq!(settings.max_scan_pages, 10);
        assert_eq!(settings.min_query_len, 2);
        assert_eq!(settings.sort_by, "createdAt");
        assert_eq!(settings.sort_order, "desc");
    }

    #[test]
    fn test_default_settings_validate() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_zero_bounds() {
        let mut settings = Settings::default();
        settings.page_size = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.max_scan_pages = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.sort_order = "sideways".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(file, "page_size = 25").unwrap();
        writeln!(file, "endpoint = \"https://clubs.example/api/athletes\"").unwrap();

        let path = file.path().to_string_lossy().to_string();
        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.page_size, 25);
        assert_eq!(settings.endpoint, "https://clubs.example/api/athletes");
        assert_eq!(settings.target_matches, 10);
    }

    #[test]
    fn test_load_missing_cli_file_fails() {
        let result = Settings::load(Some("/nonexistent/athlete-finder.toml"));
        assert!(matches!(result, Err(FinderError::Config(_))));
    }
}

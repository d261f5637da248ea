//! App Configuration
//!
//! Built in layers: defaults, then the API URL baked in at compile time
//! (`KANBAN_API_URL`), then overrides stored in the settings store.

use board_engine::controller::DEFAULT_BANNER_TIMEOUT_MS;
use board_engine::{ApiError, ApiResult, SettingsStore};
use log::LevelFilter;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
const DEFAULT_LOG_CAPACITY: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL without trailing slash
    pub api_base_url: String,
    pub banner_timeout_ms: u32,
    pub log_level: LevelFilter,
    /// Records kept by the in-memory logger
    pub log_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            banner_timeout_ms: DEFAULT_BANNER_TIMEOUT_MS,
            log_level: if cfg!(debug_assertions) { LevelFilter::Debug } else { LevelFilter::Info },
            log_capacity: DEFAULT_LOG_CAPACITY,
        }
    }
}

impl AppConfig {
    /// Also returns the URL overrides that were rejected, for logging once
    /// the logger is up
    pub fn load(settings: &dyn SettingsStore) -> (Self, Vec<ApiError>) {
        Self::from_sources(option_env!("KANBAN_API_URL"), option_env!("KANBAN_LOG_LEVEL"), settings)
    }

    pub fn from_sources(
        build_api_url: Option<&str>,
        build_log_level: Option<&str>,
        settings: &dyn SettingsStore,
    ) -> (Self, Vec<ApiError>) {
        let mut config = Self::default();
        let mut rejected = Vec::new();
        if let Some(level) = build_log_level {
            config.log_level = rolling_logger::parse_level(level);
        }
        let stored = settings.api_url();
        for raw in [build_api_url, stored.as_deref()].into_iter().flatten() {
            match parse_base_url(raw) {
                Ok(url) => config.api_base_url = url,
                Err(err) => rejected.push(err),
            }
        }
        (config, rejected)
    }
}

/// Trim whitespace and trailing slashes. Only http(s) URLs are accepted.
pub fn parse_base_url(raw: &str) -> ApiResult<String> {
    let url = raw.trim().trim_end_matches('/');
    if url.is_empty() {
        return Err(ApiError::Config("API base URL is blank".to_string()));
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(url.to_string())
    } else {
        Err(ApiError::Config(format!("API base URL must start with http:// or https://, got {}", url)))
    }
}

#[cfg(test)]
mod tests {
    use board_engine::settings::API_URL_KEY;
    use board_engine::MemorySettings;

    use super::*;

    #[test]
    fn test_layers_override_in_order() {
        let settings = MemorySettings::new();
        let (config, rejected) = AppConfig::from_sources(None, None, &settings);
        assert!(rejected.is_empty());
        assert_eq!(config.api_base_url, DEFAULT_API_URL);
        assert_eq!(config.banner_timeout_ms, 5_000);

        let (config, _) = AppConfig::from_sources(Some("https://api.example.com/"), Some("warn"), &settings);
        assert_eq!(config.api_base_url, "https://api.example.com");
        assert_eq!(config.log_level, LevelFilter::Warn);

        settings.set(API_URL_KEY, "https://staging.example.com//");
        let (config, _) = AppConfig::from_sources(Some("https://api.example.com"), None, &settings);
        assert_eq!(config.api_base_url, "https://staging.example.com");
    }

    #[test]
    fn test_invalid_urls_are_ignored() {
        let settings = MemorySettings::new();
        settings.set(API_URL_KEY, "ftp://files");
        let (config, rejected) = AppConfig::from_sources(Some("   "), None, &settings);
        assert_eq!(config.api_base_url, DEFAULT_API_URL);
        assert_eq!(rejected.len(), 2);
        assert!(rejected.iter().all(|e| matches!(e, ApiError::Config(_))));

        let (config, rejected) = AppConfig::from_sources(Some("https://api.example.com"), None, &settings);
        assert_eq!(config.api_base_url, "https://api.example.com");
        assert_eq!(rejected.len(), 1);
    }

    #[test]
    fn test_parse_base_url_reports_config_errors() {
        assert_eq!(parse_base_url(" http://localhost:8080/ ").unwrap(), "http://localhost:8080");
        assert_eq!(
            parse_base_url("  ").unwrap_err(),
            ApiError::Config("API base URL is blank".to_string())
        );
        let err = parse_base_url("ftp://files").unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
        assert_eq!(
            err.to_string(),
            "configuration error: API base URL must start with http:// or https://, got ftp://files"
        );
    }
}

//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (PAWCACHE_*)
//! 2. TOML config file (if PAWCACHE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (PAWCACHE_*)
/// 2. TOML config file (if PAWCACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to SQLite cache database.
    ///
    /// Set via PAWCACHE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Site origin the worker is scoped to. Relative manifest entries are
    /// resolved against it and only same-origin responses are revalidated
    /// into the cache.
    ///
    /// Set via PAWCACHE_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Version-stamped name of the current cache generation.
    ///
    /// Bumping this on deployment makes the next activation drop every
    /// older generation.
    #[serde(default = "default_cache_name")]
    pub cache_name: String,

    /// URLs fetched and stored at install time, in order.
    #[serde(default = "default_precache_urls")]
    pub precache_urls: Vec<String>,

    /// Page served to navigations when both network and cache miss.
    #[serde(default = "default_offline_page")]
    pub offline_page: String,

    /// Image served to image requests when both network and cache miss.
    #[serde(default = "default_offline_image")]
    pub offline_image: String,

    /// Hosts whose requests are never intercepted (substring match).
    #[serde(default = "default_analytics_hosts")]
    pub analytics_hosts: Vec<String>,

    /// Path segment that marks dynamic API requests.
    #[serde(default = "default_api_marker")]
    pub api_marker: String,

    /// Path extensions routed to stale-while-revalidate.
    #[serde(default = "default_static_extensions")]
    pub static_extensions: Vec<String>,

    /// Background sync tag that flushes pending contact submissions.
    #[serde(default = "default_sync_tag")]
    pub sync_tag: String,

    /// Endpoint pending contact submissions are POSTed to.
    #[serde(default = "default_contact_endpoint")]
    pub contact_endpoint: String,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via PAWCACHE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via PAWCACHE_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Business WhatsApp number in international format.
    #[serde(default = "default_whatsapp_number")]
    pub whatsapp_number: String,

    #[serde(default = "default_notification_title")]
    pub notification_title: String,

    #[serde(default = "default_notification_body")]
    pub notification_body: String,

    #[serde(default = "default_notification_icon")]
    pub notification_icon: String,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./pawcache.sqlite")
}

fn default_origin() -> String {
    "http://localhost:8080".into()
}

fn default_cache_name() -> String {
    "cuidadoresvip-cache-v1".into()
}

fn default_offline_page() -> String {
    "/offline.html".into()
}

fn default_offline_image() -> String {
    "/assets/images/offline-paw.svg".into()
}

fn default_precache_urls() -> Vec<String> {
    [
        "/",
        "/index.html",
        "/offline.html",
        "/assets/images/offline-paw.svg",
        "/assets/css/main.css",
        "/assets/css/animations.css",
        "/assets/js/main.js",
        "/assets/js/whatsapp-integration.js",
        "/assets/images/logo.webp",
        "/assets/images/paw-pattern-new.svg",
        "/assets/images/sobre-nosotros.jpg",
        "/manifest.json",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_analytics_hosts() -> Vec<String> {
    vec!["google-analytics.com".into(), "googletagmanager.com".into()]
}

fn default_api_marker() -> String {
    "/api/".into()
}

fn default_static_extensions() -> Vec<String> {
    vec![".svg".into(), ".webp".into(), ".jpg".into(), ".png".into()]
}

fn default_sync_tag() -> String {
    "contact-form-sync".into()
}

fn default_contact_endpoint() -> String {
    "/api/contact".into()
}

fn default_user_agent() -> String {
    "pawcache/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_whatsapp_number() -> String {
    "+56912345678".into()
}

fn default_notification_title() -> String {
    "CuidadoresVIP".into()
}

fn default_notification_body() -> String {
    "Tu mensaje ha sido enviado correctamente".into()
}

fn default_notification_icon() -> String {
    "/assets/images/logo.webp".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            origin: default_origin(),
            cache_name: default_cache_name(),
            precache_urls: default_precache_urls(),
            offline_page: default_offline_page(),
            offline_image: default_offline_image(),
            analytics_hosts: default_analytics_hosts(),
            api_marker: default_api_marker(),
            static_extensions: default_static_extensions(),
            sync_tag: default_sync_tag(),
            contact_endpoint: default_contact_endpoint(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            whatsapp_number: default_whatsapp_number(),
            notification_title: default_notification_title(),
            notification_body: default_notification_body(),
            notification_icon: default_notification_icon(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Parsed site origin.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `origin` is not an absolute http(s) URL.
    pub fn origin_url(&self) -> Result<url::Url, ConfigError> {
        let parsed = url::Url::parse(&self.origin)
            .map_err(|e| ConfigError::Invalid { field: "origin".into(), reason: e.to_string() })?;
        match parsed.scheme() {
            "http" | "https" => Ok(parsed),
            scheme => Err(ConfigError::Invalid { field: "origin".into(), reason: format!("unsupported scheme: {scheme}") }),
        }
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `PAWCACHE_`
    /// 2. TOML file from `PAWCACHE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// List fields read from the environment use figment's array syntax,
    /// e.g. `PAWCACHE_ANALYTICS_HOSTS='["stats.example.com"]'`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("PAWCACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("PAWCACHE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Check if a WhatsApp number is configured (for deferred validation).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the number contains no digits.
    pub fn require_whatsapp_number(&self) -> Result<&str, ConfigError> {
        if self.whatsapp_number.chars().any(|c| c.is_ascii_digit()) {
            Ok(&self.whatsapp_number)
        } else {
            Err(ConfigError::Missing {
                field: "whatsapp_number".into(),
                hint: "Set PAWCACHE_WHATSAPP_NUMBER environment variable".into(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.db_path, PathBuf::from("./pawcache.sqlite"));
        assert_eq!(config.cache_name, "cuidadoresvip-cache-v1");
        assert_eq!(config.user_agent, "pawcache/0.1");
        assert_eq!(config.timeout_ms, 20_000);
        assert_eq!(config.precache_urls.len(), 12);
        assert_eq!(config.precache_urls[0], "/");
        assert_eq!(config.sync_tag, "contact-form-sync");
        assert_eq!(config.api_marker, "/api/");
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
    }

    #[test]
    fn test_origin_url() {
        let config = AppConfig { origin: "https://cuidadoresvip.cl".into(), ..Default::default() };
        assert_eq!(config.origin_url().unwrap().host_str(), Some("cuidadoresvip.cl"));

        let config = AppConfig { origin: "ftp://cuidadoresvip.cl".into(), ..Default::default() };
        assert!(matches!(config.origin_url(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_require_whatsapp_number() {
        let config = AppConfig::default();
        assert_eq!(config.require_whatsapp_number().unwrap(), "+56912345678");

        let config = AppConfig { whatsapp_number: "+".into(), ..Default::default() };
        assert!(matches!(config.require_whatsapp_number(), Err(ConfigError::Missing { .. })));
    }

    #[test]
    fn test_load_layers_env_over_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("pawcache.toml", r#"cache_name = "from-file-v2""#)?;
            jail.set_env("PAWCACHE_CONFIG_FILE", "pawcache.toml");
            jail.set_env("PAWCACHE_TIMEOUT_MS", "5000");

            let config = AppConfig::load().expect("config should load");
            assert_eq!(config.cache_name, "from-file-v2");
            assert_eq!(config.timeout_ms, 5000);
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid_env() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("PAWCACHE_TIMEOUT_MS", "10");
            assert!(AppConfig::load().is_err());
            Ok(())
        });
    }
}

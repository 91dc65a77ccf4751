//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `cache_name`, `user_agent` or `sync_tag` is empty
    /// - `origin` is not an absolute http(s) URL
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `precache_urls` is empty or lacks either offline fallback asset
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_name.trim().is_empty() {
            return Err(ConfigError::Invalid { field: "cache_name".into(), reason: "must not be empty".into() });
        }

        self.origin_url()?;

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.sync_tag.is_empty() {
            return Err(ConfigError::Invalid { field: "sync_tag".into(), reason: "must not be empty".into() });
        }

        if self.precache_urls.is_empty() {
            return Err(ConfigError::Invalid { field: "precache_urls".into(), reason: "must not be empty".into() });
        }

        // Fallback assets must ship in every generation.
        for (field, asset) in [("offline_page", &self.offline_page), ("offline_image", &self.offline_image)] {
            if !self.precache_urls.iter().any(|u| u == asset) {
                return Err(ConfigError::Invalid {
                    field: field.into(),
                    reason: format!("{asset} must be listed in precache_urls"),
                });
            }
        }

        if self.static_extensions.iter().any(|ext| !ext.starts_with('.')) {
            tracing::warn!(
                extensions = ?self.static_extensions,
                "static_extensions entries without a leading dot also match path suffixes"
            );
        }

        Ok(())
    }
}

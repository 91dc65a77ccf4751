//! Request classification.
//!
//! Rules are evaluated in a fixed order and the first match wins:
//!
//! 1. Analytics hosts → [`Strategy::Ignore`]
//! 2. Non-GET methods → [`Strategy::Ignore`]
//! 3. Navigations, API paths, HTML `Accept` → [`Strategy::NetworkFirst`]
//! 4. Style/script/image/font destinations or static extensions →
//!    [`Strategy::StaleWhileRevalidate`]
//! 5. Everything else → [`Strategy::CacheFirst`]
//!
//! Rules 1 and 2 run before any caching decision, so ignored requests never
//! reach the cache.

use pawcache_core::AppConfig;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::fetch::FetchRequest;

/// Strategy selected for an intercepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Not intercepted; the host performs default network handling.
    Ignore,
    NetworkFirst,
    StaleWhileRevalidate,
    /// Cache, else network, else the offline page for navigations.
    CacheFirst,
}

#[derive(Debug, Clone)]
pub struct Router {
    analytics_hosts: Vec<String>,
    api_marker: String,
    static_extensions: Vec<String>,
}

impl Router {
    pub fn new(analytics_hosts: Vec<String>, api_marker: impl Into<String>, static_extensions: Vec<String>) -> Self {
        Self { analytics_hosts, api_marker: api_marker.into(), static_extensions }
    }

    pub fn from_app_config(config: &AppConfig) -> Self {
        Self::new(config.analytics_hosts.clone(), config.api_marker.clone(), config.static_extensions.clone())
    }

    pub fn classify(&self, request: &FetchRequest) -> Strategy {
        if self.is_analytics(request) || request.method != Method::GET {
            return Strategy::Ignore;
        }

        let path = request.url.path();

        if request.is_navigation() || path.contains(&self.api_marker) || request.accepts_html() {
            return Strategy::NetworkFirst;
        }

        if request.destination.is_static_asset() || self.static_extensions.iter().any(|ext| path.ends_with(ext.as_str()))
        {
            return Strategy::StaleWhileRevalidate;
        }

        Strategy::CacheFirst
    }

    fn is_analytics(&self, request: &FetchRequest) -> bool {
        request
            .url
            .host_str()
            .is_some_and(|host| self.analytics_hosts.iter().any(|a| host.contains(a.as_str())))
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::from_app_config(&AppConfig::default())
    }
}

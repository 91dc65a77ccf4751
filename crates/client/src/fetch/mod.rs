//! Network access for the worker.
//!
//! ### Network seam
//! - Strategies talk to the network through the [`Network`] trait so the
//!   HTTP client can be replaced (tests drive a scripted double).
//! - Like the platform fetch, only transport failures are errors; a 404 or
//!   500 is a response.
//!
//! ### Response typing
//! - Responses from the worker's origin are `basic`, everything else `cors`.
//!   Only `basic` responses are revalidated into the cache.

pub mod request;
pub mod url;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Method, StatusCode, Url, header};
use std::time::{Duration, Instant};

pub use request::{Destination, FetchRequest, RequestMode};
pub use self::url::{UrlError, resolve, same_origin};

use pawcache_core::{AppConfig, CachedResponse, Error};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "pawcache/0.1")
    pub user_agent: String,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,

    /// Origin used to type responses as `basic` or `cors`
    pub origin: Url,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "pawcache/0.1".to_string(),
            timeout: Duration::from_millis(20000),
            max_redirects: 5,
            origin: Url::parse("http://localhost:8080").expect("static origin parses"),
        }
    }
}

impl FetchConfig {
    pub fn from_app_config(config: &AppConfig) -> Result<Self, Error> {
        let origin = config.origin_url().map_err(|e| Error::InvalidUrl(e.to_string()))?;
        Ok(Self { user_agent: config.user_agent.clone(), timeout: config.timeout(), origin, ..Default::default() })
    }
}

/// Response tainting, as far as the cache cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseType {
    /// Same-origin response.
    Basic,
    /// Cross-origin response.
    Cors,
}

impl ResponseType {
    pub fn as_str(self) -> &'static str {
        match self {
            ResponseType::Basic => "basic",
            ResponseType::Cors => "cors",
        }
    }
}

/// Response from a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The URL requested; cache entries are keyed by it
    pub url: Url,
    /// The final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status: StatusCode,
    /// Content-Type header
    pub content_type: Option<String>,
    /// Response body bytes
    pub bytes: Bytes,
    /// Response headers
    pub headers: header::HeaderMap,
    /// Time taken to fetch in milliseconds
    pub fetch_ms: u64,
    pub response_type: ResponseType,
}

impl FetchResponse {
    /// A same-origin response with no headers.
    pub fn new(url: Url, status: StatusCode, bytes: impl Into<Bytes>) -> Self {
        Self {
            final_url: url.clone(),
            url,
            status,
            content_type: None,
            bytes: bytes.into(),
            headers: header::HeaderMap::new(),
            fetch_ms: 0,
            response_type: ResponseType::Basic,
        }
    }

    /// Whether revalidation may store this response (200 and same-origin).
    pub fn is_cacheable(&self) -> bool {
        self.status == StatusCode::OK && self.response_type == ResponseType::Basic
    }

    /// Headers with valid UTF-8 values, in wire order.
    pub fn header_pairs(&self) -> Vec<(String, String)> {
        self.headers
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect()
    }

    /// Snapshot for storing under `method` + requested URL.
    pub fn to_cached(&self, method: &Method) -> CachedResponse {
        let mut cached = CachedResponse::new(method.as_str(), self.url.as_str(), self.status.as_u16(), self.bytes.to_vec())
            .with_headers(self.header_pairs());
        cached.status_text = self.status.canonical_reason().unwrap_or_default().to_string();
        cached.response_type = self.response_type.as_str().to_string();
        cached
    }
}

/// Outgoing network access.
#[async_trait]
pub trait Network: Send + Sync {
    /// Perform the request.
    ///
    /// Returns `Error::Network` when no response arrived at all.
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, Error>;
}

/// reqwest-backed network client.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

#[async_trait]
impl Network for FetchClient {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, Error> {
        let start = Instant::now();

        let mut builder = self.http.request(request.method.clone(), request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Network(format!("timed out fetching {}: {}", request.url, e))
            } else {
                Error::Network(format!("failed to fetch {}: {}", request.url, e))
            }
        })?;

        let status = response.status();
        let final_url = response.url().clone();
        let headers = response.headers().clone();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("failed to read response: {}", e)))?;

        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let response_type =
            if same_origin(&final_url, &self.config.origin) { ResponseType::Basic } else { ResponseType::Cors };

        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(
            method = %request.method,
            url = %request.url,
            status = status.as_u16(),
            fetch_ms,
            bytes = bytes.len(),
            "fetched"
        );

        Ok(FetchResponse {
            url: request.url.clone(),
            final_url,
            status,
            content_type,
            bytes,
            headers,
            fetch_ms,
            response_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.user_agent, "pawcache/0.1");
        assert_eq!(config.timeout, Duration::from_millis(20000));
        assert_eq!(config.max_redirects, 5);
        assert_eq!(config.origin.as_str(), "http://localhost:8080/");
    }

    #[test]
    fn test_fetch_config_from_app_config() {
        let app = AppConfig { origin: "https://cuidadoresvip.cl".into(), timeout_ms: 1500, ..Default::default() };
        let config = FetchConfig::from_app_config(&app).unwrap();
        assert_eq!(config.origin.host_str(), Some("cuidadoresvip.cl"));
        assert_eq!(config.timeout, Duration::from_millis(1500));
    }

    #[test]
    fn test_is_cacheable() {
        let url = Url::parse("https://cuidadoresvip.cl/assets/css/main.css").unwrap();
        assert!(FetchResponse::new(url.clone(), StatusCode::OK, "body").is_cacheable());
        assert!(!FetchResponse::new(url.clone(), StatusCode::NOT_FOUND, "").is_cacheable());

        let mut cross = FetchResponse::new(url, StatusCode::OK, "body");
        cross.response_type = ResponseType::Cors;
        assert!(!cross.is_cacheable());
    }

    #[test]
    fn test_to_cached_keeps_requested_url() {
        let url = Url::parse("https://cuidadoresvip.cl/").unwrap();
        let mut response = FetchResponse::new(url, StatusCode::OK, "<html></html>");
        response.final_url = Url::parse("https://cuidadoresvip.cl/index.html").unwrap();
        response.headers.insert(header::CONTENT_TYPE, header::HeaderValue::from_static("text/html"));

        let cached = response.to_cached(&Method::GET);
        assert_eq!(cached.url, "https://cuidadoresvip.cl/");
        assert_eq!(cached.method, "GET");
        assert_eq!(cached.status_text, "OK");
        assert_eq!(cached.header("content-type"), Some("text/html"));
        assert_eq!(cached.body, b"<html></html>");
    }

    #[tokio::test]
    async fn test_fetch_client_new() {
        let client = FetchClient::new(FetchConfig::default());
        assert!(client.is_ok());
    }
}

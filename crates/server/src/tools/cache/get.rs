//! cache_get tool implementation.
//!
//! Looks up a stored response by request identity.

use pawcache_client::ServiceWorker;
use pawcache_client::fetch::resolve;
use pawcache_core::Error;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::{EncodedBody, encode_body, json_result};

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// Request URL; relative URLs resolve against the site origin.
    pub url: String,

    /// Request method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Generation to search (default: the current one).
    #[serde(default)]
    pub cache_name: Option<String>,
}

fn default_method() -> String {
    "GET".into()
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    pub cache_name: String,
    pub key: String,
    pub url: String,
    pub method: String,
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub response_type: String,
    pub stored_at: String,
    pub body: EncodedBody,
}

/// Implementation of the cache_get tool.
pub async fn get_impl(worker: &ServiceWorker, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    let url = resolve(&worker.config().origin, &params.url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
    let cache_name = params.cache_name.unwrap_or_else(|| worker.config().cache_name.clone());
    if !worker.db().has_generation(&cache_name).await? {
        return Err(Error::CacheMiss(format!("no cache generation named {cache_name}")).into());
    }

    let cached = worker
        .db()
        .match_response(&cache_name, &params.method, url.as_str())
        .await?
        .ok_or_else(|| Error::CacheMiss(format!("{} {} in {cache_name}", params.method, url)))?;

    let output = CacheGetOutput {
        key: cached.key(),
        body: encode_body(&cached.body),
        cache_name,
        url: cached.url,
        method: cached.method,
        status: cached.status,
        status_text: cached.status_text,
        headers: cached.headers,
        response_type: cached.response_type,
        stored_at: cached.stored_at,
    };
    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{output_json, worker};
    use pawcache_core::CachedResponse;
    use rmcp::model::ErrorCode;

    fn params(url: &str) -> CacheGetParams {
        CacheGetParams { url: url.into(), method: default_method(), cache_name: None }
    }

    #[tokio::test]
    async fn test_get_impl_missing() {
        let worker = worker().await;
        let err = get_impl(&worker, params("/offline.html")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode(-32001));
    }

    #[tokio::test]
    async fn test_get_impl_found() {
        let worker = worker().await;
        let entry = CachedResponse::new("GET", "https://cuidadoresvip.cl/offline.html", 200, b"<p>offline</p>".to_vec())
            .with_headers(vec![("content-type".into(), "text/html".into())]);
        worker.db().put_response("cuidadoresvip-cache-v1", &entry).await.unwrap();

        let output = output_json(&get_impl(&worker, params("/offline.html#x")).await.unwrap());
        assert_eq!(output["status"], 200);
        assert_eq!(output["key"], entry.key());
        assert_eq!(output["body"]["encoding"], "utf8");
        assert_eq!(output["body"]["data"], "<p>offline</p>");
    }

    #[tokio::test]
    async fn test_get_impl_other_generation() {
        let worker = worker().await;
        let entry = CachedResponse::new("GET", "https://cuidadoresvip.cl/", 200, vec![0xff, 0x00]);
        worker.db().put_response("cuidadoresvip-cache-v0", &entry).await.unwrap();

        let mut p = params("/");
        p.cache_name = Some("cuidadoresvip-cache-v0".into());
        let output = output_json(&get_impl(&worker, p).await.unwrap());
        assert_eq!(output["body"]["encoding"], "base64");

        assert!(get_impl(&worker, params("/")).await.is_err());
    }

    #[tokio::test]
    async fn test_get_impl_unknown_generation() {
        let worker = worker().await;
        let mut p = params("/");
        p.cache_name = Some("cuidadoresvip-cache-v9".into());

        let err = get_impl(&worker, p).await.unwrap_err();
        assert_eq!(err.code, ErrorCode(-32001));
        assert!(err.message.contains("no cache generation named cuidadoresvip-cache-v9"));
    }
}

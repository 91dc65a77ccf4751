//! worker_fetch tool implementation.
//!
//! Offers a request to the worker as if a page had issued it.

use std::collections::BTreeMap;

use pawcache_client::fetch::resolve;
use pawcache_client::{Destination, FetchOutcome, FetchRequest, RequestMode, ResponseSource, ServiceWorker, Strategy};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{EncodedBody, encode_body, json_result};
use crate::error::ToolError;

/// Parameters for the worker_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerFetchParams {
    /// URL to request; relative URLs resolve against the site origin.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Request mode: "navigate", "same-origin", "no-cors" (default) or "cors".
    #[serde(default)]
    pub mode: Option<String>,

    /// Destination: "document", "style", "script", "image", "font", "manifest" or "empty" (default).
    #[serde(default)]
    pub destination: Option<String>,

    /// Request headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

fn default_method() -> String {
    "GET".into()
}

/// Output from the worker_fetch tool.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerFetchOutput {
    /// False when the worker left the request to default network handling.
    pub intercepted: bool,
    /// Routing decision; absent when the worker is not active and routed nothing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declined: Option<DeclineReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<FetchedResponse>,
}

/// Why a request was left to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclineReason {
    WorkerNotActive,
    Ignored,
}

#[derive(Debug, Clone, Serialize)]
pub struct FetchedResponse {
    pub source: ResponseSource,
    pub url: String,
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: EncodedBody,
}

fn parse_named<T: DeserializeOwned + Default>(field: &str, value: Option<&str>) -> Result<T, ToolError> {
    match value {
        None => Ok(T::default()),
        Some(name) => serde_json::from_value(serde_json::Value::String(name.to_string()))
            .map_err(|_| ToolError::InvalidInput(format!("unknown {field}: {name}"))),
    }
}

pub(crate) fn build_request(worker: &ServiceWorker, params: &WorkerFetchParams) -> Result<FetchRequest, ToolError> {
    let url = resolve(&worker.config().origin, &params.url).map_err(|e| ToolError::InvalidInput(e.to_string()))?;
    let method = params
        .method
        .to_ascii_uppercase()
        .parse()
        .map_err(|_| ToolError::InvalidInput(format!("invalid method: {}", params.method)))?;
    let mode: RequestMode = parse_named("mode", params.mode.as_deref())?;
    let destination: Destination = parse_named("destination", params.destination.as_deref())?;

    let mut request = FetchRequest::get(url)
        .with_method(method)
        .with_mode(mode)
        .with_destination(destination);
    for (name, value) in &params.headers {
        request = request.with_header(name, value);
    }
    Ok(request)
}

/// Implementation of the worker_fetch tool.
pub async fn fetch_impl(worker: &ServiceWorker, params: WorkerFetchParams) -> Result<CallToolResult, McpError> {
    let request = build_request(worker, &params)?;
    let strategy = worker.router().classify(&request);

    let output = match worker.handle_fetch(request).await? {
        FetchOutcome::Inactive => WorkerFetchOutput {
            intercepted: false,
            strategy: None,
            declined: Some(DeclineReason::WorkerNotActive),
            response: None,
        },
        FetchOutcome::Ignored => WorkerFetchOutput {
            intercepted: false,
            strategy: Some(strategy),
            declined: Some(DeclineReason::Ignored),
            response: None,
        },
        FetchOutcome::Responded(response) => WorkerFetchOutput {
            intercepted: true,
            strategy: Some(strategy),
            declined: None,
            response: Some(FetchedResponse {
                source: response.source,
                body: encode_body(&response.body),
                url: response.url,
                status: response.status,
                status_text: response.status_text,
                headers: response.headers,
            }),
        },
    };

    json_result(&output)
}

//! worker_sync tool implementation.

use pawcache_client::{ServiceWorker, SyncReport};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Parameters for the worker_sync tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerSyncParams {
    /// Sync tag (default: the configured contact-form tag).
    #[serde(default)]
    pub tag: Option<String>,
}

/// Output from the worker_sync tool.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerSyncOutput {
    pub tag: String,
    /// False when no handler is registered for the tag.
    pub handled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<SyncReport>,
}

pub async fn sync_impl(worker: &ServiceWorker, params: WorkerSyncParams) -> Result<CallToolResult, McpError> {
    let tag = params.tag.unwrap_or_else(|| worker.config().sync_tag.clone());
    let report = worker.handle_sync(&tag).await?;
    json_result(&WorkerSyncOutput { handled: report.is_some(), tag, report })
}

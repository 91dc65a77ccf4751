//! worker_install and worker_activate tool implementations.

use pawcache_client::{ServiceWorker, WorkerState};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use serde::Serialize;

use super::json_result;

/// Output from the worker_install tool.
#[derive(Debug, Clone, Serialize)]
pub struct InstallOutput {
    pub cache_name: String,
    /// Precached entries stored.
    pub entries: usize,
    pub state: WorkerState,
    pub skip_waiting: bool,
}

/// Output from the worker_activate tool.
#[derive(Debug, Clone, Serialize)]
pub struct ActivateOutput {
    pub cache_name: String,
    /// Old generations removed.
    pub deleted: Vec<String>,
    pub state: WorkerState,
}

pub async fn install_impl(worker: &ServiceWorker) -> Result<CallToolResult, McpError> {
    let entries = worker.install().await?;
    json_result(&InstallOutput {
        cache_name: worker.config().cache_name.clone(),
        entries,
        state: worker.state().await,
        skip_waiting: worker.skip_waiting_requested(),
    })
}

pub async fn activate_impl(worker: &ServiceWorker) -> Result<CallToolResult, McpError> {
    let deleted = worker.activate().await?;
    json_result(&ActivateOutput {
        cache_name: worker.config().cache_name.clone(),
        deleted,
        state: worker.state().await,
    })
}

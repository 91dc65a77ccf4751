//! worker_message tool implementation.

use pawcache_client::{ServiceWorker, WorkerMessage, WorkerState};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::error::ToolError;

/// Parameters for the worker_message tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerMessageParams {
    /// Message object, e.g. {"type": "SKIP_WAITING"}.
    pub message: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkerMessageOutput {
    pub message: WorkerMessage,
    pub skip_waiting: bool,
    /// Worker state after the message was handled.
    pub state: WorkerState,
}

pub async fn message_impl(worker: &ServiceWorker, params: WorkerMessageParams) -> Result<CallToolResult, McpError> {
    let message: WorkerMessage = serde_json::from_value(params.message)
        .map_err(|e| ToolError::InvalidInput(format!("message must be an object with a \"type\": {e}")))?;
    let state = worker.handle_message(&message).await?;
    json_result(&WorkerMessageOutput { message, skip_waiting: worker.skip_waiting_requested(), state })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{output_json, worker};
    use serde_json::json;

    #[tokio::test]
    async fn test_skip_waiting() {
        let worker = worker().await;
        let params = WorkerMessageParams { message: json!({"type": "SKIP_WAITING"}) };
        let output = output_json(&message_impl(&worker, params).await.unwrap());
        assert_eq!(output["skip_waiting"], true);
        assert_eq!(output["state"], "parsed");
        assert!(worker.skip_waiting_requested());
    }

    #[tokio::test]
    async fn test_unknown_type_ignored() {
        let worker = worker().await;
        let params = WorkerMessageParams { message: json!({"type": "PING"}) };
        let output = output_json(&message_impl(&worker, params).await.unwrap());
        assert_eq!(output["skip_waiting"], false);
    }

    #[tokio::test]
    async fn test_untyped_message_rejected() {
        let worker = worker().await;
        let params = WorkerMessageParams { message: json!("SKIP_WAITING") };
        assert!(message_impl(&worker, params).await.is_err());
    }
}

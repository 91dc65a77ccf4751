//! submission_queue tool implementation.
//!
//! Lists the pending contact submissions and optionally queues a new one,
//! the way a page does when the contact form is sent offline.

use pawcache_client::ServiceWorker;
use pawcache_core::PendingSubmission;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::error::ToolError;

/// Parameters for the submission_queue tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SubmissionQueueParams {
    /// Submission to queue: an object with an "id" (number or string) and form fields.
    #[serde(default)]
    pub enqueue: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionQueueOutput {
    pub pending: Vec<PendingSubmission>,
}

pub async fn queue_impl(worker: &ServiceWorker, params: SubmissionQueueParams) -> Result<CallToolResult, McpError> {
    if let Some(value) = params.enqueue {
        let submission: PendingSubmission = serde_json::from_value(value)
            .map_err(|e| ToolError::InvalidInput(format!("submission must be an object with an id: {e}")))?;
        let queued = worker.db().enqueue_submission(submission).await?;
        tracing::info!(queued, "contact submission queued");
    }

    let pending = worker.db().pending_submissions().await?;
    json_result(&SubmissionQueueOutput { pending })
}

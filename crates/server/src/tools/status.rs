//! worker_status tool implementation.

use pawcache_client::ServiceWorker;
use rmcp::{ErrorData as McpError, model::CallToolResult};

use super::json_result;

pub async fn status_impl(worker: &ServiceWorker) -> Result<CallToolResult, McpError> {
    let status = worker.status().await?;
    json_result(&status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{output_json, worker};

    #[tokio::test]
    async fn test_status_of_fresh_worker() {
        let worker = worker().await;
        let output = output_json(&status_impl(&worker).await.unwrap());
        assert_eq!(output["state"], "parsed");
        assert_eq!(output["cache_name"], "cuidadoresvip-cache-v1");
        assert_eq!(output["entries"], 0);
        assert_eq!(output["pending_submissions"], 0);
    }
}

//! MCP server handler implementation.
//!
//! This module defines the main server handler that routes tool calls to the
//! worker. Each worker trigger is one tool.
use std::sync::Arc;

use pawcache_client::ServiceWorker;
use pawcache_core::AppConfig;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

use crate::tools::{
    cache::{CacheGetParams, get_impl},
    contact::{ContactLinkParams, contact_link_impl},
    fetch::{WorkerFetchParams, fetch_impl},
    lifecycle::{activate_impl, install_impl},
    message::{WorkerMessageParams, message_impl},
    status::status_impl,
    submission::{SubmissionQueueParams, queue_impl},
    sync::{WorkerSyncParams, sync_impl},
};

/// The main MCP server handler for pawcache.
#[derive(Clone)]
pub struct PawcacheServer {
    worker: Arc<ServiceWorker>,
    config: Arc<AppConfig>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
#[tool_router]
impl PawcacheServer {
    pub fn new(worker: Arc<ServiceWorker>, config: Arc<AppConfig>) -> Self {
        Self { worker, config, tool_router: Self::tool_router() }
    }

    #[tool(description = "Install the worker: precache the manifest into the current cache generation. Fails if any URL cannot be fetched.")]
    async fn worker_install(&self) -> Result<CallToolResult, McpError> {
        install_impl(&self.worker).await
    }

    #[tool(description = "Activate the installed worker: delete every other cache generation and start intercepting fetches.")]
    async fn worker_activate(&self) -> Result<CallToolResult, McpError> {
        activate_impl(&self.worker).await
    }

    /// Offer a request to the worker.
    ///
    /// Returns the strategy chosen and the response, or `intercepted: false`
    /// when the worker leaves the request to the network.
    #[tool(description = "Offer a request to the worker as a page would. Returns the routing strategy and the response; bodies are UTF-8 text or base64.")]
    async fn worker_fetch(&self, params: Parameters<WorkerFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.worker, params.0).await
    }

    #[tool(description = "Fire a background sync event. The contact-form tag delivers queued contact submissions.")]
    async fn worker_sync(&self, params: Parameters<WorkerSyncParams>) -> Result<CallToolResult, McpError> {
        sync_impl(&self.worker, params.0).await
    }

    #[tool(description = "Post a message to the worker, e.g. {\"type\": \"SKIP_WAITING\"}.")]
    async fn worker_message(&self, params: Parameters<WorkerMessageParams>) -> Result<CallToolResult, McpError> {
        message_impl(&self.worker, params.0).await
    }

    #[tool(description = "Report worker state, cache generations, entry count and pending submissions.")]
    async fn worker_status(&self) -> Result<CallToolResult, McpError> {
        status_impl(&self.worker).await
    }

    #[tool(description = "Look up a stored response by URL and method in a cache generation.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.worker, params.0).await
    }

    #[tool(description = "List pending contact submissions, optionally queueing a new one first.")]
    async fn submission_queue(&self, params: Parameters<SubmissionQueueParams>) -> Result<CallToolResult, McpError> {
        queue_impl(&self.worker, params.0).await
    }

    #[tool(description = "Validate contact form fields and build the WhatsApp link with the formatted request message.")]
    async fn contact_link(&self, params: Parameters<ContactLinkParams>) -> Result<CallToolResult, McpError> {
        contact_link_impl(&self.config, params.0).await
    }
}

impl ServerHandler for PawcacheServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "pawcache".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

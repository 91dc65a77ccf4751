//! MCP tool implementations.
//!
//! Each worker trigger is one tool; outputs are pretty-printed JSON text.

pub mod cache;
pub mod contact;
pub mod fetch;
pub mod lifecycle;
pub mod message;
pub mod status;
pub mod submission;
pub mod sync;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;

/// How a response body is carried in tool output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum BodyEncoding {
    Utf8,
    Base64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EncodedBody {
    pub encoding: BodyEncoding,
    pub data: String,
}

/// UTF-8 text when valid, base64 otherwise.
pub fn encode_body(bytes: &[u8]) -> EncodedBody {
    match std::str::from_utf8(bytes) {
        Ok(text) => EncodedBody { encoding: BodyEncoding::Utf8, data: text.to_string() },
        Err(_) => EncodedBody { encoding: BodyEncoding::Base64, data: STANDARD.encode(bytes) },
    }
}

pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output).map_err(|e| ToolError::EncodeFailed(e.to_string()))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

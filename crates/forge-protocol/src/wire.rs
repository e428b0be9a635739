// crates/forge-protocol/src/wire.rs
// ============================================================================
// Module: Wire Types
// Description: JSON-RPC 2.0 request/response shapes for the tool-invocation
//              protocol.
// Purpose: Give every crate that speaks the protocol one shared, typed view
//          of the wire format (§4.3, §6).
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! These types mirror the JSON-RPC envelope described in §4.3/§6: a
//! `tools/call` request carries a tool name and argument object; the
//! response carries either a `result` (with `content` and an optional
//! `structured` payload) or an `error`. Framing (how a message maps onto
//! bytes on the wire) is a separate concern, handled by
//! [`crate::framing`].

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// The JSON-RPC protocol version tag used on every message.
pub const JSONRPC_VERSION: &str = "2.0";

/// A `tools/call` request envelope.
///
/// # Invariants
/// - `id` is unique within one Tool Client session and strictly increasing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Always [`JSONRPC_VERSION`].
    pub jsonrpc: String,
    /// Request identifier, echoed back on the response.
    pub id: u64,
    /// Always `"tools/call"`.
    pub method: String,
    /// Call parameters.
    pub params: ToolCallParams,
}

impl ToolCallRequest {
    /// Builds a `tools/call` request for `tool` with `arguments`.
    #[must_use]
    pub fn new(id: u64, tool: impl Into<String>, arguments: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: "tools/call".to_string(),
            params: ToolCallParams { name: tool.into(), arguments },
        }
    }
}

/// Parameters of a `tools/call` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallParams {
    /// The tool to invoke.
    pub name: String,
    /// Tool arguments, merged with injected sub-engine config (§4.4).
    pub arguments: Value,
}

/// A JSON-RPC response envelope, generic over request/response pairing by
/// `id`.
///
/// # Invariants
/// - Exactly one of `result`/`error` is populated in a well-formed response;
///   a response with neither is treated as [`crate::ToolClientError::ProtocolMalformed`]
///   by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallResponse {
    /// Echoed request identifier.
    pub id: u64,
    /// The call's result, when successful.
    #[serde(default)]
    pub result: Option<ToolCallResult>,
    /// The call's error, when the engine reported a protocol-level failure.
    #[serde(default)]
    pub error: Option<JsonRpcErrorObject>,
}

/// A JSON-RPC error object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcErrorObject {
    /// Numeric error code (not interpreted beyond display).
    #[serde(default)]
    pub code: i64,
    /// Human-readable error message.
    pub message: String,
}

/// The `result` object of a successful `tools/call` response (§6).
///
/// # Invariants
/// - `structured`, when present, is the preferred machine-readable payload;
///   `content` is the always-present, human-readable fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallResult {
    /// Free-form text content blocks.
    #[serde(default)]
    pub content: Vec<ToolContent>,
    /// Whether the engine is signaling a domain-level (not protocol-level)
    /// error via its content text.
    #[serde(default, rename = "isError")]
    pub is_error: bool,
    /// Machine-readable structured payload, when the engine provides one.
    #[serde(default)]
    pub structured: Option<Value>,
}

impl ToolCallResult {
    /// Concatenates every text content block with `\n`.
    #[must_use]
    pub fn text(&self) -> String {
        self.content.iter().map(|block| block.text.as_str()).collect::<Vec<_>>().join("\n")
    }
}

/// One content block of a `tools/call` result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolContent {
    /// Content kind, e.g. `"text"`.
    #[serde(rename = "type", default)]
    pub content_type: String,
    /// The text payload.
    #[serde(default)]
    pub text: String,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions")]

    use super::*;

    #[test]
    fn request_serializes_expected_envelope() {
        let request = ToolCallRequest::new(3, "build", serde_json::json!({"name": "app"}));
        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["id"], 3);
        assert_eq!(value["method"], "tools/call");
        assert_eq!(value["params"]["name"], "build");
    }

    #[test]
    fn response_parses_structured_result() {
        let raw = serde_json::json!({
            "id": 1,
            "result": {
                "content": [{"type": "text", "text": "ok"}],
                "structured": {"name": "app", "type": "binary"}
            }
        });
        let response: ToolCallResponse = serde_json::from_value(raw).expect("deserialize");
        let result = response.result.expect("result");
        assert_eq!(result.text(), "ok");
        assert_eq!(result.structured.expect("structured")["type"], "binary");
        assert!(!result.is_error);
    }

    #[test]
    fn response_parses_error_object() {
        let raw = serde_json::json!({
            "id": 1,
            "error": {"code": -32000, "message": "boom"}
        });
        let response: ToolCallResponse = serde_json::from_value(raw).expect("deserialize");
        assert_eq!(response.error.expect("error").message, "boom");
    }
}

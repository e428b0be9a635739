// crates/forge-host/src/host.rs
// ============================================================================
// Module: Tool Host
// Description: The stdio serve loop, the server-side mirror of
//              `forge_protocol::ToolClient`.
// Purpose: Read one framed `tools/call` request at a time from stdin,
//          dispatch it to a registered handler inside `InProtocolMode`, and
//          write one framed response to stdout (§4.8).
// Dependencies: forge-core, forge-protocol, tokio
// ============================================================================

//! ## Overview
//! A [`ToolHost`] owns a [`ToolRegistry`] and drives [`ToolHost::serve_stdio`]:
//! the single stdio loop an engine binary runs for its whole lifetime. Each
//! iteration reads one frame, resolves it against the registry, and always
//! writes exactly one response frame back, even when the tool or the
//! request itself was malformed — a malformed request still gets a
//! JSON-RPC error response when an `id` can be recovered, since the client
//! is blocked waiting for a reply with that id.

use std::sync::Arc;

use forge_core::Logger;
use forge_core::NullLogger;
use forge_protocol::JsonRpcErrorObject;
use forge_protocol::ToolCallRequest;
use forge_protocol::ToolCallResponse;
use forge_protocol::ToolCallResult;
use forge_protocol::ToolContent;
use forge_protocol::read_frame;
use forge_protocol::write_frame;
use tokio::io::AsyncBufRead;
use tokio::io::AsyncWrite;

use crate::error::HostError;
use crate::protocol_mode::InProtocolMode;
use crate::tool::ToolHandler;
use crate::tool::ToolOutcome;
use crate::tool::ToolRegistry;

/// Serves registered tools over stdio, one request at a time.
pub struct ToolHost {
    /// The name-keyed table of registered tools.
    registry: ToolRegistry,
    /// Diagnostic sink for malformed-request and handler-failure logging.
    logger: Arc<dyn Logger>,
}

impl ToolHost {
    /// Builds a host with an empty registry and a [`NullLogger`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: ToolRegistry::new(),
            logger: Arc::new(NullLogger),
        }
    }

    /// Replaces the diagnostic sink used for malformed-request and
    /// handler-failure logging.
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Gives mutable access to the tool registry for registration.
    pub fn registry_mut(&mut self) -> &mut ToolRegistry {
        &mut self.registry
    }

    /// Runs the serve loop until `reader` reaches EOF.
    ///
    /// Every line is handled independently: a parse failure or handler
    /// error produces an error response rather than aborting the loop, so
    /// one bad request does not take down the whole engine process.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Io`] if reading or writing a frame fails at the
    /// transport level; per-request failures are reported to the caller as
    /// response frames, not as an `Err` from this function.
    pub async fn serve_stdio<R, W>(&self, reader: &mut R, writer: &mut W) -> Result<(), HostError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        loop {
            let Some(line) = read_frame(reader).await? else {
                return Ok(());
            };
            let response = self.handle_line(&line).await;
            let payload = serde_json::to_vec(&response).unwrap_or_else(|_| {
                br#"{"id":0,"error":{"code":-32000,"message":"response serialization failed"}}"#
                    .to_vec()
            });
            write_frame(writer, &payload).await?;
        }
    }

    /// Parses and dispatches a single request line, always producing a
    /// response (never propagating a transport-level error from here).
    async fn handle_line(&self, line: &[u8]) -> ToolCallResponse {
        let request: ToolCallRequest = match serde_json::from_slice(line) {
            Ok(request) => request,
            Err(error) => {
                self.logger.warn(&format!("malformed request: {error}"));
                return ToolCallResponse {
                    id: 0,
                    result: None,
                    error: Some(JsonRpcErrorObject {
                        code: -32700,
                        message: format!("malformed request: {error}"),
                    }),
                };
            }
        };

        match self.dispatch(&request).await {
            Ok(result) => ToolCallResponse {
                id: request.id,
                result: Some(result),
                error: None,
            },
            Err(error) => {
                self.logger.warn(&format!("tool call failed: {error}"));
                ToolCallResponse {
                    id: request.id,
                    result: None,
                    error: Some(JsonRpcErrorObject {
                        code: -32000,
                        message: error.to_string(),
                    }),
                }
            }
        }
    }

    /// Looks up and runs the handler for `request`, scoped by
    /// [`InProtocolMode`] for the duration of the call.
    async fn dispatch(&self, request: &ToolCallRequest) -> Result<ToolCallResult, HostError> {
        let tool = request.params.name.clone();
        let Some(definition) = self.registry.get(&tool) else {
            return Err(HostError::UnknownTool { name: tool });
        };

        let _guard = InProtocolMode::enter();
        let outcome = definition
            .handler
            .call(request.params.arguments.clone())
            .await
            .map_err(|message| HostError::HandlerFailed {
                tool: tool.clone(),
                message,
            })?;

        Ok(match outcome {
            ToolOutcome::Structured(value) => ToolCallResult {
                content: Vec::new(),
                is_error: false,
                structured: Some(value),
            },
            ToolOutcome::Text(text) => ToolCallResult {
                content: vec![ToolContent {
                    content_type: "text".to_owned(),
                    text,
                }],
                is_error: false,
                structured: None,
            },
        })
    }
}

impl Default for ToolHost {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions")]

    use std::io::Cursor;

    use async_trait::async_trait;
    use serde_json::Value;

    use super::*;

    struct Echo;

    #[async_trait]
    impl ToolHandler for Echo {
        async fn call(&self, arguments: Value) -> Result<ToolOutcome, String> {
            Ok(ToolOutcome::Structured(arguments))
        }
    }

    struct Fails;

    #[async_trait]
    impl ToolHandler for Fails {
        async fn call(&self, _arguments: Value) -> Result<ToolOutcome, String> {
            Err("kaboom".to_owned())
        }
    }

    fn host_with(name: &str, handler: Arc<dyn ToolHandler>) -> ToolHost {
        let mut host = ToolHost::new();
        host.registry_mut().register(name, "test tool", handler);
        host
    }

    async fn run_one(host: &ToolHost, request: &str) -> Value {
        let mut reader = Cursor::new(format!("{request}\n").into_bytes());
        let mut writer = Vec::new();
        host.serve_stdio(&mut reader, &mut writer).await.expect("serve");
        let line = writer.strip_suffix(b"\n").unwrap_or(&writer);
        serde_json::from_slice(line).expect("valid json response")
    }

    #[tokio::test]
    async fn dispatches_to_registered_handler_and_returns_structured_result() {
        let host = host_with("echo", Arc::new(Echo));
        let response =
            run_one(&host, r#"{"jsonrpc":"2.0","id":7,"method":"tools/call","params":{"name":"echo","arguments":{"x":1}}}"#)
                .await;
        assert_eq!(response["id"], 7);
        assert_eq!(response["result"]["structured"]["x"], 1);
    }

    #[tokio::test]
    async fn unknown_tool_produces_error_response_with_matching_id() {
        let host = ToolHost::new();
        let response =
            run_one(&host, r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"missing","arguments":{}}}"#)
                .await;
        assert_eq!(response["id"], 3);
        assert!(response["error"]["message"].as_str().expect("message").contains("missing"));
    }

    #[tokio::test]
    async fn handler_failure_produces_error_response() {
        let host = host_with("boom", Arc::new(Fails));
        let response =
            run_one(&host, r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"boom","arguments":{}}}"#)
                .await;
        assert!(response["error"]["message"].as_str().expect("message").contains("kaboom"));
    }

    #[tokio::test]
    async fn malformed_request_still_produces_an_error_response() {
        let mut reader = Cursor::new(b"not json\n".to_vec());
        let mut writer = Vec::new();
        let host = ToolHost::new();
        host.serve_stdio(&mut reader, &mut writer).await.expect("serve");
        let line = writer.strip_suffix(b"\n").unwrap_or(&writer);
        let response: Value = serde_json::from_slice(line).expect("valid json response");
        assert!(response["error"]["message"].as_str().expect("message").contains("malformed"));
    }

    #[tokio::test]
    async fn empty_input_closes_cleanly_without_writing_anything() {
        let mut reader = Cursor::new(Vec::new());
        let mut writer = Vec::new();
        let host = ToolHost::new();
        host.serve_stdio(&mut reader, &mut writer).await.expect("serve");
        assert!(writer.is_empty());
    }
}

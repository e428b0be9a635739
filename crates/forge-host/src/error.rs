// crates/forge-host/src/error.rs
// ============================================================================
// Module: Host Error Taxonomy
// Description: Errors surfaced by the tool-serving side of the protocol.
// Purpose: Distinguish routing failures from handler failures from framing
//          failures so `serve_stdio` can report each as a JSON-RPC error
//          object instead of tearing down the process.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Mirrors `forge_protocol::ToolClientError`'s shape from the other side of
//! the pipe: every variant here names a reason a single tool call failed to
//! produce a result, never a reason the whole server should exit.

use thiserror::Error;

/// Failure modes for a single tool invocation handled by [`crate::host::ToolHost`].
#[derive(Debug, Error)]
pub enum HostError {
    /// The request named a tool the host never registered.
    #[error("unknown tool: {name}")]
    UnknownTool {
        /// The requested tool name.
        name: String,
    },

    /// The handler itself returned an error.
    #[error("tool '{tool}' failed: {message}")]
    HandlerFailed {
        /// The tool that was invoked.
        tool: String,
        /// The handler's error message, carried into the response's `error.message`.
        message: String,
    },

    /// A request line could not be parsed as a tool-call envelope.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// Reading or writing a framed line failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer closed stdin before a request line arrived.
    #[error("stdin closed")]
    StdinClosed,
}

// crates/forge-protocol/src/error.rs
// ============================================================================
// Module: Tool Client Error
// Description: Error taxonomy for the tool-invocation protocol client.
// Purpose: Map 1:1 onto the protocol-layer entries of §7's error taxonomy.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! [`ToolClientError`] covers every way a call to a child engine can fail:
//! the process could not be spawned, it exited before answering, it wrote a
//! line the client could not parse as JSON-RPC, it reported a domain error,
//! or the call was cancelled or timed out (§7).

use std::time::Duration;

use thiserror::Error;

/// Errors produced while driving a child engine through the tool-invocation
/// protocol.
///
/// # Invariants
/// - Every variant carries the engine's command or URI-derived label so a
///   caller can build a cause chain that names where in the pipeline the
///   failure occurred (§7).
#[derive(Debug, Error)]
pub enum ToolClientError {
    /// The child process could not be started.
    #[error("failed to spawn engine {engine}: {source}")]
    Spawn {
        /// The engine's command or URI label.
        engine: String,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },
    /// An I/O error occurred while writing to or reading from the child.
    #[error("io error talking to engine {engine}: {source}")]
    Io {
        /// The engine's command or URI label.
        engine: String,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },
    /// The request could not be serialized to JSON.
    #[error("failed to serialize request for engine {engine}: {source}")]
    Serialize {
        /// The engine's command or URI label.
        engine: String,
        /// Underlying serialization error.
        #[source]
        source: serde_json::Error,
    },
    /// The child exited before sending a response to a pending request.
    #[error("engine {engine} exited before responding to request {id}")]
    ProtocolAborted {
        /// The engine's command or URI label.
        engine: String,
        /// The request id that never received a response.
        id: u64,
    },
    /// The child wrote a line on stdout that is not valid JSON-RPC, or a
    /// response whose `id` does not match any pending request.
    #[error("engine {engine} sent a malformed protocol line: {line_prefix}")]
    ProtocolMalformed {
        /// The engine's command or URI label.
        engine: String,
        /// A bounded-length prefix of the offending line, for diagnostics.
        line_prefix: String,
    },
    /// The engine's response carried `isError: true`.
    #[error("engine {engine} reported an error calling tool {tool}: {message}")]
    ToolReportedError {
        /// The engine's command or URI label.
        engine: String,
        /// The tool that was called.
        tool: String,
        /// The concatenated `content[].text` message.
        message: String,
    },
    /// The call was cancelled via the pipeline's cancellation context.
    #[error("call to engine {engine} was cancelled")]
    Cancelled {
        /// The engine's command or URI label.
        engine: String,
    },
    /// The call exceeded its configured timeout.
    #[error("call to engine {engine} timed out after {timeout:?}")]
    TimedOut {
        /// The engine's command or URI label.
        engine: String,
        /// The configured timeout that elapsed.
        timeout: Duration,
    },
}

// crates/forge-invoker/src/error.rs
// ============================================================================
// Module: Invoker Error
// Description: Error taxonomy for the Engine Invoker.
// Purpose: Wrap the Tool Client's own error taxonomy without re-stringifying
//          it (§7). Resolution failures belong to `forge-resolver` and are
//          surfaced before a caller ever reaches this crate, since
//          `EngineInvoker` operates on an already-resolved sub-engine.
// Dependencies: thiserror, forge-protocol
// ============================================================================

use thiserror::Error;

/// Errors produced while invoking a resolved sub-engine.
#[derive(Debug, Error)]
pub enum InvokerError {
    /// The tool call itself failed (spawn, protocol, timeout, cancellation).
    #[error(transparent)]
    Call(#[from] forge_protocol::ToolClientError),
}

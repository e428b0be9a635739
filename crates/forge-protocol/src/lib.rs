// crates/forge-protocol/src/lib.rs
// ============================================================================
// Module: Forge Protocol
// Description: The line-delimited tool-invocation protocol client.
// Purpose: Speak §4.3/§6's wire format to child engines: frame requests,
//          parse responses, forward stderr, enforce cancellation/timeouts.
// Dependencies: forge-core, tokio
// ============================================================================

//! ## Overview
//! `forge-protocol` is the only crate that spawns a child engine process and
//! talks JSON-RPC to it. `forge-invoker` builds on top of [`ToolClient`] to
//! add URI resolution and config injection; `forge-host` is this protocol's
//! server-side counterpart for worker implementers.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod client;
pub mod error;
pub mod framing;
pub mod wire;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use client::DEFAULT_GRACE_PERIOD;
pub use client::TOOL_TIMEOUT_ENV;
pub use client::ToolClient;
pub use error::ToolClientError;
pub use framing::read_frame;
pub use framing::write_frame;
pub use wire::JSONRPC_VERSION;
pub use wire::JsonRpcErrorObject;
pub use wire::ToolCallParams;
pub use wire::ToolCallRequest;
pub use wire::ToolCallResponse;
pub use wire::ToolCallResult;
pub use wire::ToolContent;

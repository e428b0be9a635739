// crates/forge-host/src/lib.rs
// ============================================================================
// Module: Forge Host
// Description: Server-side library for engine implementers.
// Purpose: Give a `go://` worker binary tool registration and a stdio serve
//          loop without hand-rolling JSON-RPC framing or stdout discipline.
// Dependencies: forge-core, forge-protocol, tokio
// ============================================================================

//! ## Overview
//! `forge-host` is `forge-protocol`'s server-side counterpart: where
//! [`forge_protocol::ToolClient`] drives a child process from the
//! orchestrator side, [`ToolHost`] is what that child process links against
//! to answer `tools/call` requests. An engine binary built on this crate
//! registers its tools, then calls [`ToolHost::serve_stdio`] against
//! `tokio::io::BufReader::new(tokio::io::stdin())`/`tokio::io::stdout()` and
//! never touches framing or stdout-routing concerns directly.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod error;
pub mod host;
pub mod protocol_mode;
pub mod tool;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use error::HostError;
pub use host::ToolHost;
pub use protocol_mode::InProtocolMode;
pub use protocol_mode::is_in_protocol_mode;
pub use protocol_mode::protocol_safe_command;
pub use tool::ToolDefinition;
pub use tool::ToolHandler;
pub use tool::ToolOutcome;
pub use tool::ToolRegistry;

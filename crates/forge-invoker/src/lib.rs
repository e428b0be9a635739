// crates/forge-invoker/src/lib.rs
// ============================================================================
// Module: Forge Invoker
// Description: Engine Invoker for the Forge engine orchestration kernel.
// Purpose: Spawn an already-resolved sub-engine, send one tool call with its
//          declared config injected, and parse the result into a typed
//          `InvocationResult` (§4.4, §4.4.1).
// Dependencies: forge-core, forge-protocol, forge-resolver
// ============================================================================

//! ## Overview
//! `forge-invoker` sits between `forge-resolver` (URI → runnable sub-engine)
//! and `forge-orchestrator` (pipeline composition over multiple
//! sub-engines). It owns two concerns: merging a sub-engine's declared
//! configuration into a call's JSON arguments (§4.4), and turning a tool
//! call's loosely-typed response into the [`InvocationResult`] shape its
//! caller expects (§4.4.1).

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config_injection;
pub mod error;
pub mod invoker;
pub mod result;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use error::InvokerError;
pub use invoker::EngineInvoker;
pub use result::InvocationResult;
pub use result::parse_build_result;
pub use result::parse_run_result;
pub use result::parse_testenv_create_result;

// crates/forge-orchestrator/src/lib.rs
// ============================================================================
// Module: Forge Orchestrator
// Description: Pipeline composition over resolved sub-engines for the Forge
//              engine orchestration kernel.
// Purpose: Run the Builder, Test-Runner, and Testenv pipelines (§4.5, §4.6,
//          §4.7) on top of `forge-resolver`'s resolutions and
//          `forge-invoker`'s single-call plumbing.
// Dependencies: forge-core, forge-invoker, forge-resolver, forge-store, rand
// ============================================================================

//! ## Overview
//! `forge-orchestrator` is the layer that turns one manifest stage into a
//! sequence of tool calls: it decides call order, merges results, and
//! decides what counts as fail-fast versus a recoverable per-item failure.
//! It does not spawn processes itself (`forge-invoker` does) and does not
//! resolve engine URIs itself (`forge-resolver` does); it composes both.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod builder;
pub mod dirs;
pub mod error;
pub mod test_runner;
pub mod testenv;
pub mod version;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use builder::BuilderOrchestrator;
pub use dirs::EngineDirs;
pub use dirs::sub_engine_timeout;
pub use error::OrchestratorError;
pub use test_runner::TestRunnerOrchestrator;
pub use testenv::TestenvOrchestrator;
pub use version::GitHeadVersionProvider;
pub use version::StaticVersionProvider;
pub use version::VersionError;
pub use version::VersionProvider;

// crates/forge-resolver/src/lib.rs
// ============================================================================
// Module: Forge Resolver
// Description: Engine URI resolution for the Forge engine orchestration kernel.
// Purpose: Turn `go://`, `alias://`, `shell://` references into runnable
//          commands, per §4.2.
// Dependencies: forge-core
// ============================================================================

//! ## Overview
//! `forge-resolver` sits between `forge-config` (which loads and structurally
//! validates a manifest) and `forge-invoker` (which spawns and calls a
//! resolved engine). It owns exactly one concern: given an [`EngineUri`] and
//! a manifest, produce the ordered list of `(command, argv, config)` sub-
//! engines a caller must invoke.
//!
//! [`EngineUri`]: forge_core::EngineUri

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod error;
pub mod locator;
pub mod resolver;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use error::ResolverError;
pub use locator::LocatorError;
pub use locator::PathWorkerLocator;
pub use locator::StaticWorkerLocator;
pub use locator::WorkerLocator;
pub use resolver::ResolvedSubEngine;
pub use resolver::ResolvedTestenvSubEngine;
pub use resolver::Resolver;

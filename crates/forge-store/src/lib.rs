// crates/forge-store/src/lib.rs
// ============================================================================
// Module: Forge Store
// Description: Durable Artifact Store for the Forge engine orchestration kernel.
// Purpose: Load, prune, and persist the project's artifacts, test
//          environments, and test reports as a single YAML file (§4.1).
// Dependencies: forge-core, serde_yaml, time
// ============================================================================

//! ## Overview
//! `forge-store` owns the Artifact Store file contract described in §3/§4.1:
//! a versioned catalog of artifacts, test environments, and test reports
//! with bounded retention on artifacts and concurrent-safe, in-process
//! read/modify/write semantics. Orchestrators hold one [`ArtifactStore`]
//! handle per project and never touch the file directly.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod document;
pub mod error;
pub mod prune;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use document::ArtifactStoreDocument;
pub use document::STORE_VERSION;
pub use error::StoreError;
pub use prune::DEFAULT_RETENTION;
pub use prune::prune;
pub use store::ArtifactStore;
pub use store::load;
pub use store::load_or_create;
pub use store::save;

// crates/forge-config/src/lib.rs
// ============================================================================
// Module: Forge Config
// Description: Manifest loading and structural validation.
// Purpose: The single source of truth for turning a `forge.yaml` file on
//          disk into a validated `ForgeManifest` (§3.1).
// Dependencies: forge-core, serde_yaml
// ============================================================================

//! ## Overview
//! `forge-config` owns the manifest's on-disk lifecycle; the manifest's
//! in-memory shape itself (`ForgeManifest` and friends) lives in
//! `forge-core` so that crates which only need the types (not the loader)
//! don't pull in file-I/O and YAML-parsing dependencies.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod error;
pub mod loader;
pub mod validate;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use error::ManifestError;
pub use loader::load;
pub use validate::validate;

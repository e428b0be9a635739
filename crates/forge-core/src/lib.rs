// crates/forge-core/src/lib.rs
// ============================================================================
// Module: Forge Core
// Description: Shared data model for the Forge engine orchestration kernel.
// Purpose: Define artifacts, test environments, test reports, manifest types,
//          and engine URIs used across every other Forge crate.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! `forge-core` is the leaf crate of the Forge workspace: it defines the wire
//! and in-memory shapes of artifacts, test environments, test reports, and
//! the project manifest, plus the `EngineUri` addressing scheme used to
//! reference `go://`, `alias://`, and `shell://` engines. No module here
//! spawns processes or touches the filesystem; those concerns live in
//! `forge-store`, `forge-resolver`, and `forge-protocol`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod artifact;
pub mod cancellation;
pub mod logging;
pub mod manifest;
pub mod report;
pub mod testenv;
pub mod time;
pub mod uri;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use artifact::Artifact;
pub use artifact::ArtifactKey;
pub use cancellation::CancellationToken;
pub use logging::LogLevel;
pub use logging::Logger;
pub use logging::NullLogger;
pub use logging::StderrLogger;
pub use logging::prefixed;
pub use manifest::BuildSpec;
pub use manifest::EngineConfig;
pub use manifest::EngineRole;
pub use manifest::ForgeManifest;
pub use manifest::SubEngineConfigSpec;
pub use manifest::SubEngineSpec;
pub use manifest::TestSpec;
pub use manifest::TestenvSubEngineSpec;
pub use report::Coverage;
pub use report::ReportStatus;
pub use report::TestReport;
pub use report::TestStats;
pub use testenv::TestEnvStatus;
pub use testenv::TestEnvironment;
pub use time::format_rfc3339;
pub use time::now_rfc3339;
pub use time::parse_rfc3339;
pub use uri::EngineUri;
pub use uri::EngineUriError;

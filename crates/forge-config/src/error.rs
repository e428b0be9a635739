// crates/forge-config/src/error.rs
// ============================================================================
// Module: Manifest Error
// Description: Error taxonomy for manifest loading and validation.
// Purpose: Fail closed on I/O, parse, and structural-validity failures (§7
//          `ManifestInvalid`), mirroring the teacher's flat Io/Parse/Invalid
//          config-error shape rather than inventing a variant per check.
// Dependencies: thiserror
// ============================================================================

use thiserror::Error;

/// Failure modes for [`crate::loader::load`].
#[derive(Debug, Error)]
pub enum ManifestError {
    /// I/O failure while locating or reading the manifest file.
    #[error("manifest io error: {0}")]
    Io(String),
    /// The file could not be parsed as YAML matching [`forge_core::ForgeManifest`].
    #[error("manifest parse error: {0}")]
    Parse(String),
    /// The manifest parsed but fails a structural-validity rule (§9: empty
    /// sub-engine list, alias cycle, duplicate alias, oversized path).
    #[error("invalid manifest: {0}")]
    Invalid(String),
}

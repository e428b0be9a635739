// crates/forge-config/src/loader.rs
// ============================================================================
// Module: Manifest Loader
// Description: Reads and parses the project manifest from disk.
// Purpose: Strict, fail-closed loading: path/size/encoding limits, then YAML
//          parse, then structural validation, mirroring
//          `DecisionGateConfig::load`'s resolve → validate-path → read →
//          size-check → utf8-check → parse → validate pipeline.
// Dependencies: forge-core, serde_yaml, std::{env,fs}
// ============================================================================

//! ## Overview
//! [`load`] is the single entry point worker and CLI code uses to turn a
//! path (or the default manifest location) into a validated
//! [`ForgeManifest`]. Every failure mode — a missing file, a path that's
//! absurdly long, a non-UTF-8 byte, malformed YAML, or a structurally
//! invalid engine graph — comes back as a [`ManifestError`] rather than a
//! panic, since a manifest is operator-authored, untrusted input.

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use forge_core::ForgeManifest;

use crate::error::ManifestError;
use crate::validate;

/// Default manifest filename when no path is given.
const DEFAULT_MANIFEST_NAME: &str = "forge.yaml";
/// Environment variable used to override the manifest path.
const MANIFEST_ENV_VAR: &str = "FORGE_MANIFEST";
/// Maximum manifest file size in bytes.
const MAX_MANIFEST_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

/// Loads and validates the project manifest.
///
/// Resolution order: `path` if given, else `$FORGE_MANIFEST`, else
/// [`DEFAULT_MANIFEST_NAME`] in the current directory.
///
/// # Errors
///
/// Returns [`ManifestError::Io`] if the file cannot be read,
/// [`ManifestError::Invalid`] if the path or file violates a size/encoding
/// limit or the parsed manifest fails structural validation (§9), and
/// [`ManifestError::Parse`] if the file is not valid YAML matching
/// [`ForgeManifest`]'s shape.
pub fn load(path: Option<&Path>) -> Result<ForgeManifest, ManifestError> {
    let resolved = resolve_path(path)?;
    validate_path(&resolved)?;
    let bytes = fs::read(&resolved).map_err(|err| ManifestError::Io(err.to_string()))?;
    if bytes.len() > MAX_MANIFEST_FILE_SIZE {
        return Err(ManifestError::Invalid("manifest file exceeds size limit".to_string()));
    }
    let content = std::str::from_utf8(&bytes)
        .map_err(|_| ManifestError::Invalid("manifest file must be utf-8".to_string()))?;
    let manifest: ForgeManifest =
        serde_yaml::from_str(content).map_err(|err| ManifestError::Parse(err.to_string()))?;
    validate::validate(&manifest)?;
    Ok(manifest)
}

/// Resolves the manifest path from the explicit argument, the environment,
/// or the default filename, in that order.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ManifestError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(MANIFEST_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ManifestError::Invalid("manifest path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_MANIFEST_NAME))
}

/// Validates the resolved path's overall and per-component length.
fn validate_path(path: &Path) -> Result<(), ManifestError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ManifestError::Invalid("manifest path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ManifestError::Invalid("manifest path component too long".to_string()));
        }
    }
    Ok(())
}

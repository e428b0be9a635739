// crates/forge-orchestrator/src/version.rs
// ============================================================================
// Module: Version Provider
// Description: Stamps a Builder Orchestrator run with a project version.
// Purpose: Implement §6's "version provider" external collaborator contract
//          and §6.2's two shipped implementations.
// Dependencies: std::process (git), thiserror
// ============================================================================

//! ## Overview
//! When a build isn't given an explicit version, the Builder Orchestrator
//! asks a [`VersionProvider`] for one so every builder in the run shares the
//! same stamp (§4.5). [`GitHeadVersionProvider`] shells out to `git`;
//! [`StaticVersionProvider`] is for manifests or tests that pin a fixed
//! value.

use std::path::Path;
use std::process::Command;
use std::process::ExitStatus;
use std::process::Stdio;

use thiserror::Error;

/// Errors produced while resolving a project version.
#[derive(Debug, Error)]
pub enum VersionError {
    /// The version-resolving command could not be started.
    #[error("failed to spawn version provider command: {0}")]
    Spawn(#[source] std::io::Error),
    /// The version-resolving command exited non-zero.
    #[error("version provider command exited with {status}")]
    ExitStatus {
        /// The command's exit status.
        status: ExitStatus,
    },
    /// The command's output was not valid UTF-8.
    #[error("version provider produced non-utf8 output")]
    NonUtf8,
    /// The command produced an empty version string.
    #[error("version provider produced an empty version string")]
    Empty,
}

/// Resolves a project version given its root directory.
///
/// # Invariants
/// - A successful resolution returns a non-empty, opaque string; this
///   crate never parses or validates its structure (§6).
pub trait VersionProvider: Send + Sync {
    /// Resolves the version, failing if none can be determined.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError`] when the underlying source cannot produce a
    /// version.
    fn resolve(&self, root_dir: &Path) -> Result<String, VersionError>;
}

/// Resolves the project version from `git rev-parse --short HEAD`.
///
/// # Invariants
/// - The child's stdout is captured, not inherited; its stderr is
///   discarded rather than inherited, keeping the parent's own stdout (and
///   terminal) free of `git`'s diagnostic chatter (§2.1 stdout discipline,
///   generalized here to every subprocess the kernel spawns directly).
#[derive(Debug, Clone, Copy, Default)]
pub struct GitHeadVersionProvider;

impl VersionProvider for GitHeadVersionProvider {
    fn resolve(&self, root_dir: &Path) -> Result<String, VersionError> {
        let output = Command::new("git")
            .args(["rev-parse", "--short", "HEAD"])
            .current_dir(root_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .map_err(VersionError::Spawn)?;
        if !output.status.success() {
            return Err(VersionError::ExitStatus { status: output.status });
        }
        let text = String::from_utf8(output.stdout).map_err(|_err| VersionError::NonUtf8)?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(VersionError::Empty);
        }
        Ok(trimmed.to_string())
    }
}

/// Returns a fixed version string, used by tests and manifests that pin an
/// explicit version rather than deriving one from VCS state.
#[derive(Debug, Clone)]
pub struct StaticVersionProvider {
    /// The version this provider always returns.
    version: String,
}

impl StaticVersionProvider {
    /// Builds a provider that always resolves to `version`.
    #[must_use]
    pub fn new(version: impl Into<String>) -> Self {
        Self { version: version.into() }
    }
}

impl VersionProvider for StaticVersionProvider {
    fn resolve(&self, _root_dir: &Path) -> Result<String, VersionError> {
        Ok(self.version.clone())
    }
}

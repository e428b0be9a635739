// crates/forge-resolver/src/locator.rs
// ============================================================================
// Module: Worker Locator
// Description: Strategy for turning a `go://<name>` reference into a command.
// Purpose: Decouple the resolver from any fixed registry of worker names
//          (§4.2.1, resolving spec Open Question 3).
// Dependencies: std
// ============================================================================

//! ## Overview
//! The exact set of built-in worker names under `go://` is external to the
//! kernel's contract. [`WorkerLocator`] is the seam: [`PathWorkerLocator`]
//! discovers `forge-worker-<name>` executables on a search path, and
//! [`StaticWorkerLocator`] serves a fixed `name -> command` map for tests and
//! embedding.

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while locating a `go://` worker.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocatorError {
    /// No executable was found for the given worker name.
    #[error("no worker found for go://{0}")]
    NotFound(String),
}

/// Resolves a `go://<name>` worker reference into a runnable command.
///
/// # Invariants
/// - Implementations MUST NOT depend on the source language the worker is
///   implemented in; they only need to produce an executable command (§4.2).
pub trait WorkerLocator: Send + Sync {
    /// Returns the command to invoke for the built-in worker named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`LocatorError::NotFound`] when no worker matches `name`.
    fn locate(&self, name: &str) -> Result<String, LocatorError>;
}

/// Searches a caller-supplied path list (falling back to `PATH`) for an
/// executable named `forge-worker-<name>`.
///
/// # Invariants
/// - Directories are searched in order; the first match wins.
pub struct PathWorkerLocator {
    /// Directories searched, in order, before falling back to `PATH`.
    search_path: Vec<PathBuf>,
}

impl PathWorkerLocator {
    /// Builds a locator that searches `search_path` before `PATH`.
    #[must_use]
    pub fn new(search_path: Vec<PathBuf>) -> Self {
        Self { search_path }
    }

    /// Builds a locator that searches only `PATH`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(Vec::new())
    }

    /// Returns every directory this locator searches, in order.
    fn directories(&self) -> Vec<PathBuf> {
        let mut directories = self.search_path.clone();
        if let Ok(path_var) = std::env::var("PATH") {
            directories.extend(std::env::split_paths(&path_var));
        }
        directories
    }

    /// Returns true when `candidate` exists and is (plausibly) executable.
    fn is_executable(candidate: &Path) -> bool {
        if !candidate.is_file() {
            return false;
        }
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::metadata(candidate)
                .map(|metadata| metadata.permissions().mode() & 0o111 != 0)
                .unwrap_or(false)
        }
        #[cfg(not(unix))]
        {
            true
        }
    }
}

impl WorkerLocator for PathWorkerLocator {
    fn locate(&self, name: &str) -> Result<String, LocatorError> {
        let binary_name = format!("forge-worker-{name}");
        for directory in self.directories() {
            let candidate = directory.join(&binary_name);
            if Self::is_executable(&candidate) {
                return Ok(candidate.to_string_lossy().into_owned());
            }
        }
        Err(LocatorError::NotFound(name.to_string()))
    }
}

/// A fixed `name -> command` map, for tests and embedding.
///
/// # Invariants
/// - Names not present in the map are reported as [`LocatorError::NotFound`].
#[derive(Debug, Clone, Default)]
pub struct StaticWorkerLocator {
    /// Fixed worker name to command mapping.
    commands: BTreeMap<String, String>,
}

impl StaticWorkerLocator {
    /// Builds a locator from an explicit `name -> command` map.
    #[must_use]
    pub fn new(commands: BTreeMap<String, String>) -> Self {
        Self { commands }
    }

    /// Builds a locator with a single `name -> command` entry.
    #[must_use]
    pub fn single(name: impl Into<String>, command: impl Into<String>) -> Self {
        let mut commands = BTreeMap::new();
        commands.insert(name.into(), command.into());
        Self { commands }
    }
}

impl WorkerLocator for StaticWorkerLocator {
    fn locate(&self, name: &str) -> Result<String, LocatorError> {
        self.commands.get(name).cloned().ok_or_else(|| LocatorError::NotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions")]

    use super::*;

    #[test]
    fn static_locator_returns_mapped_command() {
        let locator = StaticWorkerLocator::single("gobuild", "/usr/local/bin/forge-worker-gobuild");
        assert_eq!(locator.locate("gobuild").expect("locate"), "/usr/local/bin/forge-worker-gobuild");
    }

    #[test]
    fn static_locator_rejects_unknown_name() {
        let locator = StaticWorkerLocator::default();
        assert_eq!(locator.locate("missing"), Err(LocatorError::NotFound("missing".to_string())));
    }

    #[test]
    fn path_locator_finds_executable_in_search_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let binary_path = dir.path().join("forge-worker-demo");
        std::fs::write(&binary_path, b"#!/bin/sh\n").expect("write");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&binary_path, std::fs::Permissions::from_mode(0o755))
                .expect("chmod");
        }

        let locator = PathWorkerLocator::new(vec![dir.path().to_path_buf()]);
        let located = locator.locate("demo").expect("locate");
        assert_eq!(located, binary_path.to_string_lossy());
    }

    #[test]
    fn path_locator_errors_when_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let locator = PathWorkerLocator::new(vec![dir.path().to_path_buf()]);
        assert_eq!(locator.locate("missing"), Err(LocatorError::NotFound("missing".to_string())));
    }
}

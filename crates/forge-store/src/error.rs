// crates/forge-store/src/error.rs
// ============================================================================
// Module: Store Error
// Description: Error taxonomy for Artifact Store operations.
// Purpose: Distinguish I/O, parse, and not-found failures per §7.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! [`StoreError`] is the single public error type for `forge-store`. It maps
//! 1:1 onto the `StoreIO` / `StoreParse` / `NotFound` taxonomy entries in the
//! kernel's error design.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by Artifact Store operations.
///
/// # Invariants
/// - `NotFound` is a distinguishable variant callers may match on to decide
///   whether an absence is expected (§4.1 `getLatestArtifact`).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store file could not be read, written, or have its permissions set.
    #[error("artifact store io error at {path}: {source}")]
    Io {
        /// Path of the store file involved.
        path: PathBuf,
        /// Underlying I/O cause.
        #[source]
        source: std::io::Error,
    },
    /// The store file's YAML contents did not parse or serialize.
    #[error("artifact store parse error at {path}: {source}")]
    Parse {
        /// Path of the store file involved.
        path: PathBuf,
        /// Underlying (de)serialization cause.
        #[source]
        source: serde_yaml::Error,
    },
    /// A lookup found no matching record.
    #[error("{0}")]
    NotFound(String),
    /// The in-process store mutex was poisoned by a panicking holder.
    #[error("artifact store mutex poisoned")]
    MutexPoisoned,
}

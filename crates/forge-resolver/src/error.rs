// crates/forge-resolver/src/error.rs
// ============================================================================
// Module: Resolver Error
// Description: Error taxonomy for Engine Resolver operations.
// Purpose: Distinguish alias, type, and locator failures per §7.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! [`ResolverError`] maps 1:1 onto the `AliasCycle` / `TypeMismatch` /
//! locator-failure taxonomy entries in the kernel's error design (§7).
//! `UnknownScheme` itself is rejected earlier, at `EngineUri` parse time
//! (`forge_core::EngineUriError`), so it is not repeated here.

use forge_core::EngineRole;
use thiserror::Error;

use crate::locator::LocatorError;

/// Errors produced while resolving an [`forge_core::EngineUri`] to a
/// runnable command.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolverError {
    /// The manifest has no `engines` entry with this alias.
    #[error("unknown alias: {0}")]
    AliasNotFound(String),
    /// A sub-engine referenced by an alias is itself an `alias://` URI.
    #[error("alias cycle: {alias} references another alias ({via})")]
    AliasCycle {
        /// The alias being resolved.
        alias: String,
        /// The nested alias reference that closes the cycle.
        via: String,
    },
    /// The alias's declared role does not match the caller's expected role.
    #[error("type mismatch: alias {alias} is {actual} but caller expected {expected}")]
    TypeMismatch {
        /// The alias being resolved.
        alias: String,
        /// The role the caller expected.
        expected: &'static str,
        /// The role the alias actually declares.
        actual: &'static str,
    },
    /// The alias's sub-engine list for its role is empty.
    #[error("alias {0} has no sub-engines configured for its role")]
    EmptySubEngines(String),
    /// The `go://` worker name could not be resolved to a command.
    #[error("worker locator failure: {0}")]
    Locator(#[from] LocatorError),
}

impl ResolverError {
    /// Builds a [`ResolverError::TypeMismatch`] from two roles.
    #[must_use]
    pub fn type_mismatch(alias: &str, expected: EngineRole, actual: EngineRole) -> Self {
        Self::TypeMismatch { alias: alias.to_string(), expected: expected.label(), actual: actual.label() }
    }
}

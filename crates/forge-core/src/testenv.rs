// crates/forge-core/src/testenv.rs
// ============================================================================
// Module: Test Environment
// Description: Ephemeral test environment state tracked in the Artifact Store.
// Purpose: Model the test environment lifecycle and its namespaced resources.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`TestEnvironment`] is the record of an ephemeral collection of
//! resources created by testenv subengines (§4.7). `files` and `metadata`
//! keys are namespaced `"<engine>.<key>"` so two subengines cannot clobber
//! each other's entries.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Status
// ============================================================================

/// Test environment lifecycle status.
///
/// # Invariants
/// - Transitions follow: `Created -> Running -> {Passed, Failed} -> (delete)
///   PartiallyDeleted -> removed`. See §4.7's state machine diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestEnvStatus {
    /// Freshly created, no test run has started.
    Created,
    /// A test run is in progress against this environment.
    Running,
    /// The associated test run passed.
    Passed,
    /// The associated test run failed.
    Failed,
    /// Deletion was attempted but at least one subengine failed.
    PartiallyDeleted,
}

impl TestEnvStatus {
    /// Returns true when the environment is in a terminal run state
    /// (`Passed` or `Failed`), i.e. eligible for deletion.
    #[must_use]
    pub const fn is_terminal_run_state(self) -> bool {
        matches!(self, Self::Passed | Self::Failed)
    }
}

// ============================================================================
// SECTION: Test Environment
// ============================================================================

/// An ephemeral test environment tracked in the Artifact Store.
///
/// # Invariants
/// - `files` values are relative to `tmp_dir`; absolute paths are illegal
///   (§3 invariant 5) and rejected by the Testenv Orchestrator before they
///   reach this type.
/// - `files` and `metadata` keys are namespaced `"<engine>.<key>"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestEnvironment {
    /// Identity: `<stage>-<timestamp>-<random>`.
    pub id: String,
    /// The test stage this environment was created for.
    pub stage: String,
    /// Current lifecycle status.
    pub status: TestEnvStatus,
    /// RFC3339 UTC creation timestamp.
    pub created_at: String,
    /// RFC3339 UTC last-update timestamp.
    pub updated_at: String,
    /// Root temporary directory owned by this environment.
    pub tmp_dir: String,
    /// Namespaced relative file paths contributed by subengines.
    #[serde(default)]
    pub files: BTreeMap<String, String>,
    /// Absolute paths of resources this environment's subengines manage and
    /// are responsible for cleaning up.
    #[serde(default)]
    pub managed_resources: Vec<String>,
    /// Namespaced metadata contributed by subengines.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl TestEnvironment {
    /// Returns true when every subengine has already recorded a
    /// `"<engine>.deleted"` marker for the given engine name, used by the
    /// partial-delete retry path (SPEC_FULL §4.7.1).
    #[must_use]
    pub fn subengine_already_deleted(&self, engine_name: &str) -> bool {
        self.metadata.get(&format!("{engine_name}.deleted")).map(String::as_str) == Some("true")
    }
}

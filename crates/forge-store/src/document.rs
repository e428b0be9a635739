// crates/forge-store/src/document.rs
// ============================================================================
// Module: Artifact Store Document
// Description: In-memory representation of the store's YAML file (§3, §6).
// Purpose: Pure data operations over the store's contents, independent of
//          file I/O (that lives in `store.rs`).
// Dependencies: forge-core, serde
// ============================================================================

//! ## Overview
//! [`ArtifactStoreDocument`] mirrors the YAML shape in SPEC_FULL §6 exactly:
//! `version`, `lastUpdated`, `artifacts`, `testEnvironments`, `testReports`.
//! All mutation methods here operate purely in memory; `save` (in
//! `store.rs`) is the only place that prunes and persists.

use std::collections::BTreeMap;

use forge_core::Artifact;
use forge_core::TestEnvironment;
use forge_core::TestReport;
use forge_core::parse_rfc3339;
use serde::Deserialize;
use serde::Serialize;

/// The store schema version written to every file (§6).
pub const STORE_VERSION: &str = "1.0";

/// The full contents of one project's Artifact Store file.
///
/// # Invariants
/// - `lastUpdated` only moves forward; see [`ArtifactStoreDocument::touch`].
/// - Artifacts are deduplicated by `(type, name, version)`; test environments
///   and test reports are deduplicated by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactStoreDocument {
    /// Store schema version.
    #[serde(default = "default_version")]
    pub version: String,
    /// RFC3339 UTC timestamp of the last successful save.
    #[serde(rename = "lastUpdated")]
    pub last_updated: String,
    /// Produced artifacts.
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
    /// Ephemeral test environments, keyed by id.
    #[serde(default, rename = "testEnvironments")]
    pub test_environments: BTreeMap<String, TestEnvironment>,
    /// Test execution reports, keyed by id.
    #[serde(default, rename = "testReports")]
    pub test_reports: BTreeMap<String, TestReport>,
}

fn default_version() -> String {
    STORE_VERSION.to_string()
}

impl ArtifactStoreDocument {
    /// Returns a freshly initialized, empty store document.
    #[must_use]
    pub fn empty(now: &str) -> Self {
        Self {
            version: STORE_VERSION.to_string(),
            last_updated: now.to_string(),
            artifacts: Vec::new(),
            test_environments: BTreeMap::new(),
            test_reports: BTreeMap::new(),
        }
    }

    /// Advances `last_updated` to `now`, per invariant 3 (§3): `lastUpdated`
    /// monotonically advances on every successful write.
    pub fn touch(&mut self, now: &str) {
        self.last_updated = now.to_string();
    }

    /// Upserts an artifact by its `(type, name, version)` identity (§4.1).
    pub fn add_or_update_artifact(&mut self, artifact: Artifact) {
        let key = artifact.key();
        if let Some(existing) = self.artifacts.iter_mut().find(|candidate| candidate.key() == key)
        {
            *existing = artifact;
        } else {
            self.artifacts.push(artifact);
        }
    }

    /// Returns the artifact named `name` with the maximum parseable RFC3339
    /// timestamp across all types, or `None` if no artifact named `name`
    /// exists (§4.1 `getLatestArtifact`).
    #[must_use]
    pub fn latest_artifact(&self, name: &str) -> Option<&Artifact> {
        self.artifacts
            .iter()
            .filter(|artifact| artifact.name == name)
            .filter_map(|artifact| parse_rfc3339(&artifact.timestamp).map(|ts| (ts, artifact)))
            .max_by_key(|(ts, _)| *ts)
            .map(|(_, artifact)| artifact)
    }

    /// Returns all artifacts of the given `type`.
    #[must_use]
    pub fn artifacts_by_type(&self, kind: &str) -> Vec<&Artifact> {
        self.artifacts.iter().filter(|artifact| artifact.kind == kind).collect()
    }

    /// Returns the artifact matching `(name, version)`, if any.
    #[must_use]
    pub fn artifact_by_name_version(&self, name: &str, version: &str) -> Option<&Artifact> {
        self.artifacts
            .iter()
            .find(|artifact| artifact.name == name && artifact.version == version)
    }

    /// Upserts a test environment by id.
    pub fn add_or_update_test_environment(&mut self, environment: TestEnvironment) {
        self.test_environments.insert(environment.id.clone(), environment);
    }

    /// Returns the test environment with the given id.
    #[must_use]
    pub fn test_environment(&self, id: &str) -> Option<&TestEnvironment> {
        self.test_environments.get(id)
    }

    /// Lists test environments, optionally filtered by stage.
    #[must_use]
    pub fn list_test_environments(&self, stage: Option<&str>) -> Vec<&TestEnvironment> {
        self.test_environments
            .values()
            .filter(|environment| stage.is_none_or(|stage| environment.stage == stage))
            .collect()
    }

    /// Removes the test environment with the given id, returning it if present.
    pub fn delete_test_environment(&mut self, id: &str) -> Option<TestEnvironment> {
        self.test_environments.remove(id)
    }

    /// Upserts a test report by id.
    pub fn add_or_update_test_report(&mut self, report: TestReport) {
        self.test_reports.insert(report.id.clone(), report);
    }

    /// Returns the test report with the given id.
    #[must_use]
    pub fn test_report(&self, id: &str) -> Option<&TestReport> {
        self.test_reports.get(id)
    }

    /// Lists test reports, optionally filtered by stage.
    #[must_use]
    pub fn list_test_reports(&self, stage: Option<&str>) -> Vec<&TestReport> {
        self.test_reports
            .values()
            .filter(|report| stage.is_none_or(|stage| report.stage == stage))
            .collect()
    }

    /// Removes the test report with the given id, returning it if present.
    pub fn delete_test_report(&mut self, id: &str) -> Option<TestReport> {
        self.test_reports.remove(id)
    }
}

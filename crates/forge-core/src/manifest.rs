// crates/forge-core/src/manifest.rs
// ============================================================================
// Module: Forge Manifest
// Description: Project configuration value types (§3 "Manifest").
// Purpose: Model the declarative manifest shape: build specs, test specs,
//          and engine alias configurations, independent of how the
//          manifest is loaded from disk (that is `forge-config`'s job).
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! `ForgeManifest` and its nested types are pure data: they describe the
//! declarative shape the project manifest must deserialize into, but this
//! module performs no I/O and no validation beyond what `serde` itself
//! enforces. Fail-closed structural validation (alias cycles, empty
//! sub-engine lists, malformed URIs surfaced as `ManifestInvalid`) lives in
//! `forge-config`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::uri::EngineUri;

// ============================================================================
// SECTION: Build / Test Specs
// ============================================================================

/// One buildable unit in the manifest's `build` list.
///
/// # Invariants
/// - `engine` names the builder (direct or `alias://`) responsible for
///   producing this build's artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSpec {
    /// Build spec name, passed to the builder engine as `name`.
    pub name: String,
    /// Source path, passed to the builder engine as `src`.
    pub src: String,
    /// Optional destination path override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest: Option<String>,
    /// Engine reference responsible for this build.
    pub engine: EngineUri,
}

/// One test stage in the manifest's `test` list.
///
/// # Invariants
/// - `testenv` defaults to `go://test-report` when absent (§9 open
///   question resolution: the `testenv` field name is used, not `engine`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSpec {
    /// Stage name (e.g. `"unit"`, `"integration"`).
    pub name: String,
    /// Engine reference for the testenv subengine composition.
    #[serde(default = "default_testenv_engine")]
    pub testenv: EngineUri,
    /// Engine reference for the test runner.
    pub runner: EngineUri,
}

fn default_testenv_engine() -> EngineUri {
    EngineUri::Go("test-report".to_string())
}

// ============================================================================
// SECTION: Sub-Engine Specs
// ============================================================================

/// Command/args/env overrides a builder or test-runner alias injects into
/// every call made through it, per §4.4's config-injection rule.
///
/// # Invariants
/// - Unset fields are not injected; orchestrator-provided keys win when a
///   field here is unset (§4.4).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubEngineConfigSpec {
    /// Command override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Argument list override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
    /// Environment variable overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<BTreeMap<String, String>>,
    /// Path to an env file to load before spawning.
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "envFile")]
    pub env_file: Option<String>,
    /// Working directory override.
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "workDir")]
    pub work_dir: Option<String>,
}

/// One sub-engine entry in a builder or test-runner [`EngineConfig`].
///
/// # Invariants
/// - `engine` must resolve to `go://` or `shell://` in at most one hop
///   (§4.2): a sub-engine referencing another `alias://` is an `AliasCycle`-
///   adjacent structural error caught at manifest load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubEngineSpec {
    /// Engine reference for this sub-engine.
    pub engine: EngineUri,
    /// Declared configuration injected into every call (§4.4).
    #[serde(default)]
    pub spec: SubEngineConfigSpec,
}

/// One sub-engine entry in a testenv [`EngineConfig`].
///
/// # Invariants
/// - `spec` is a free-form map per §3 (testenv subengines are not
///   restricted to `command`/`args`/`env`/`envFile`/`workDir`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestenvSubEngineSpec {
    /// Engine reference for this sub-engine.
    pub engine: EngineUri,
    /// Free-form configuration map.
    #[serde(default)]
    pub spec: BTreeMap<String, Value>,
}

// ============================================================================
// SECTION: Engine Config (Alias Definitions)
// ============================================================================

/// The caller-facing role an `alias://` engine must match (§4.2
/// `TypeMismatch`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EngineRole {
    /// Composes builder sub-engines.
    Builder,
    /// Composes test-runner sub-engines.
    TestRunner,
    /// Composes testenv sub-engines.
    Testenv,
}

impl EngineRole {
    /// Returns a stable label for error messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Builder => "builder",
            Self::TestRunner => "test-runner",
            Self::Testenv => "testenv",
        }
    }
}

/// A manifest-defined alias composing one or more sub-engines.
///
/// # Invariants
/// - Exactly one of `builder`, `test_runner`, `testenv` is populated,
///   matching `role`; `forge-config` enforces this is non-empty at load
///   time (§4.2/§9).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// The alias name this config is registered under (`alias://<alias>`).
    pub alias: String,
    /// The expected caller role.
    #[serde(rename = "type")]
    pub role: EngineRole,
    /// Sub-engines when `role == Builder`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub builder: Vec<SubEngineSpec>,
    /// Sub-engines when `role == TestRunner`.
    #[serde(default, skip_serializing_if = "Vec::is_empty", rename = "testRunner")]
    pub test_runner: Vec<SubEngineSpec>,
    /// Sub-engines when `role == Testenv`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub testenv: Vec<TestenvSubEngineSpec>,
}

impl EngineConfig {
    /// Returns the engine references of the sub-engines active for this
    /// config's role, regardless of which role it is.
    #[must_use]
    pub fn subengine_uris(&self) -> Vec<&EngineUri> {
        match self.role {
            EngineRole::Builder => self.builder.iter().map(|s| &s.engine).collect(),
            EngineRole::TestRunner => self.test_runner.iter().map(|s| &s.engine).collect(),
            EngineRole::Testenv => self.testenv.iter().map(|s| &s.engine).collect(),
        }
    }

    /// Returns true when the sub-engine list matching `role` is non-empty.
    #[must_use]
    pub fn has_subengines(&self) -> bool {
        match self.role {
            EngineRole::Builder => !self.builder.is_empty(),
            EngineRole::TestRunner => !self.test_runner.is_empty(),
            EngineRole::Testenv => !self.testenv.is_empty(),
        }
    }
}

// ============================================================================
// SECTION: Manifest
// ============================================================================

/// The project manifest (§3).
///
/// # Invariants
/// - `artifact_store_path` is resolved against a caller-supplied default by
///   `resolveStorePath` (§4.1), not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForgeManifest {
    /// Project name.
    pub name: String,
    /// Optional override for the Artifact Store file path.
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "artifactStorePath")]
    pub artifact_store_path: Option<String>,
    /// Build specs.
    #[serde(default)]
    pub build: Vec<BuildSpec>,
    /// Test specs.
    #[serde(default)]
    pub test: Vec<TestSpec>,
    /// Alias engine configs.
    #[serde(default)]
    pub engines: Vec<EngineConfig>,
}

impl ForgeManifest {
    /// Looks up an alias's [`EngineConfig`] by name.
    #[must_use]
    pub fn find_engine(&self, alias: &str) -> Option<&EngineConfig> {
        self.engines.iter().find(|e| e.alias == alias)
    }

    /// Resolves the Artifact Store path against a caller-supplied default,
    /// per §4.1's `resolveStorePath` contract.
    #[must_use]
    pub fn resolve_store_path<'a>(&'a self, default_path: &'a str) -> &'a str {
        self.artifact_store_path.as_deref().unwrap_or(default_path)
    }
}

// crates/forge-resolver/src/resolver.rs
// ============================================================================
// Module: Engine Resolver
// Description: Translate an EngineUri + manifest into runnable commands.
// Purpose: Implement §4.2's URI resolution contract: `go://`, `alias://`,
//          `shell://`, with alias-role type checking and cycle rejection.
// Dependencies: forge-core
// ============================================================================

//! ## Overview
//! [`Resolver`] is the sole place an [`forge_core::EngineUri`] is turned into
//! one or more concrete `(command, argv)` pairs. A direct `go://` or
//! `shell://` reference resolves to exactly one sub-engine; an `alias://`
//! reference resolves to the ordered list of sub-engines declared under the
//! matching [`forge_core::EngineConfig`], each carrying its own declared
//! configuration for the caller to inject (§4.4).
//!
//! Alias cycle rejection and non-empty-subengine-list checks belong, per
//! §3.1/§9, primarily to manifest load-time validation (`forge-config`); the
//! checks here are a second, defensive layer in case a `Resolver` is used
//! against a manifest that bypassed that validation (e.g. constructed
//! in-process by a test).

use std::collections::BTreeMap;

use forge_core::EngineConfig;
use forge_core::EngineRole;
use forge_core::EngineUri;
use forge_core::ForgeManifest;
use forge_core::SubEngineConfigSpec;
use serde_json::Value;

use crate::error::ResolverError;
use crate::locator::WorkerLocator;

// ============================================================================
// SECTION: Resolved Sub-Engines
// ============================================================================

/// One concrete, runnable sub-engine resolved from a builder or test-runner
/// reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSubEngine {
    /// The command to execute.
    pub command: String,
    /// Arguments to pass, before any config-injection (§4.4).
    pub args: Vec<String>,
    /// The sub-engine's declared configuration, to be injected by the caller.
    pub config: SubEngineConfigSpec,
}

/// One concrete, runnable sub-engine resolved from a testenv reference.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTestenvSubEngine {
    /// The command to execute.
    pub command: String,
    /// Arguments to pass, before any config-injection.
    pub args: Vec<String>,
    /// The sub-engine's free-form declared configuration.
    pub spec: BTreeMap<String, Value>,
}

// ============================================================================
// SECTION: Resolver
// ============================================================================

/// Resolves engine URIs against a manifest, using a [`WorkerLocator`] for
/// `go://` names.
pub struct Resolver<'a> {
    /// Strategy for turning `go://<name>` into a command.
    locator: &'a dyn WorkerLocator,
}

impl<'a> Resolver<'a> {
    /// Builds a resolver backed by `locator`.
    #[must_use]
    pub fn new(locator: &'a dyn WorkerLocator) -> Self {
        Self { locator }
    }

    /// Resolves a builder reference (a `BuildSpec::engine`) into its ordered
    /// list of sub-engines.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError`] per the alias/type/locator rules in §4.2.
    pub fn resolve_builder(
        &self,
        uri: &EngineUri,
        manifest: &ForgeManifest,
    ) -> Result<Vec<ResolvedSubEngine>, ResolverError> {
        match uri {
            EngineUri::Alias(alias) => {
                let config = resolve_alias_config(alias, manifest, EngineRole::Builder)?;
                config
                    .builder
                    .iter()
                    .map(|sub| {
                        let (command, args) = self.resolve_leaf(alias, &sub.engine)?;
                        Ok(ResolvedSubEngine { command, args, config: sub.spec.clone() })
                    })
                    .collect()
            }
            EngineUri::Go(_) | EngineUri::Shell(_) => {
                let (command, args) = self.resolve_leaf("", uri)?;
                Ok(vec![ResolvedSubEngine { command, args, config: SubEngineConfigSpec::default() }])
            }
        }
    }

    /// Resolves a test-runner reference (a `TestSpec::runner`) into its
    /// ordered list of sub-engines.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError`] per the alias/type/locator rules in §4.2.
    pub fn resolve_test_runner(
        &self,
        uri: &EngineUri,
        manifest: &ForgeManifest,
    ) -> Result<Vec<ResolvedSubEngine>, ResolverError> {
        match uri {
            EngineUri::Alias(alias) => {
                let config = resolve_alias_config(alias, manifest, EngineRole::TestRunner)?;
                config
                    .test_runner
                    .iter()
                    .map(|sub| {
                        let (command, args) = self.resolve_leaf(alias, &sub.engine)?;
                        Ok(ResolvedSubEngine { command, args, config: sub.spec.clone() })
                    })
                    .collect()
            }
            EngineUri::Go(_) | EngineUri::Shell(_) => {
                let (command, args) = self.resolve_leaf("", uri)?;
                Ok(vec![ResolvedSubEngine { command, args, config: SubEngineConfigSpec::default() }])
            }
        }
    }

    /// Resolves a testenv reference (a `TestSpec::testenv`) into its ordered
    /// list of sub-engines.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError`] per the alias/type/locator rules in §4.2.
    pub fn resolve_testenv(
        &self,
        uri: &EngineUri,
        manifest: &ForgeManifest,
    ) -> Result<Vec<ResolvedTestenvSubEngine>, ResolverError> {
        match uri {
            EngineUri::Alias(alias) => {
                let config = resolve_alias_config(alias, manifest, EngineRole::Testenv)?;
                config
                    .testenv
                    .iter()
                    .map(|sub| {
                        let (command, args) = self.resolve_leaf(alias, &sub.engine)?;
                        Ok(ResolvedTestenvSubEngine { command, args, spec: sub.spec.clone() })
                    })
                    .collect()
            }
            EngineUri::Go(_) | EngineUri::Shell(_) => {
                let (command, args) = self.resolve_leaf("", uri)?;
                Ok(vec![ResolvedTestenvSubEngine { command, args, spec: BTreeMap::new() }])
            }
        }
    }

    /// Resolves a leaf reference (`go://` or `shell://`) to `(command, args)`.
    /// `alias` names the enclosing alias for cycle-error reporting, or an
    /// empty string when resolving a top-level (non-alias) reference.
    fn resolve_leaf(&self, alias: &str, uri: &EngineUri) -> Result<(String, Vec<String>), ResolverError> {
        match uri {
            EngineUri::Go(name) => Ok((self.locator.locate(name)?, Vec::new())),
            EngineUri::Shell(command_line) => {
                let mut parts = command_line.split_whitespace().map(str::to_string);
                let command = parts.next().unwrap_or_default();
                let args: Vec<String> = parts.collect();
                Ok((command, args))
            }
            EngineUri::Alias(nested) => {
                Err(ResolverError::AliasCycle { alias: alias.to_string(), via: nested.clone() })
            }
        }
    }
}

/// Looks up `alias` in the manifest, checks its role matches `expected`, and
/// checks its sub-engine list for that role is non-empty.
fn resolve_alias_config<'a>(
    alias: &str,
    manifest: &'a ForgeManifest,
    expected: EngineRole,
) -> Result<&'a EngineConfig, ResolverError> {
    let config =
        manifest.find_engine(alias).ok_or_else(|| ResolverError::AliasNotFound(alias.to_string()))?;
    if config.role != expected {
        return Err(ResolverError::type_mismatch(alias, expected, config.role));
    }
    if !config.has_subengines() {
        return Err(ResolverError::EmptySubEngines(alias.to_string()));
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions")]

    use forge_core::SubEngineSpec;
    use forge_core::TestenvSubEngineSpec;

    use super::*;
    use crate::locator::StaticWorkerLocator;

    fn manifest_with(engines: Vec<EngineConfig>) -> ForgeManifest {
        ForgeManifest {
            name: "demo".to_string(),
            artifact_store_path: None,
            build: Vec::new(),
            test: Vec::new(),
            engines,
        }
    }

    #[test]
    fn resolves_direct_go_reference() {
        let locator = StaticWorkerLocator::single("gobuild", "/bin/forge-worker-gobuild");
        let resolver = Resolver::new(&locator);
        let manifest = manifest_with(Vec::new());
        let resolved =
            resolver.resolve_builder(&EngineUri::Go("gobuild".to_string()), &manifest).expect("resolve");
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].command, "/bin/forge-worker-gobuild");
    }

    #[test]
    fn resolves_direct_shell_reference_splitting_args() {
        let locator = StaticWorkerLocator::default();
        let resolver = Resolver::new(&locator);
        let manifest = manifest_with(Vec::new());
        let resolved = resolver
            .resolve_builder(&EngineUri::Shell("gofmt -w .".to_string()), &manifest)
            .expect("resolve");
        assert_eq!(resolved[0].command, "gofmt");
        assert_eq!(resolved[0].args, vec!["-w".to_string(), ".".to_string()]);
    }

    #[test]
    fn resolves_alias_into_ordered_subengines() {
        let locator = StaticWorkerLocator::single("gofmt", "/bin/forge-worker-gofmt");
        let resolver = Resolver::new(&locator);
        let manifest = manifest_with(vec![EngineConfig {
            alias: "fmt".to_string(),
            role: EngineRole::Builder,
            builder: vec![SubEngineSpec {
                engine: EngineUri::Go("gofmt".to_string()),
                spec: SubEngineConfigSpec { args: Some(vec!["-w".to_string()]), ..Default::default() },
            }],
            test_runner: Vec::new(),
            testenv: Vec::new(),
        }]);
        let resolved =
            resolver.resolve_builder(&EngineUri::Alias("fmt".to_string()), &manifest).expect("resolve");
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].command, "/bin/forge-worker-gofmt");
        assert_eq!(resolved[0].config.args, Some(vec!["-w".to_string()]));
    }

    #[test]
    fn rejects_unknown_alias() {
        let locator = StaticWorkerLocator::default();
        let resolver = Resolver::new(&locator);
        let manifest = manifest_with(Vec::new());
        let error = resolver
            .resolve_builder(&EngineUri::Alias("missing".to_string()), &manifest)
            .unwrap_err();
        assert_eq!(error, ResolverError::AliasNotFound("missing".to_string()));
    }

    #[test]
    fn rejects_type_mismatch() {
        let locator = StaticWorkerLocator::default();
        let resolver = Resolver::new(&locator);
        let manifest = manifest_with(vec![EngineConfig {
            alias: "lint".to_string(),
            role: EngineRole::TestRunner,
            builder: Vec::new(),
            test_runner: vec![SubEngineSpec {
                engine: EngineUri::Shell("golangci-lint run".to_string()),
                spec: SubEngineConfigSpec::default(),
            }],
            testenv: Vec::new(),
        }]);
        let error =
            resolver.resolve_builder(&EngineUri::Alias("lint".to_string()), &manifest).unwrap_err();
        assert_eq!(
            error,
            ResolverError::TypeMismatch {
                alias: "lint".to_string(),
                expected: "builder",
                actual: "test-runner"
            }
        );
    }

    #[test]
    fn rejects_empty_subengine_list() {
        let locator = StaticWorkerLocator::default();
        let resolver = Resolver::new(&locator);
        let manifest = manifest_with(vec![EngineConfig {
            alias: "noop".to_string(),
            role: EngineRole::Builder,
            builder: Vec::new(),
            test_runner: Vec::new(),
            testenv: Vec::new(),
        }]);
        let error =
            resolver.resolve_builder(&EngineUri::Alias("noop".to_string()), &manifest).unwrap_err();
        assert_eq!(error, ResolverError::EmptySubEngines("noop".to_string()));
    }

    #[test]
    fn rejects_nested_alias_as_cycle() {
        let locator = StaticWorkerLocator::default();
        let resolver = Resolver::new(&locator);
        let manifest = manifest_with(vec![EngineConfig {
            alias: "outer".to_string(),
            role: EngineRole::Builder,
            builder: vec![SubEngineSpec {
                engine: EngineUri::Alias("inner".to_string()),
                spec: SubEngineConfigSpec::default(),
            }],
            test_runner: Vec::new(),
            testenv: Vec::new(),
        }]);
        let error =
            resolver.resolve_builder(&EngineUri::Alias("outer".to_string()), &manifest).unwrap_err();
        assert_eq!(
            error,
            ResolverError::AliasCycle { alias: "outer".to_string(), via: "inner".to_string() }
        );
    }

    #[test]
    fn resolves_testenv_alias_with_free_form_spec() {
        let locator = StaticWorkerLocator::single("fixtures", "/bin/forge-worker-fixtures");
        let resolver = Resolver::new(&locator);
        let mut spec = BTreeMap::new();
        spec.insert("seed".to_string(), Value::from("demo"));
        let manifest = manifest_with(vec![EngineConfig {
            alias: "env".to_string(),
            role: EngineRole::Testenv,
            builder: Vec::new(),
            test_runner: Vec::new(),
            testenv: vec![TestenvSubEngineSpec { engine: EngineUri::Go("fixtures".to_string()), spec }],
        }]);
        let resolved =
            resolver.resolve_testenv(&EngineUri::Alias("env".to_string()), &manifest).expect("resolve");
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].spec.get("seed").and_then(Value::as_str), Some("demo"));
    }
}

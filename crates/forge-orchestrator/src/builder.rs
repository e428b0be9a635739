// crates/forge-orchestrator/src/builder.rs
// ============================================================================
// Module: Builder Orchestrator
// Description: Runs an ordered list of builder sub-engines for a set of
//              build specs, aggregating artifacts (§4.5).
// Purpose: Implement the fail-fast build pipeline: resolve each spec's
//          engine reference, call every resolved sub-engine's `build` tool
//          in order, and preserve the order of produced artifacts.
// Dependencies: forge-core, forge-invoker, forge-resolver
// ============================================================================

//! ## Overview
//! [`BuilderOrchestrator::build`] does not persist the artifacts it
//! produces; per §4.5, "artifacts already produced are not rolled back but
//! are not persisted to the store by the Orchestrator — persistence is the
//! caller's decision." The caller (`forge-cli`) decides whether and how to
//! write the returned list to the Artifact Store.

use std::path::Path;

use forge_core::Artifact;
use forge_core::BuildSpec;
use forge_core::CancellationToken;
use forge_core::ForgeManifest;
use forge_core::Logger;
use forge_invoker::EngineInvoker;
use forge_invoker::InvocationResult;
use forge_resolver::Resolver;
use std::sync::Arc;

use crate::dirs::EngineDirs;
use crate::dirs::sub_engine_timeout;
use crate::error::OrchestratorError;
use crate::version::VersionProvider;

/// Runs one or more [`BuildSpec`]s through their resolved builder
/// sub-engines, fail-fast, preserving produced-artifact order.
pub struct BuilderOrchestrator<'a> {
    /// Spawns resolved sub-engines and parses their results.
    invoker: &'a EngineInvoker,
    /// Turns a spec's `engine` reference into its ordered sub-engines.
    resolver: &'a Resolver<'a>,
    /// Supplies a version stamp when a caller does not pin one.
    version_provider: &'a dyn VersionProvider,
    /// Diagnostic sink for pipeline progress.
    logger: Arc<dyn Logger>,
}

impl<'a> BuilderOrchestrator<'a> {
    /// Builds an orchestrator wired to the given invoker, resolver, and
    /// version provider.
    #[must_use]
    pub fn new(
        invoker: &'a EngineInvoker,
        resolver: &'a Resolver<'a>,
        version_provider: &'a dyn VersionProvider,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self { invoker, resolver, version_provider, logger }
    }

    /// Runs `build_specs` in order, fail-fast, returning the aggregate list
    /// of produced artifacts in the order the orchestrator produced them.
    ///
    /// `version` pins a version stamp for every builder in this run; when
    /// `None`, the configured [`VersionProvider`] is asked once and the
    /// result is shared across every spec and sub-engine (§4.5).
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Resolve`] if a spec's engine reference
    /// does not resolve, [`OrchestratorError::Version`] if a version stamp
    /// could not be determined, [`OrchestratorError::BuildFailed`] on the
    /// first sub-engine call that errors, and
    /// [`OrchestratorError::UnexpectedArtifactResult`] if a sub-engine
    /// answers with a non-artifact shape.
    pub async fn build(
        &self,
        manifest: &ForgeManifest,
        build_specs: &[BuildSpec],
        dirs: &EngineDirs,
        version: Option<&str>,
        cancellation: &CancellationToken,
    ) -> Result<Vec<Artifact>, OrchestratorError> {
        let version = match version {
            Some(pinned) => pinned.to_string(),
            None => self.version_provider.resolve(Path::new(&dirs.root_dir))?,
        };

        let mut artifacts = Vec::new();
        for spec in build_specs {
            let resolved = self.resolver.resolve_builder(&spec.engine, manifest)?;
            for (index, sub_engine) in resolved.iter().enumerate() {
                let engine_label = format!("{} (sub-engine #{index})", spec.engine);
                self.logger.info(&format!("build {}: invoking {engine_label}", spec.name));

                let mut arguments = dirs.as_arguments();
                if let Some(object) = arguments.as_object_mut() {
                    object.insert("name".to_string(), serde_json::Value::String(spec.name.clone()));
                    object.insert("src".to_string(), serde_json::Value::String(spec.src.clone()));
                    if let Some(dest) = &spec.dest {
                        object.insert("dest".to_string(), serde_json::Value::String(dest.clone()));
                    }
                    object.insert("version".to_string(), serde_json::Value::String(version.clone()));
                }

                let timeout = sub_engine_timeout(&sub_engine.config);
                let result = self
                    .invoker
                    .invoke_builder(&engine_label, sub_engine, "build", arguments, timeout, cancellation)
                    .await
                    .map_err(|source| OrchestratorError::BuildFailed {
                        engine: engine_label.clone(),
                        index,
                        source,
                    })?;

                match result {
                    InvocationResult::Artifact(artifact) => artifacts.push(artifact),
                    InvocationResult::Artifacts(mut list) => artifacts.append(&mut list),
                    InvocationResult::TestReport(_)
                    | InvocationResult::EnvCreate { .. }
                    | InvocationResult::Unstructured(_) => {
                        return Err(OrchestratorError::UnexpectedArtifactResult {
                            engine: engine_label,
                            index,
                        });
                    }
                }
            }
        }
        Ok(artifacts)
    }
}

// crates/forge-orchestrator/src/testenv.rs
// ============================================================================
// Module: Testenv Orchestrator
// Description: Creates and tears down ephemeral test environments across a
//              stage's testenv sub-engines (§4.7, §4.7.1).
// Purpose: Own the one piece of orchestrator state that outlives a single
//          pipeline invocation: the Artifact Store is the only durable
//          record linking a `create` call to its later `delete` call.
// Dependencies: forge-core, forge-invoker, forge-store, rand
// ============================================================================

//! ## Overview
//! Unlike the Builder and Test-Runner orchestrators, [`TestenvOrchestrator`]
//! persists directly to the [`ArtifactStore`]: `create` and `delete` are
//! separate CLI invocations, so the environment's id, namespaced resources,
//! and per-sub-engine deletion markers must survive between them (§4.7).

use std::sync::Arc;

use forge_core::CancellationToken;
use forge_core::Logger;
use forge_core::TestEnvStatus;
use forge_core::TestEnvironment;
use forge_core::now_rfc3339;
use forge_invoker::EngineInvoker;
use forge_invoker::InvocationResult;
use forge_resolver::ResolvedTestenvSubEngine;
use forge_store::ArtifactStore;
use rand::Rng;
use rand::distributions::Alphanumeric;

use crate::error::OrchestratorError;

/// Creates and deletes ephemeral test environments, persisting their state
/// to the Artifact Store so a later `delete` can find what a prior `create`
/// produced.
pub struct TestenvOrchestrator<'a> {
    /// Spawns resolved sub-engines and parses their results.
    invoker: &'a EngineInvoker,
    /// Durable record of environments across separate CLI invocations.
    store: &'a ArtifactStore,
    /// Diagnostic sink for pipeline progress.
    logger: Arc<dyn Logger>,
}

impl<'a> TestenvOrchestrator<'a> {
    /// Builds an orchestrator wired to the given invoker and store.
    #[must_use]
    pub fn new(invoker: &'a EngineInvoker, store: &'a ArtifactStore, logger: Arc<dyn Logger>) -> Self {
        Self { invoker, store, logger }
    }

    /// Creates a test environment for `stage` by calling every resolved
    /// sub-engine's `create` tool in order, merging their namespaced
    /// contributions, and persisting the result (§4.7).
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::TestenvCreateFailed`] on the first
    /// sub-engine whose `create` call errors, and
    /// [`OrchestratorError::Store`] if persisting the environment fails.
    pub async fn create(
        &self,
        stage: &str,
        subengines: &[(String, ResolvedTestenvSubEngine)],
        root_tmp: &str,
        cancellation: &CancellationToken,
    ) -> Result<TestEnvironment, OrchestratorError> {
        let id = allocate_id(stage);
        let tmp_dir = format!("{root_tmp}/{id}");
        let now = now_rfc3339();

        let mut environment = TestEnvironment {
            id: id.clone(),
            stage: stage.to_string(),
            status: TestEnvStatus::Created,
            created_at: now.clone(),
            updated_at: now,
            tmp_dir: tmp_dir.clone(),
            files: std::collections::BTreeMap::new(),
            managed_resources: Vec::new(),
            metadata: std::collections::BTreeMap::new(),
        };

        for (index, (name, sub_engine)) in subengines.iter().enumerate() {
            let engine_label = format!("testenv {name} (step #{index})");
            self.logger.info(&format!("testenv create {stage}: invoking {engine_label}"));

            let arguments = serde_json::json!({"stage": stage, "id": id, "tmpDir": tmp_dir});
            let result = self
                .invoker
                .invoke_testenv_create(&engine_label, sub_engine, "create", arguments, None, cancellation)
                .await
                .map_err(|source| OrchestratorError::TestenvCreateFailed {
                    engine: engine_label.clone(),
                    index,
                    source,
                })?;

            if let InvocationResult::EnvCreate { files, metadata, managed_resources } = result {
                for (key, value) in files {
                    environment.files.insert(format!("{name}.{key}"), value);
                }
                for (key, value) in metadata {
                    environment.metadata.insert(format!("{name}.{key}"), value);
                }
                environment.managed_resources.extend(managed_resources);
            }
        }

        environment.updated_at = now_rfc3339();
        self.store.add_or_update_test_environment(environment.clone())?;
        Ok(environment)
    }

    /// Deletes the environment with `id`, calling sub-engines' `delete`
    /// tools in reverse declaration order.
    ///
    /// If the environment is already `partially_deleted`, sub-engines whose
    /// `"<engine>.deleted"` marker is already set are skipped so only the
    /// remainder is retried (§4.7.1). On full success the environment is
    /// removed from the store; on partial failure it is persisted as
    /// `partially_deleted` with markers recorded for each sub-engine that
    /// did succeed this pass.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::TestenvNotFound`] if no environment with
    /// `id` exists, [`OrchestratorError::PartialDelete`] if at least one
    /// sub-engine fails to delete, and [`OrchestratorError::Store`] if
    /// reading or writing the environment fails.
    pub async fn delete(
        &self,
        id: &str,
        subengines: &[(String, ResolvedTestenvSubEngine)],
        cancellation: &CancellationToken,
    ) -> Result<(), OrchestratorError> {
        let mut environment = self
            .store
            .get_test_environment(id)?
            .ok_or_else(|| OrchestratorError::TestenvNotFound(id.to_string()))?;

        let mut failures = Vec::new();
        for (name, sub_engine) in subengines.iter().rev() {
            if environment.subengine_already_deleted(name) {
                self.logger.debug(&format!("testenv delete {id}: {name} already deleted, skipping"));
                continue;
            }

            let engine_label = format!("testenv {name}");
            self.logger.info(&format!("testenv delete {id}: invoking {engine_label}"));

            let arguments = serde_json::json!({
                "id": id,
                "tmpDir": environment.tmp_dir,
                "metadata": environment.metadata,
            });
            match self
                .invoker
                .invoke_testenv_delete(&engine_label, sub_engine, "delete", arguments, None, cancellation)
                .await
            {
                Ok(()) => {
                    environment.metadata.insert(format!("{name}.deleted"), "true".to_string());
                }
                Err(source) => failures.push(format!("{name}: {source}")),
            }
        }

        environment.updated_at = now_rfc3339();

        if failures.is_empty() {
            self.store.delete_test_environment(id)?;
            Ok(())
        } else {
            environment.status = TestEnvStatus::PartiallyDeleted;
            let failed_count = failures.len();
            let detail = failures.join("; ");
            self.store.add_or_update_test_environment(environment)?;
            Err(OrchestratorError::PartialDelete { env_id: id.to_string(), failed_count, detail })
        }
    }
}

/// Allocates a `<stage>-<timestamp>-<random>` environment id (§4.7).
fn allocate_id(stage: &str) -> String {
    let timestamp = now_rfc3339().replace([':', '-', '.'], "");
    let suffix: String =
        rand::thread_rng().sample_iter(&Alphanumeric).take(6).map(char::from).collect::<String>().to_lowercase();
    format!("{stage}-{timestamp}-{suffix}")
}

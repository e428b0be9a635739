// crates/forge-orchestrator/src/error.rs
// ============================================================================
// Module: Orchestrator Error
// Description: Error taxonomy for the Builder, Test-Runner, and Testenv
//              orchestrators.
// Purpose: Compose the Resolver's, Invoker's, and Store's error taxonomies
//          behind one public enum, adding the pipeline index and engine
//          label context §7 requires ("the engine URI, the index within the
//          pipeline, and the underlying cause chain").
// Dependencies: thiserror, forge-resolver, forge-invoker, forge-store
// ============================================================================

use thiserror::Error;

use crate::version::VersionError;

/// Errors produced while running a build, test-runner, or testenv pipeline.
///
/// # Invariants
/// - Fail-fast variants (`BuildFailed`, `RunFailed`, `TestenvCreateFailed`)
///   carry the offending engine's label and its position in the pipeline so
///   a caller can report exactly where a multi-engine sequence stopped.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// A builder sub-engine's `build` call failed; the pipeline aborts
    /// without rolling back artifacts already produced (§4.5).
    #[error("builder {engine} (step #{index}) failed: {source}")]
    BuildFailed {
        /// Label of the sub-engine that failed.
        engine: String,
        /// Zero-based position within the resolved sub-engine sequence.
        index: usize,
        /// Underlying invocation failure.
        #[source]
        source: forge_invoker::InvokerError,
    },
    /// A builder sub-engine answered with a shape other than an artifact or
    /// artifact list.
    #[error("builder {engine} (step #{index}) did not return an artifact")]
    UnexpectedArtifactResult {
        /// Label of the offending sub-engine.
        engine: String,
        /// Zero-based position within the resolved sub-engine sequence.
        index: usize,
    },
    /// A test-runner sub-engine's `run` call failed; a `"failed"` test
    /// report is not an error and is merged normally (§4.6).
    #[error("test runner {engine} (step #{index}) failed: {source}")]
    RunFailed {
        /// Label of the sub-engine that failed.
        engine: String,
        /// Zero-based position within the resolved sub-engine sequence.
        index: usize,
        /// Underlying invocation failure.
        #[source]
        source: forge_invoker::InvokerError,
    },
    /// A test-runner sub-engine answered with a shape other than a test
    /// report.
    #[error("test runner {engine} (step #{index}) did not return a test report")]
    UnexpectedReportResult {
        /// Label of the offending sub-engine.
        engine: String,
        /// Zero-based position within the resolved sub-engine sequence.
        index: usize,
    },
    /// A test stage's runner reference resolved to zero sub-engines.
    #[error("test stage {stage} has no resolved runners to merge a report from")]
    EmptyRunnerList {
        /// The test stage name.
        stage: String,
    },
    /// A testenv sub-engine's `create` call failed.
    #[error("testenv {engine} (step #{index}) failed to create: {source}")]
    TestenvCreateFailed {
        /// Label of the sub-engine that failed.
        engine: String,
        /// Zero-based position within the resolved sub-engine sequence.
        index: usize,
        /// Underlying invocation failure.
        #[source]
        source: forge_invoker::InvokerError,
    },
    /// A testenv delete pass left at least one sub-engine undeleted (§7
    /// `PartialFailure`). The environment's status is moved to
    /// `partially_deleted` before this error is returned.
    #[error("testenv {env_id} partially deleted: {failed_count} sub-engine(s) failed ({detail})")]
    PartialDelete {
        /// The environment's id.
        env_id: String,
        /// Count of sub-engines that failed to delete.
        failed_count: usize,
        /// `"<engine>: <cause>"` pairs joined with `"; "`.
        detail: String,
    },
    /// No environment with the given id exists in the store.
    #[error("no test environment with id {0}")]
    TestenvNotFound(String),
    /// Resolving an engine reference failed.
    #[error(transparent)]
    Resolve(#[from] forge_resolver::ResolverError),
    /// An Artifact Store operation failed.
    #[error(transparent)]
    Store(#[from] forge_store::StoreError),
    /// The configured version provider failed to produce a version stamp.
    #[error(transparent)]
    Version(#[from] VersionError),
}

// crates/forge-cli/src/main.rs
// ============================================================================
// Module: Forge CLI Entry Point
// Description: Command dispatcher for the Forge engine orchestration kernel.
// Purpose: Thin wiring over the kernel crates (§6.1): `clap` does argument
//          parsing here and nowhere else in the workspace.
// Dependencies: clap, forge-config, forge-core, forge-invoker,
//               forge-orchestrator, forge-resolver, forge-store, tokio
// ============================================================================

//! ## Overview
//! `forge` is deliberately thin: it loads the manifest, builds the default
//! `Logger`/`WorkerLocator`/`VersionProvider`, and drives one orchestrator
//! per subcommand. None of the decisions that matter (merge rules,
//! fail-fast semantics, persistence timing) live here; they live in
//! `forge-orchestrator` and `forge-store`.

#![allow(
    clippy::print_stdout,
    clippy::print_stderr,
    reason = "this binary's entire job is terminal output; `Logger` covers diagnostics, \
              println!/eprintln! cover command results and the final error line"
)]

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use clap::Subcommand;
use forge_core::CancellationToken;
use forge_core::EngineUri;
use forge_core::ForgeManifest;
use forge_core::LogLevel;
use forge_core::Logger;
use forge_core::StderrLogger;
use forge_invoker::EngineInvoker;
use forge_orchestrator::BuilderOrchestrator;
use forge_orchestrator::EngineDirs;
use forge_orchestrator::GitHeadVersionProvider;
use forge_orchestrator::StaticVersionProvider;
use forge_orchestrator::TestRunnerOrchestrator;
use forge_orchestrator::TestenvOrchestrator;
use forge_orchestrator::VersionProvider;
use forge_resolver::PathWorkerLocator;
use forge_resolver::ResolvedTestenvSubEngine;
use forge_resolver::Resolver;
use forge_store::ArtifactStore;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default Artifact Store file path when the manifest doesn't override it.
const DEFAULT_STORE_PATH: &str = ".forge/artifacts.yaml";
/// Environment variable gating testenv cleanup on delete (§6).
const SKIP_CLEANUP_ENV: &str = "SKIP_CLEANUP";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "forge", about = "Engine orchestration kernel")]
struct Cli {
    /// Path to the project manifest, overriding `$FORGE_MANIFEST` and the
    /// default `forge.yaml`.
    #[arg(long, global = true, value_name = "PATH")]
    manifest: Option<PathBuf>,
    /// Selected subcommand.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Runs build specs through their resolved builder sub-engines.
    Build {
        /// Build a single named spec instead of every spec in the manifest.
        #[arg(long, value_name = "NAME")]
        spec: Option<String>,
        /// Pin a version stamp instead of resolving one via `git`.
        #[arg(long, value_name = "VERSION")]
        version: Option<String>,
    },
    /// Runs a test stage's resolved runners and merges their reports.
    Test {
        /// Run a single named stage instead of every stage in the manifest.
        #[arg(long, value_name = "NAME")]
        stage: Option<String>,
    },
    /// Creates or deletes ephemeral test environments.
    Testenv {
        /// Selected testenv subcommand.
        #[command(subcommand)]
        command: TestenvCommand,
    },
    /// Inspects the Artifact Store.
    Store {
        /// Selected store subcommand.
        #[command(subcommand)]
        command: StoreCommand,
    },
}

/// `forge testenv` subcommands.
#[derive(Subcommand, Debug)]
enum TestenvCommand {
    /// Creates a test environment for a stage.
    Create {
        /// The test stage to create an environment for.
        #[arg(long, value_name = "NAME")]
        stage: String,
    },
    /// Deletes a test environment by id.
    Delete {
        /// The environment id to delete.
        #[arg(long, value_name = "ID")]
        id: String,
    },
}

/// `forge store` subcommands.
#[derive(Subcommand, Debug)]
enum StoreCommand {
    /// Lists artifacts, optionally filtered by type.
    List {
        /// Restrict the listing to artifacts of this type.
        #[arg(long = "type", value_name = "KIND")]
        kind: Option<String>,
    },
    /// Forces a prune pass and reports the resulting artifact count.
    Prune,
    /// Prints the latest (or a specific) artifact version by name.
    Inspect {
        /// Artifact name to inspect.
        #[arg(long, value_name = "NAME")]
        name: String,
        /// Specific version to inspect instead of the latest.
        #[arg(long, value_name = "VERSION")]
        version: Option<String>,
    },
}

// ============================================================================
// SECTION: Error / Result
// ============================================================================

/// Top-level CLI error, wrapping every kernel crate's error taxonomy behind
/// one printable cause chain (§7).
#[derive(Debug, Error)]
enum CliError {
    /// The manifest could not be loaded or failed structural validation.
    #[error(transparent)]
    Manifest(#[from] forge_config::ManifestError),
    /// A pipeline operation failed.
    #[error(transparent)]
    Orchestrator(#[from] forge_orchestrator::OrchestratorError),
    /// An Artifact Store operation failed.
    #[error(transparent)]
    Store(#[from] forge_store::StoreError),
    /// The requested name was not present in the manifest.
    #[error("{0}")]
    NotFound(String),
}

/// Result type threaded through every command function.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning a process exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("forge: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Parses arguments and dispatches to the selected subcommand.
async fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let manifest = forge_config::load(cli.manifest.as_deref())?;

    match cli.command {
        Commands::Build { spec, version } => command_build(&manifest, spec.as_deref(), version).await,
        Commands::Test { stage } => command_test(&manifest, stage.as_deref()).await,
        Commands::Testenv { command } => command_testenv(&manifest, command).await,
        Commands::Store { command } => command_store(&manifest, command),
    }
}

// ============================================================================
// SECTION: Build Command
// ============================================================================

/// Executes `forge build`.
async fn command_build(
    manifest: &ForgeManifest,
    spec_name: Option<&str>,
    version: Option<String>,
) -> CliResult<()> {
    let logger: Arc<dyn Logger> = Arc::new(StderrLogger::new(LogLevel::Info));
    let locator = PathWorkerLocator::from_env();
    let resolver = Resolver::new(&locator);
    let invoker = EngineInvoker::new(logger.clone());
    let root_dir = current_dir_string();
    let dirs = engine_dirs(&root_dir);
    let cancellation = CancellationToken::new();

    let build_specs: Vec<_> = match spec_name {
        Some(name) => manifest.build.iter().filter(|spec| spec.name == name).cloned().collect(),
        None => manifest.build.clone(),
    };
    if build_specs.is_empty() {
        return Err(CliError::NotFound(format!("no build spec matching {spec_name:?}")));
    }

    let git_provider = GitHeadVersionProvider;
    let static_provider;
    let version_provider: &dyn VersionProvider = match version {
        Some(pinned) => {
            static_provider = StaticVersionProvider::new(pinned);
            &static_provider
        }
        None => &git_provider,
    };

    let orchestrator = BuilderOrchestrator::new(&invoker, &resolver, version_provider, logger.clone());
    let artifacts = orchestrator.build(manifest, &build_specs, &dirs, None, &cancellation).await?;

    let store_path = manifest.resolve_store_path(DEFAULT_STORE_PATH);
    let store = ArtifactStore::open(store_path);
    for artifact in &artifacts {
        store.add_or_update_artifact(artifact.clone())?;
    }
    print_json(&artifacts);
    Ok(())
}

// ============================================================================
// SECTION: Test Command
// ============================================================================

/// Executes `forge test`.
async fn command_test(manifest: &ForgeManifest, stage_name: Option<&str>) -> CliResult<()> {
    let logger: Arc<dyn Logger> = Arc::new(StderrLogger::new(LogLevel::Info));
    let locator = PathWorkerLocator::from_env();
    let resolver = Resolver::new(&locator);
    let invoker = EngineInvoker::new(logger.clone());
    let root_dir = current_dir_string();
    let dirs = engine_dirs(&root_dir);
    let cancellation = CancellationToken::new();
    let orchestrator = TestRunnerOrchestrator::new(&invoker, logger.clone());

    let stages: Vec<_> = match stage_name {
        Some(name) => manifest.test.iter().filter(|spec| spec.name == name).collect(),
        None => manifest.test.iter().collect(),
    };
    if stages.is_empty() {
        return Err(CliError::NotFound(format!("no test stage matching {stage_name:?}")));
    }

    let store_path = manifest.resolve_store_path(DEFAULT_STORE_PATH);
    let store = ArtifactStore::open(store_path);

    let mut reports = Vec::with_capacity(stages.len());
    for spec in stages {
        let runners = resolver.resolve_test_runner(&spec.runner, manifest)?;
        let mut base_params = dirs.as_arguments();
        if let Some(object) = base_params.as_object_mut() {
            object.insert("stage".to_string(), serde_json::Value::String(spec.name.clone()));
        }
        let report = orchestrator.run(&spec.name, &runners, base_params, &cancellation).await?;
        store.add_or_update_test_report(report.clone())?;
        reports.push(report);
    }
    print_json(&reports);
    Ok(())
}

// ============================================================================
// SECTION: Testenv Command
// ============================================================================

/// Executes `forge testenv create|delete`.
async fn command_testenv(manifest: &ForgeManifest, command: TestenvCommand) -> CliResult<()> {
    let logger: Arc<dyn Logger> = Arc::new(StderrLogger::new(LogLevel::Info));
    let locator = PathWorkerLocator::from_env();
    let resolver = Resolver::new(&locator);
    let invoker = EngineInvoker::new(logger.clone());
    let cancellation = CancellationToken::new();
    let root_dir = current_dir_string();
    let store_path = manifest.resolve_store_path(DEFAULT_STORE_PATH);
    let store = ArtifactStore::open(store_path);
    let orchestrator = TestenvOrchestrator::new(&invoker, &store, logger.clone());

    match command {
        TestenvCommand::Create { stage } => {
            let spec = manifest
                .test
                .iter()
                .find(|spec| spec.name == stage)
                .ok_or_else(|| CliError::NotFound(format!("no test stage named {stage}")))?;
            let subengines = resolve_named_testenv(&resolver, &spec.testenv, manifest)?;
            let root_tmp = format!("{root_dir}/.forge/tmp");
            let environment =
                orchestrator.create(&stage, &subengines, &root_tmp, &cancellation).await?;
            print_json(&environment);
            Ok(())
        }
        TestenvCommand::Delete { id } => {
            let environment = store
                .get_test_environment(&id)?
                .ok_or_else(|| CliError::NotFound(format!("no test environment with id {id}")))?;
            if std::env::var(SKIP_CLEANUP_ENV).is_ok_and(|value| value == "1" || value == "true") {
                logger.info(&format!("testenv delete {id}: {SKIP_CLEANUP_ENV} set, skipping"));
                return Ok(());
            }
            let spec = manifest
                .test
                .iter()
                .find(|spec| spec.name == environment.stage)
                .ok_or_else(|| CliError::NotFound(format!("no test stage named {}", environment.stage)))?;
            let subengines = resolve_named_testenv(&resolver, &spec.testenv, manifest)?;
            orchestrator.delete(&id, &subengines, &cancellation).await?;
            Ok(())
        }
    }
}

/// Resolves a testenv engine reference to its `(name, sub-engine)` pairs,
/// naming each by the first whitespace-delimited token of its engine body
/// (its `go://` worker name, or `shell://` command) so the orchestrator can
/// namespace `files`/`metadata` keys per sub-engine (§4.7).
fn resolve_named_testenv(
    resolver: &Resolver<'_>,
    uri: &EngineUri,
    manifest: &ForgeManifest,
) -> CliResult<Vec<(String, ResolvedTestenvSubEngine)>> {
    let names = testenv_subengine_names(uri, manifest);
    let resolved = resolver.resolve_testenv(uri, manifest)?;
    Ok(names.into_iter().zip(resolved).collect())
}

/// Returns the declared testenv sub-engine names for `uri`, in declaration
/// order, expanding one `alias://` hop if present.
fn testenv_subengine_names(uri: &EngineUri, manifest: &ForgeManifest) -> Vec<String> {
    match uri {
        EngineUri::Alias(alias) => manifest
            .find_engine(alias)
            .map(|config| config.testenv.iter().map(|sub| engine_short_name(&sub.engine)).collect())
            .unwrap_or_default(),
        EngineUri::Go(_) | EngineUri::Shell(_) => vec![engine_short_name(uri)],
    }
}

/// Returns the first whitespace-delimited token of an engine's body, used
/// as its namespace key.
fn engine_short_name(uri: &EngineUri) -> String {
    uri.body().split_whitespace().next().unwrap_or_else(|| uri.body()).to_string()
}

// ============================================================================
// SECTION: Store Command
// ============================================================================

/// Executes `forge store list|prune|inspect`.
fn command_store(manifest: &ForgeManifest, command: StoreCommand) -> CliResult<()> {
    let store_path = manifest.resolve_store_path(DEFAULT_STORE_PATH);
    let store = ArtifactStore::open(store_path);

    match command {
        StoreCommand::List { kind } => {
            let artifacts = match kind {
                Some(kind) => store.get_by_type(&kind)?,
                None => store.read(|document| document.artifacts.clone())?,
            };
            print_json(&artifacts);
            Ok(())
        }
        StoreCommand::Prune => {
            let before = store.read(|document| document.artifacts.len())?;
            store.mutate(|_document| Ok(()))?;
            let after = store.read(|document| document.artifacts.len())?;
            eprintln!("forge: store pruned ({before} -> {after} artifacts)");
            Ok(())
        }
        StoreCommand::Inspect { name, version } => {
            let artifact = match version {
                Some(version) => store
                    .get_by_name_version(&name, &version)?
                    .ok_or_else(|| CliError::NotFound(format!("no artifact {name}@{version}")))?,
                None => store.get_latest_artifact(&name)?,
            };
            print_json(&artifact);
            Ok(())
        }
    }
}

// ============================================================================
// SECTION: Shared Helpers
// ============================================================================

/// Returns the current working directory as a UTF-8 string, falling back to
/// `.` if it cannot be read or is not valid UTF-8.
fn current_dir_string() -> String {
    std::env::current_dir()
        .ok()
        .and_then(|path| path.to_str().map(ToString::to_string))
        .unwrap_or_else(|| ".".to_string())
}

/// Builds the standard `tmpDir`/`buildDir`/`rootDir` triple rooted under
/// `root_dir`'s `.forge` directory.
fn engine_dirs(root_dir: &str) -> EngineDirs {
    EngineDirs {
        tmp_dir: format!("{root_dir}/.forge/tmp"),
        build_dir: format!("{root_dir}/.forge/build"),
        root_dir: root_dir.to_string(),
    }
}

/// Serializes `value` as pretty JSON to stdout; a serialization failure
/// here would indicate a bug in a kernel type's `Serialize` impl, not
/// user error, so it is reported rather than silently swallowed.
fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(err) => eprintln!("forge: failed to format output: {err}"),
    }
}

// crates/forge-store/src/store.rs
// ============================================================================
// Module: Artifact Store
// Description: File-backed, mutex-serialized Artifact Store (§4.1, §4.1.1, §5).
// Purpose: Load/loadOrCreate/save the store's YAML file with pruning, plus a
//          handle type that serializes load-modify-save cycles in-process.
// Dependencies: forge-core, serde_yaml, time
// ============================================================================

//! ## Overview
//! Two layers live here. Free functions (`load`, `load_or_create`, `save`)
//! implement the raw file contract from §4.1: `load` errors on a missing
//! file, `load_or_create` does not (§4.1.1, resolving the spec's Open
//! Question 1). [`ArtifactStore`] is the handle orchestrators hold: it owns a
//! path and an in-process [`std::sync::Mutex`] and exposes `read`/`mutate` so
//! every operation observes a load-modify-save cycle serialized against every
//! other call on the same handle (§5 "Artifact Store operations are
//! serialized by an in-process mutex").

// ============================================================================
// SECTION: Imports
// ============================================================================

#[cfg(unix)]
use std::fs::Permissions;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;

use forge_core::now_rfc3339;

use crate::document::ArtifactStoreDocument;
use crate::error::StoreError;
use crate::prune::DEFAULT_RETENTION;
use crate::prune::prune;

/// File mode applied to the store file on every save (§4.1).
#[cfg(unix)]
const STORE_FILE_MODE: u32 = 0o600;

// ============================================================================
// SECTION: Free Functions
// ============================================================================

/// Loads the store at `path`, failing if the file does not exist.
///
/// # Errors
///
/// Returns [`StoreError::Io`] if the file cannot be read (including absence)
/// and [`StoreError::Parse`] if its contents are not valid YAML for
/// [`ArtifactStoreDocument`].
pub fn load(path: &Path) -> Result<ArtifactStoreDocument, StoreError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| StoreError::Io { path: path.to_path_buf(), source })?;
    parse_document(path, &raw)
}

/// Loads the store at `path`, or returns a freshly initialized empty store
/// if the file does not exist (§4.1.1).
///
/// # Errors
///
/// Returns [`StoreError::Io`] if the file exists but cannot be read, and
/// [`StoreError::Parse`] if its contents are not valid YAML.
pub fn load_or_create(path: &Path) -> Result<ArtifactStoreDocument, StoreError> {
    match fs::read_to_string(path) {
        Ok(raw) => parse_document(path, &raw),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Ok(ArtifactStoreDocument::empty(&now_rfc3339()))
        }
        Err(source) => Err(StoreError::Io { path: path.to_path_buf(), source }),
    }
}

fn parse_document(path: &Path, raw: &str) -> Result<ArtifactStoreDocument, StoreError> {
    serde_yaml::from_str(raw).map_err(|source| StoreError::Parse { path: path.to_path_buf(), source })
}

/// Prunes `document`'s artifacts, advances `lastUpdated`, and writes it to
/// `path` as YAML with file mode `0600` (§4.1).
///
/// # Errors
///
/// Returns [`StoreError::Parse`] if serialization fails, and
/// [`StoreError::Io`] if the file cannot be written or its permissions set.
pub fn save(path: &Path, document: &mut ArtifactStoreDocument) -> Result<(), StoreError> {
    document.artifacts = prune(std::mem::take(&mut document.artifacts), DEFAULT_RETENTION);
    document.touch(&now_rfc3339());

    let rendered = serde_yaml::to_string(document)
        .map_err(|source| StoreError::Parse { path: path.to_path_buf(), source })?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .map_err(|source| StoreError::Io { path: parent.to_path_buf(), source })?;
    }

    fs::write(path, rendered).map_err(|source| StoreError::Io { path: path.to_path_buf(), source })?;
    set_store_file_mode(path)?;
    Ok(())
}

#[cfg(unix)]
fn set_store_file_mode(path: &Path) -> Result<(), StoreError> {
    fs::set_permissions(path, Permissions::from_mode(STORE_FILE_MODE))
        .map_err(|source| StoreError::Io { path: path.to_path_buf(), source })
}

#[cfg(not(unix))]
fn set_store_file_mode(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

// ============================================================================
// SECTION: Artifact Store Handle
// ============================================================================

/// A mutex-serialized handle to one project's Artifact Store file (§5).
///
/// # Invariants
/// - Every public operation performs a full load-modify-save cycle while
///   holding the internal mutex, so two calls on the same handle never
///   interleave.
/// - This handle does not coordinate across OS processes; the store remains
///   single-writer at the file level (§5).
pub struct ArtifactStore {
    /// Path to the backing YAML file.
    path: PathBuf,
    /// Serializes load-modify-save cycles against this handle.
    guard: Mutex<()>,
}

impl ArtifactStore {
    /// Opens a handle to the store file at `path`. Does not touch the
    /// filesystem until the first operation.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), guard: Mutex::new(()) }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runs `f` against a freshly loaded (or newly created) document,
    /// without persisting any change `f` makes. Use [`ArtifactStore::mutate`]
    /// when the change must be saved.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MutexPoisoned`] if a prior holder panicked, or
    /// any error [`load_or_create`] returns.
    pub fn read<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&ArtifactStoreDocument) -> T,
    {
        let _permit = self.guard.lock().map_err(|_| StoreError::MutexPoisoned)?;
        let document = load_or_create(&self.path)?;
        Ok(f(&document))
    }

    /// Loads (or creates) the document, runs `f` against a mutable
    /// reference, then saves the result. Returns whatever `f` returns.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MutexPoisoned`] if a prior holder panicked, or
    /// any error `f`, [`load_or_create`], or [`save`] returns.
    pub fn mutate<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut ArtifactStoreDocument) -> Result<T, StoreError>,
    {
        let _permit = self.guard.lock().map_err(|_| StoreError::MutexPoisoned)?;
        let mut document = load_or_create(&self.path)?;
        let result = f(&mut document)?;
        save(&self.path, &mut document)?;
        Ok(result)
    }

    /// Upserts `artifact` by its `(type, name, version)` identity (§4.1).
    ///
    /// # Errors
    ///
    /// Returns any error the underlying load-modify-save cycle produces.
    pub fn add_or_update_artifact(&self, artifact: forge_core::Artifact) -> Result<(), StoreError> {
        self.mutate(|document| {
            document.add_or_update_artifact(artifact);
            Ok(())
        })
    }

    /// Returns the artifact named `name` with the maximum parseable RFC3339
    /// timestamp, or [`StoreError::NotFound`] if none exists (§4.1).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no artifact named `name` exists,
    /// or any error the underlying read produces.
    pub fn get_latest_artifact(&self, name: &str) -> Result<forge_core::Artifact, StoreError> {
        self.read(|document| document.latest_artifact(name).cloned())?
            .ok_or_else(|| StoreError::NotFound(format!("no artifact named {name}")))
    }

    /// Returns all artifacts of the given `type`.
    ///
    /// # Errors
    ///
    /// Returns any error the underlying read produces.
    pub fn get_by_type(&self, kind: &str) -> Result<Vec<forge_core::Artifact>, StoreError> {
        self.read(|document| {
            document.artifacts_by_type(kind).into_iter().cloned().collect()
        })
    }

    /// Returns the artifact matching `(name, version)`, if any.
    ///
    /// # Errors
    ///
    /// Returns any error the underlying read produces.
    pub fn get_by_name_version(
        &self,
        name: &str,
        version: &str,
    ) -> Result<Option<forge_core::Artifact>, StoreError> {
        self.read(|document| document.artifact_by_name_version(name, version).cloned())
    }

    /// Upserts a test environment by id.
    ///
    /// # Errors
    ///
    /// Returns any error the underlying load-modify-save cycle produces.
    pub fn add_or_update_test_environment(
        &self,
        environment: forge_core::TestEnvironment,
    ) -> Result<(), StoreError> {
        self.mutate(|document| {
            document.add_or_update_test_environment(environment);
            Ok(())
        })
    }

    /// Returns the test environment with the given id, if any.
    ///
    /// # Errors
    ///
    /// Returns any error the underlying read produces.
    pub fn get_test_environment(
        &self,
        id: &str,
    ) -> Result<Option<forge_core::TestEnvironment>, StoreError> {
        self.read(|document| document.test_environment(id).cloned())
    }

    /// Lists test environments, optionally filtered by stage.
    ///
    /// # Errors
    ///
    /// Returns any error the underlying read produces.
    pub fn list_test_environments(
        &self,
        stage: Option<&str>,
    ) -> Result<Vec<forge_core::TestEnvironment>, StoreError> {
        self.read(|document| {
            document.list_test_environments(stage).into_iter().cloned().collect()
        })
    }

    /// Deletes the test environment with the given id, returning it if it
    /// was present.
    ///
    /// # Errors
    ///
    /// Returns any error the underlying load-modify-save cycle produces.
    pub fn delete_test_environment(
        &self,
        id: &str,
    ) -> Result<Option<forge_core::TestEnvironment>, StoreError> {
        self.mutate(|document| Ok(document.delete_test_environment(id)))
    }

    /// Upserts a test report by id.
    ///
    /// # Errors
    ///
    /// Returns any error the underlying load-modify-save cycle produces.
    pub fn add_or_update_test_report(&self, report: forge_core::TestReport) -> Result<(), StoreError> {
        self.mutate(|document| {
            document.add_or_update_test_report(report);
            Ok(())
        })
    }

    /// Returns the test report with the given id, if any.
    ///
    /// # Errors
    ///
    /// Returns any error the underlying read produces.
    pub fn get_test_report(&self, id: &str) -> Result<Option<forge_core::TestReport>, StoreError> {
        self.read(|document| document.test_report(id).cloned())
    }

    /// Lists test reports, optionally filtered by stage.
    ///
    /// # Errors
    ///
    /// Returns any error the underlying read produces.
    pub fn list_test_reports(
        &self,
        stage: Option<&str>,
    ) -> Result<Vec<forge_core::TestReport>, StoreError> {
        self.read(|document| document.list_test_reports(stage).into_iter().cloned().collect())
    }

    /// Deletes the test report with the given id, returning it if it was
    /// present.
    ///
    /// # Errors
    ///
    /// Returns any error the underlying load-modify-save cycle produces.
    pub fn delete_test_report(&self, id: &str) -> Result<Option<forge_core::TestReport>, StoreError> {
        self.mutate(|document| Ok(document.delete_test_report(id)))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions")]

    use forge_core::Artifact;

    use super::*;

    fn artifact(name: &str, version: &str, timestamp: &str) -> Artifact {
        Artifact {
            name: name.to_string(),
            kind: "binary".to_string(),
            location: format!("/tmp/{name}-{version}"),
            timestamp: timestamp.to_string(),
            version: version.to_string(),
        }
    }

    #[test]
    fn load_errors_when_file_is_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing.yaml");
        let result = load(&path);
        assert!(matches!(result, Err(StoreError::Io { .. })));
    }

    #[test]
    fn load_or_create_returns_empty_store_when_file_is_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing.yaml");
        let document = load_or_create(&path).expect("load_or_create");
        assert_eq!(document.version, crate::document::STORE_VERSION);
        assert!(document.artifacts.is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("store.yaml");
        let mut document = ArtifactStoreDocument::empty("2026-07-27T10:00:00Z");
        document.add_or_update_artifact(artifact("app", "v1", "2026-07-27T10:00:00Z"));
        save(&path, &mut document).expect("save");

        let reloaded = load(&path).expect("load");
        assert_eq!(reloaded.artifacts.len(), 1);
        assert_eq!(reloaded.artifacts[0].version, "v1");
    }

    #[test]
    fn save_prunes_before_writing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("store.yaml");
        let mut document = ArtifactStoreDocument::empty("2026-07-27T10:00:00Z");
        for hour in 0 .. 5 {
            document.add_or_update_artifact(artifact(
                "app",
                &format!("v{hour}"),
                &format!("2026-07-27T0{hour}:00:00Z"),
            ));
        }
        save(&path, &mut document).expect("save");
        assert_eq!(document.artifacts.len(), 3);

        let reloaded = load(&path).expect("load");
        assert_eq!(reloaded.artifacts.len(), 3);
    }

    #[cfg(unix)]
    #[test]
    fn save_sets_file_mode_0600() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("store.yaml");
        let mut document = ArtifactStoreDocument::empty("2026-07-27T10:00:00Z");
        save(&path, &mut document).expect("save");

        let mode = fs::metadata(&path).expect("metadata").permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[test]
    fn handle_mutate_persists_across_reads() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ArtifactStore::open(dir.path().join("store.yaml"));

        store
            .mutate(|document| {
                document.add_or_update_artifact(artifact("app", "v1", "2026-07-27T10:00:00Z"));
                Ok(())
            })
            .expect("mutate");

        let count = store.read(|document| document.artifacts.len()).expect("read");
        assert_eq!(count, 1);
    }

    #[test]
    fn get_latest_artifact_errors_when_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ArtifactStore::open(dir.path().join("store.yaml"));
        let result = store.get_latest_artifact("missing");
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn get_latest_artifact_returns_max_timestamp() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ArtifactStore::open(dir.path().join("store.yaml"));
        store.add_or_update_artifact(artifact("app", "v1", "2026-07-27T09:00:00Z")).expect("add");
        store.add_or_update_artifact(artifact("app", "v2", "2026-07-27T11:00:00Z")).expect("add");
        let latest = store.get_latest_artifact("app").expect("latest");
        assert_eq!(latest.version, "v2");
    }

    #[test]
    fn handle_read_does_not_persist_new_store_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("store.yaml");
        let store = ArtifactStore::open(&path);

        let _ = store.read(|document| document.artifacts.len()).expect("read");
        assert!(!path.exists());
    }
}

// crates/forge-core/src/artifact.rs
// ============================================================================
// Module: Artifact
// Description: A produced build output tracked in the Artifact Store.
// Purpose: Model artifact identity and the (type, name, version) upsert key.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! An [`Artifact`] is what a builder engine produces: a binary path, a
//! container image reference, or any other named, typed, versioned output.
//! Identity for upsert purposes is the triple `(type, name, version)` per
//! §3; this module exposes that triple as [`ArtifactKey`] so the store can
//! use it as a map key without restating the comparison logic at each call
//! site.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Artifact
// ============================================================================

/// A produced build output tracked in the Artifact Store.
///
/// # Invariants
/// - `timestamp` is expected to be RFC3339 UTC but is not validated at
///   construction; invalid values are tolerated and sort last during
///   pruning (§4.1).
/// - Identity for `addOrUpdateArtifact` is `(type, name, version)`; adding
///   an artifact with the same triple overwrites the existing one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Artifact name (e.g. the binary or image name).
    pub name: String,
    /// Artifact type (e.g. `"binary"`, `"container"`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Where the artifact lives (path, image reference, URL, ...).
    pub location: String,
    /// RFC3339 UTC timestamp of production.
    pub timestamp: String,
    /// Version stamp shared across builders in one build invocation.
    pub version: String,
}

impl Artifact {
    /// Returns this artifact's upsert/identity key.
    #[must_use]
    pub fn key(&self) -> ArtifactKey<'_> {
        ArtifactKey {
            kind: &self.kind,
            name: &self.name,
            version: &self.version,
        }
    }

    /// Returns the `(type, name)` grouping key used for pruning (§4.1).
    #[must_use]
    pub fn group_key(&self) -> (&str, &str) {
        (&self.kind, &self.name)
    }
}

/// The `(type, name, version)` identity triple for an [`Artifact`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArtifactKey<'a> {
    /// Artifact type.
    pub kind: &'a str,
    /// Artifact name.
    pub name: &'a str,
    /// Artifact version.
    pub version: &'a str,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions")]

    use super::*;

    fn artifact(kind: &str, name: &str, version: &str, timestamp: &str) -> Artifact {
        Artifact {
            name: name.to_string(),
            kind: kind.to_string(),
            location: format!("/tmp/{name}"),
            timestamp: timestamp.to_string(),
            version: version.to_string(),
        }
    }

    #[test]
    fn key_reflects_identity_triple() {
        let a = artifact("binary", "app", "v1", "2026-07-27T10:00:00Z");
        let b = artifact("binary", "app", "v1", "2026-07-27T11:00:00Z");
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn group_key_ignores_version() {
        let a = artifact("binary", "app", "v1", "2026-07-27T10:00:00Z");
        let b = artifact("binary", "app", "v2", "2026-07-27T10:00:00Z");
        assert_eq!(a.group_key(), b.group_key());
    }

    #[test]
    fn serializes_type_field_name() {
        let a = artifact("binary", "app", "v1", "2026-07-27T10:00:00Z");
        let json = serde_json::to_value(&a).expect("serialize");
        assert_eq!(json["type"], "binary");
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn round_trips_through_json() {
        let a = artifact("container", "svc", "v3", "2026-07-27T10:00:00Z");
        let json = serde_json::to_string(&a).expect("serialize");
        let back: Artifact = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(a, back);
    }
}

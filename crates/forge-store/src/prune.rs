// crates/forge-store/src/prune.rs
// ============================================================================
// Module: Artifact Pruning
// Description: Retention policy applied to artifacts before each save.
// Purpose: Keep the N most recent artifacts per (type, name) group (§4.1).
// Dependencies: forge-core
// ============================================================================

//! ## Overview
//! Pruning groups artifacts by `(type, name)`, sorts each group by parsed
//! RFC3339 timestamp descending, and keeps the first `N`. Artifacts with an
//! unparseable timestamp sort after every artifact with a valid one, and are
//! only retained to fill out a group's quota when it has fewer than `N` valid
//! entries. Ordering across groups is unspecified; this implementation
//! iterates groups in `(type, name)` lexical order, which is deterministic
//! and good enough for round-trip stability.

use std::collections::BTreeMap;

use forge_core::Artifact;
use forge_core::parse_rfc3339;

/// Default number of artifacts retained per `(type, name)` group.
pub const DEFAULT_RETENTION: usize = 3;

/// Prunes `artifacts` to at most `keep` entries per `(type, name)` group.
///
/// Idempotent: applying this twice yields the same result as applying it
/// once, since the sort is a deterministic function of the group's contents
/// and a group already at or under `keep` is left untouched by a second pass.
#[must_use]
pub fn prune(artifacts: Vec<Artifact>, keep: usize) -> Vec<Artifact> {
    let mut groups: BTreeMap<(String, String), Vec<Artifact>> = BTreeMap::new();
    for artifact in artifacts {
        let key = (artifact.kind.clone(), artifact.name.clone());
        groups.entry(key).or_default().push(artifact);
    }

    let mut pruned = Vec::new();
    for (_key, mut group) in groups {
        group.sort_by(|a, b| match (parse_rfc3339(&a.timestamp), parse_rfc3339(&b.timestamp)) {
            (Some(a_time), Some(b_time)) => b_time.cmp(&a_time),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        group.truncate(keep);
        pruned.extend(group);
    }
    pruned
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions")]

    use super::*;

    fn artifact(kind: &str, name: &str, version: &str, timestamp: &str) -> Artifact {
        Artifact {
            name: name.to_string(),
            kind: kind.to_string(),
            location: format!("/tmp/{name}-{version}"),
            timestamp: timestamp.to_string(),
            version: version.to_string(),
        }
    }

    #[test]
    fn keeps_three_newest_per_group() {
        let artifacts = vec![
            artifact("binary", "app", "v1", "2026-07-27T06:00:00Z"),
            artifact("binary", "app", "v2", "2026-07-27T07:00:00Z"),
            artifact("binary", "app", "v3", "2026-07-27T08:00:00Z"),
            artifact("binary", "app", "v4", "2026-07-27T09:00:00Z"),
            artifact("binary", "app", "v5", "2026-07-27T10:00:00Z"),
        ];
        let kept = prune(artifacts, DEFAULT_RETENTION);
        assert_eq!(kept.len(), 3);
        let versions: Vec<&str> = kept.iter().map(|a| a.version.as_str()).collect();
        assert_eq!(versions, vec!["v5", "v4", "v3"]);
    }

    #[test]
    fn multi_group_retention_is_independent() {
        let mut artifacts = Vec::new();
        for hour in 0 .. 5 {
            artifacts.push(artifact("binary", "app", &format!("b{hour}"), &format!("2026-07-27T0{hour}:00:00Z")));
        }
        for hour in 0 .. 4 {
            artifacts.push(artifact("container", "app", &format!("c{hour}"), &format!("2026-07-27T0{hour}:00:00Z")));
        }
        for hour in 0 .. 2 {
            artifacts.push(artifact("binary", "other", &format!("o{hour}"), &format!("2026-07-27T0{hour}:00:00Z")));
        }
        let kept = prune(artifacts, DEFAULT_RETENTION);
        assert_eq!(kept.len(), 8);
    }

    #[test]
    fn invalid_timestamps_sort_last_and_fill_quota() {
        let artifacts = vec![
            artifact("binary", "app", "good", "2026-07-27T10:00:00Z"),
            artifact("binary", "app", "bad", "not-a-timestamp"),
        ];
        let kept = prune(artifacts, DEFAULT_RETENTION);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].version, "good");
        assert_eq!(kept[1].version, "bad");
    }

    #[test]
    fn invalid_timestamps_are_discarded_once_quota_is_full_of_valid_entries() {
        let artifacts = vec![
            artifact("binary", "app", "v1", "2026-07-27T08:00:00Z"),
            artifact("binary", "app", "v2", "2026-07-27T09:00:00Z"),
            artifact("binary", "app", "v3", "2026-07-27T10:00:00Z"),
            artifact("binary", "app", "bad", "not-a-timestamp"),
        ];
        let kept = prune(artifacts, DEFAULT_RETENTION);
        assert_eq!(kept.len(), 3);
        assert!(kept.iter().all(|a| a.version != "bad"));
    }

    #[test]
    fn pruning_twice_is_idempotent() {
        let artifacts = vec![
            artifact("binary", "app", "v1", "2026-07-27T06:00:00Z"),
            artifact("binary", "app", "v2", "2026-07-27T07:00:00Z"),
            artifact("binary", "app", "v3", "2026-07-27T08:00:00Z"),
            artifact("binary", "app", "v4", "2026-07-27T09:00:00Z"),
        ];
        let once = prune(artifacts, DEFAULT_RETENTION);
        let twice = prune(once.clone(), DEFAULT_RETENTION);
        assert_eq!(once, twice);
    }
}

#[cfg(test)]
mod proptests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions")]

    use std::collections::HashMap;

    use forge_core::Artifact;
    use proptest::collection::vec as prop_vec;
    use proptest::prelude::*;

    use super::DEFAULT_RETENTION;
    use super::prune;

    fn arb_artifact() -> impl Strategy<Value = Artifact> {
        (0 .. 3usize, 0 .. 2usize, 0 .. 1000u32, prop::bool::ANY).prop_map(
            |(kind_index, name_index, hour_offset, invalid)| {
                let kind = ["binary", "container", "archive"][kind_index];
                let name = ["app", "sidecar"][name_index];
                let timestamp = if invalid {
                    "not-a-timestamp".to_string()
                } else {
                    let day = 1 + hour_offset / 24 % 27;
                    let hour = hour_offset % 24;
                    format!("2026-01-{day:02}T{hour:02}:00:00Z")
                };
                Artifact {
                    name: name.to_string(),
                    kind: kind.to_string(),
                    location: format!("/tmp/{name}"),
                    timestamp,
                    version: format!("v{hour_offset}"),
                }
            },
        )
    }

    proptest! {
        #[test]
        fn prune_is_idempotent(artifacts in prop_vec(arb_artifact(), 0 .. 30)) {
            let once = prune(artifacts, DEFAULT_RETENTION);
            let twice = prune(once.clone(), DEFAULT_RETENTION);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prune_never_exceeds_retention_per_group(artifacts in prop_vec(arb_artifact(), 0 .. 30)) {
            let kept = prune(artifacts, DEFAULT_RETENTION);
            let mut counts: HashMap<(String, String), usize> = HashMap::new();
            for artifact in &kept {
                *counts.entry((artifact.kind.clone(), artifact.name.clone())).or_insert(0) += 1;
            }
            for count in counts.values() {
                prop_assert!(*count <= DEFAULT_RETENTION);
            }
        }
    }
}

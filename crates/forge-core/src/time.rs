// crates/forge-core/src/time.rs
// ============================================================================
// Module: Forge Time Helpers
// Description: RFC3339 UTC timestamp parsing and formatting for the store.
// Purpose: Provide a single, consistent timestamp representation across the
//          Artifact Store, test environments, and test reports.
// Dependencies: time
// ============================================================================

//! ## Overview
//! Every timestamp in the Artifact Store is stored as an RFC3339 string in
//! UTC. This module centralizes parsing so pruning (§4.1) and merge (§4.6)
//! agree on exactly one notion of "valid" vs. "unparseable" timestamp.

// ============================================================================
// SECTION: Imports
// ============================================================================

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Functions
// ============================================================================

/// Parses an RFC3339 timestamp string, returning `None` when invalid.
///
/// Invalid timestamps are not an error in this crate; callers (store
/// pruning, `getLatestArtifact`) treat them as "sorts last" rather than a
/// hard failure, per the data model invariant in §3.
#[must_use]
pub fn parse_rfc3339(value: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(value, &Rfc3339).ok()
}

/// Returns the current instant formatted as RFC3339 UTC.
///
/// # Panics
///
/// Panics only if the `time` crate's formatter itself is broken, which would
/// indicate a build misconfiguration rather than a runtime condition.
#[must_use]
pub fn now_rfc3339() -> String {
    format_rfc3339(OffsetDateTime::now_utc())
}

/// Formats a timestamp as RFC3339 UTC.
#[must_use]
#[expect(clippy::missing_panics_doc, reason = "Rfc3339 formatting of a valid OffsetDateTime cannot fail in practice")]
pub fn format_rfc3339(at: OffsetDateTime) -> String {
    at.to_offset(time::UtcOffset::UTC)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_rfc3339() {
        assert!(parse_rfc3339("2026-07-27T10:00:00Z").is_some());
    }

    #[test]
    fn rejects_invalid_rfc3339() {
        assert!(parse_rfc3339("not-a-timestamp").is_none());
        assert!(parse_rfc3339("2026-13-40").is_none());
    }

    #[test]
    fn now_round_trips_through_parse() {
        let formatted = now_rfc3339();
        assert!(parse_rfc3339(&formatted).is_some());
    }
}

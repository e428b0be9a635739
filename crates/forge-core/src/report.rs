// crates/forge-core/src/report.rs
// ============================================================================
// Module: Test Report
// Description: Test execution results tracked in the Artifact Store.
// Purpose: Model a single runner's report and the merged, aggregate report.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`TestReport`] is immutable once written except for `updated_at` (§3).
//! This module also defines [`TestStats`] and [`Coverage`], the two
//! sub-structures the Test-Runner Orchestrator's merge rules (§4.6) operate
//! on.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Status
// ============================================================================

/// Test report outcome.
///
/// # Invariants
/// - Exactly two variants; an "unknown" runner status defaults to `Failed`
///   per the merge rule in §4.6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// All tests passed.
    Passed,
    /// At least one test failed, or the runner's status was unrecognized.
    Failed,
}

impl ReportStatus {
    /// Parses a runner-reported status string, defaulting unknown values to
    /// [`ReportStatus::Failed`] per §4.6 ("unknown defaults to failed").
    #[must_use]
    pub fn from_runner_str(raw: &str) -> Self {
        match raw {
            "passed" => Self::Passed,
            _ => Self::Failed,
        }
    }
}

// A hand-written `Deserialize` (rather than deriving it alongside
// `Serialize`) so a runner's unrecognized status string defaults to
// `Failed` instead of rejecting the whole `TestReport` outright; the
// derived impl would have treated "flaky" or similar as a hard parse
// error rather than applying §4.6's documented default.
impl<'de> Deserialize<'de> for ReportStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_runner_str(&raw))
    }
}

// ============================================================================
// SECTION: Test Stats / Coverage
// ============================================================================

/// Test count breakdown.
///
/// # Invariants
/// - Merging two `TestStats` sums each field (§4.6).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestStats {
    /// Total tests executed.
    pub total: u64,
    /// Tests that passed.
    pub passed: u64,
    /// Tests that failed.
    pub failed: u64,
    /// Tests that were skipped.
    pub skipped: u64,
}

impl TestStats {
    /// Returns the field-wise sum of two `TestStats`.
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        Self {
            total: self.total + other.total,
            passed: self.passed + other.passed,
            failed: self.failed + other.failed,
            skipped: self.skipped + other.skipped,
        }
    }
}

/// Coverage summary for a test run.
///
/// # Invariants
/// - `percentage` is expected in `[0.0, 100.0]` but is not clamped here;
///   runners are trusted to report sane values (§4.6 does not specify
///   clamping).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coverage {
    /// Coverage percentage.
    pub percentage: f64,
    /// Optional path to a coverage report file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

// ============================================================================
// SECTION: Test Report
// ============================================================================

/// A test execution report, either from a single runner or the merged
/// aggregate of a stage's runners.
///
/// # Invariants
/// - Immutable once written except for `updated_at` (§3).
/// - `duration` is in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestReport {
    /// Report identity.
    pub id: String,
    /// Test stage this report belongs to.
    pub stage: String,
    /// Outcome.
    pub status: ReportStatus,
    /// RFC3339 UTC start time.
    pub start_time: String,
    /// Duration in seconds.
    pub duration: f64,
    /// Test count breakdown.
    pub test_stats: TestStats,
    /// Coverage summary, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<Coverage>,
    /// Artifact file paths produced by the test run.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifact_files: Vec<String>,
    /// Path to captured test output, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    /// Error message, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// RFC3339 UTC creation timestamp.
    pub created_at: String,
    /// RFC3339 UTC last-update timestamp.
    pub updated_at: String,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions")]

    use super::*;

    #[test]
    fn stats_merge_sums_fields() {
        let a = TestStats {
            total: 10,
            passed: 8,
            failed: 2,
            skipped: 0,
        };
        let b = TestStats {
            total: 5,
            passed: 5,
            failed: 0,
            skipped: 0,
        };
        let merged = a.merge(b);
        assert_eq!(merged.total, 15);
        assert_eq!(merged.passed, 13);
        assert_eq!(merged.failed, 2);
        assert_eq!(merged.skipped, 0);
    }

    #[test]
    fn unknown_runner_status_defaults_to_failed() {
        assert_eq!(ReportStatus::from_runner_str("passed"), ReportStatus::Passed);
        assert_eq!(ReportStatus::from_runner_str("failed"), ReportStatus::Failed);
        assert_eq!(ReportStatus::from_runner_str("flaky"), ReportStatus::Failed);
    }

    #[test]
    fn deserialize_defaults_unrecognized_status_to_failed() {
        let status: ReportStatus = serde_json::from_value(serde_json::json!("flaky")).expect("deserialize");
        assert_eq!(status, ReportStatus::Failed);
    }

    #[test]
    fn optional_fields_omitted_when_absent() {
        let report = TestReport {
            id: "r1".to_string(),
            stage: "unit".to_string(),
            status: ReportStatus::Passed,
            start_time: "2026-07-27T10:00:00Z".to_string(),
            duration: 1.0,
            test_stats: TestStats::default(),
            coverage: None,
            artifact_files: Vec::new(),
            output_path: None,
            error_message: None,
            created_at: "2026-07-27T10:00:00Z".to_string(),
            updated_at: "2026-07-27T10:00:00Z".to_string(),
        };
        let json = serde_json::to_value(&report).expect("serialize");
        assert!(json.get("coverage").is_none());
        assert!(json.get("outputPath").is_none());
    }
}

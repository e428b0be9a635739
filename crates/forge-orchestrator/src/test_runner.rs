// crates/forge-orchestrator/src/test_runner.rs
// ============================================================================
// Module: Test-Runner Orchestrator
// Description: Runs a stage's resolved test runners and merges their
//              reports into one aggregate (§4.6).
// Purpose: Implement the commutative/associative merge rules so runner
//          order never affects the merged outcome, and fail-fast only on
//          the tool call itself erroring, never on a "failed" report.
// Dependencies: forge-core, forge-invoker
// ============================================================================

use std::sync::Arc;

use forge_core::CancellationToken;
use forge_core::Coverage;
use forge_core::Logger;
use forge_core::ReportStatus;
use forge_core::TestReport;
use forge_invoker::EngineInvoker;
use forge_invoker::InvocationResult;
use forge_resolver::ResolvedSubEngine;
use serde_json::Value;

use crate::dirs::sub_engine_timeout;
use crate::error::OrchestratorError;

/// Runs a stage's resolved runners in order and merges their reports.
pub struct TestRunnerOrchestrator<'a> {
    /// Spawns resolved sub-engines and parses their results.
    invoker: &'a EngineInvoker,
    /// Diagnostic sink for pipeline progress.
    logger: Arc<dyn Logger>,
}

impl<'a> TestRunnerOrchestrator<'a> {
    /// Builds an orchestrator wired to the given invoker.
    #[must_use]
    pub fn new(invoker: &'a EngineInvoker, logger: Arc<dyn Logger>) -> Self {
        Self { invoker, logger }
    }

    /// Runs every resolved runner in `runners` against `base_params`,
    /// merging their reports per §4.6.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::EmptyRunnerList`] if `runners` is empty,
    /// [`OrchestratorError::RunFailed`] on the first runner whose tool call
    /// itself errors (a `"failed"` report is not an error), and
    /// [`OrchestratorError::UnexpectedReportResult`] if a runner answers
    /// with a non-report shape.
    pub async fn run(
        &self,
        stage: &str,
        runners: &[ResolvedSubEngine],
        base_params: Value,
        cancellation: &CancellationToken,
    ) -> Result<TestReport, OrchestratorError> {
        if runners.is_empty() {
            return Err(OrchestratorError::EmptyRunnerList { stage: stage.to_string() });
        }

        let mut reports = Vec::with_capacity(runners.len());
        for (index, runner) in runners.iter().enumerate() {
            let engine_label = format!("{stage} runner #{index}");
            self.logger.info(&format!("test {stage}: invoking {engine_label}"));

            let timeout = sub_engine_timeout(&runner.config);
            let result = self
                .invoker
                .invoke_test_runner(&engine_label, runner, "run", base_params.clone(), timeout, cancellation)
                .await
                .map_err(|source| OrchestratorError::RunFailed {
                    engine: engine_label.clone(),
                    index,
                    source,
                })?;

            match result {
                InvocationResult::TestReport(report) => reports.push(report),
                InvocationResult::Artifact(_)
                | InvocationResult::Artifacts(_)
                | InvocationResult::EnvCreate { .. }
                | InvocationResult::Unstructured(_) => {
                    return Err(OrchestratorError::UnexpectedReportResult { engine: engine_label, index });
                }
            }
        }

        let mut merged = reports.remove(0);
        for next in reports {
            merged = merge_reports(merged, next);
        }
        merged.start_time = forge_core::now_rfc3339();
        Ok(merged)
    }
}

/// Merges two reports per §4.6's rules. Commutative and associative on
/// `status`; accumulative on counts.
fn merge_reports(a: TestReport, b: TestReport) -> TestReport {
    let status = match (a.status, b.status) {
        (ReportStatus::Failed, _) | (_, ReportStatus::Failed) => ReportStatus::Failed,
        (ReportStatus::Passed, ReportStatus::Passed) => ReportStatus::Passed,
    };

    TestReport {
        id: a.id,
        stage: a.stage,
        status,
        start_time: String::new(),
        duration: a.duration + b.duration,
        test_stats: a.test_stats.merge(b.test_stats),
        coverage: merge_coverage(a.coverage, b.coverage, a.test_stats.total, b.test_stats.total),
        artifact_files: {
            let mut files = a.artifact_files;
            files.extend(b.artifact_files);
            files
        },
        output_path: join_non_empty(a.output_path, b.output_path, ","),
        error_message: join_non_empty(a.error_message, b.error_message, "; "),
        created_at: a.created_at,
        updated_at: b.updated_at,
    }
}

/// Merges two optional coverage summaries as a test-count-weighted average,
/// falling back to `b`'s percentage if both weights are zero.
fn merge_coverage(
    a: Option<Coverage>,
    b: Option<Coverage>,
    weight_a: u64,
    weight_b: u64,
) -> Option<Coverage> {
    match (a, b) {
        (None, None) => None,
        (Some(only), None) | (None, Some(only)) => Some(only),
        (Some(a), Some(b)) => {
            #[allow(
                clippy::cast_precision_loss,
                reason = "test counts fit comfortably in f64's exact integer range for any real test suite"
            )]
            let total_weight = (weight_a + weight_b) as f64;
            let percentage = if total_weight > 0.0 {
                #[allow(
                    clippy::cast_precision_loss,
                    reason = "test counts fit comfortably in f64's exact integer range for any real test suite"
                )]
                let (weight_a, weight_b) = (weight_a as f64, weight_b as f64);
                (a.percentage * weight_a + b.percentage * weight_b) / total_weight
            } else {
                b.percentage
            };
            Some(Coverage { percentage, file_path: join_non_empty(a.file_path, b.file_path, ",") })
        }
    }
}

/// Joins two optional strings with `sep`, dropping empty halves.
fn join_non_empty(a: Option<String>, b: Option<String>, sep: &str) -> Option<String> {
    match (a.filter(|s| !s.is_empty()), b.filter(|s| !s.is_empty())) {
        (None, None) => None,
        (Some(only), None) | (None, Some(only)) => Some(only),
        (Some(a), Some(b)) => Some(format!("{a}{sep}{b}")),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions")]

    use forge_core::TestStats;

    use super::*;

    fn report(status: ReportStatus, total: u64, percentage: f64) -> TestReport {
        TestReport {
            id: "r1".to_string(),
            stage: "unit".to_string(),
            status,
            start_time: "2026-07-27T10:00:00Z".to_string(),
            duration: 1.0,
            test_stats: TestStats { total, passed: total, failed: 0, skipped: 0 },
            coverage: Some(Coverage { percentage, file_path: Some("cov.xml".to_string()) }),
            artifact_files: vec!["out.log".to_string()],
            output_path: Some("/tmp/out".to_string()),
            error_message: None,
            created_at: "2026-07-27T10:00:00Z".to_string(),
            updated_at: "2026-07-27T10:00:01Z".to_string(),
        }
    }

    #[test]
    fn merge_sums_stats_and_weights_coverage() {
        let a = report(ReportStatus::Passed, 8, 100.0);
        let b = report(ReportStatus::Passed, 2, 50.0);
        let merged = merge_reports(a, b);
        assert_eq!(merged.status, ReportStatus::Passed);
        assert_eq!(merged.test_stats.total, 10);
        assert_eq!(merged.duration, 2.0);
        let coverage = merged.coverage.expect("coverage");
        assert!((coverage.percentage - 90.0).abs() < f64::EPSILON);
        assert_eq!(coverage.file_path.as_deref(), Some("cov.xml,cov.xml"));
        assert_eq!(merged.artifact_files, vec!["out.log".to_string(), "out.log".to_string()]);
    }

    #[test]
    fn merge_status_is_failed_if_any_runner_failed() {
        let a = report(ReportStatus::Passed, 5, 100.0);
        let b = report(ReportStatus::Failed, 5, 0.0);
        assert_eq!(merge_reports(a, b).status, ReportStatus::Failed);
    }

    #[test]
    fn merge_coverage_falls_back_to_last_when_weights_are_zero() {
        let a = report(ReportStatus::Passed, 0, 100.0);
        let b = report(ReportStatus::Passed, 0, 42.0);
        let coverage = merge_reports(a, b).coverage.expect("coverage");
        assert!((coverage.percentage - 42.0).abs() < f64::EPSILON);
    }

    #[test]
    fn error_message_joins_only_non_empty_halves() {
        let mut a = report(ReportStatus::Failed, 1, 0.0);
        a.error_message = Some("boom".to_string());
        let b = report(ReportStatus::Passed, 1, 100.0);
        assert_eq!(merge_reports(a, b).error_message.as_deref(), Some("boom"));
    }
}

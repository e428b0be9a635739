// crates/forge-invoker/src/result.rs
// ============================================================================
// Module: Invocation Result
// Description: Tagged result shapes parsed out of a tool call's response.
// Purpose: Implement §4.4.1's "dynamic result shapes" design note: engines
//          answer with a loosely-typed `structured` payload or free text, and
//          the Invoker turns that into a typed value per the tool that was
//          called, falling back to `Unstructured` rather than erroring.
// Dependencies: serde_json, forge-core, forge-protocol
// ============================================================================

//! ## Overview
//! Each `parse_*` function here tries, in order: the response's `structured`
//! field; `content[0].text` parsed as JSON; and finally a raw-text
//! [`InvocationResult::Unstructured`] fallback. None of these functions ever
//! fail outright — an engine that only emits free text still gets a usable
//! result, just an opaque one.

use forge_core::Artifact;
use forge_core::TestReport;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use forge_protocol::ToolCallResult;

// ============================================================================
// SECTION: Invocation Result
// ============================================================================

/// The parsed outcome of one tool call, shaped per the tool that produced it.
#[derive(Debug, Clone)]
pub enum InvocationResult {
    /// A single produced artifact (`build`).
    Artifact(Artifact),
    /// Multiple produced artifacts (`buildBatch`).
    Artifacts(Vec<Artifact>),
    /// A test run's report (`run`).
    TestReport(TestReport),
    /// A testenv sub-engine's contribution to an environment (`create`).
    EnvCreate {
        /// Namespaced relative file paths this sub-engine contributed.
        files: BTreeMap<String, String>,
        /// Namespaced metadata this sub-engine contributed.
        metadata: BTreeMap<String, String>,
        /// Absolute paths of resources this sub-engine manages.
        managed_resources: Vec<String>,
    },
    /// The response did not match any tool-specific shape; the raw JSON
    /// value (or wrapped free text) is preserved as-is.
    Unstructured(Value),
}

/// The free-form shape a testenv `create` tool is expected to answer with.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct EnvCreatePayload {
    /// Namespaced relative file paths.
    files: BTreeMap<String, String>,
    /// Namespaced metadata.
    metadata: BTreeMap<String, String>,
    /// Absolute managed resource paths.
    managed_resources: Vec<String>,
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Returns the result's `structured` payload when present, else attempts to
/// parse `content[0].text` (really: every text block joined) as JSON.
fn structured_or_text_json(result: &ToolCallResult) -> Option<Value> {
    if let Some(structured) = &result.structured {
        return Some(structured.clone());
    }
    serde_json::from_str(&result.text()).ok()
}

/// Parses a `build`/`buildBatch` tool's result.
///
/// Tries a single [`Artifact`] first, then a list of them, falling back to
/// [`InvocationResult::Unstructured`].
#[must_use]
pub fn parse_build_result(result: &ToolCallResult) -> InvocationResult {
    let Some(value) = structured_or_text_json(result) else {
        return InvocationResult::Unstructured(Value::String(result.text()));
    };
    if let Ok(artifact) = serde_json::from_value::<Artifact>(value.clone()) {
        return InvocationResult::Artifact(artifact);
    }
    if let Ok(artifacts) = serde_json::from_value::<Vec<Artifact>>(value.clone()) {
        return InvocationResult::Artifacts(artifacts);
    }
    InvocationResult::Unstructured(value)
}

/// Parses a `run` tool's result into a [`TestReport`].
#[must_use]
pub fn parse_run_result(result: &ToolCallResult) -> InvocationResult {
    let Some(value) = structured_or_text_json(result) else {
        return InvocationResult::Unstructured(Value::String(result.text()));
    };
    match serde_json::from_value::<TestReport>(value.clone()) {
        Ok(report) => InvocationResult::TestReport(report),
        Err(_) => InvocationResult::Unstructured(value),
    }
}

/// Parses a testenv `create` tool's result into the namespaced
/// `{files?, metadata?, managedResources?}` shape (§4.7).
#[must_use]
pub fn parse_testenv_create_result(result: &ToolCallResult) -> InvocationResult {
    let Some(value) = structured_or_text_json(result) else {
        return InvocationResult::Unstructured(Value::String(result.text()));
    };
    if value.is_object() {
        let payload: EnvCreatePayload = serde_json::from_value(value.clone()).unwrap_or_default();
        return InvocationResult::EnvCreate {
            files: payload.files,
            metadata: payload.metadata,
            managed_resources: payload.managed_resources,
        };
    }
    InvocationResult::Unstructured(value)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions")]

    use super::*;
    use forge_protocol::ToolContent;

    fn structured(value: Value) -> ToolCallResult {
        ToolCallResult { content: Vec::new(), is_error: false, structured: Some(value) }
    }

    fn text_only(text: &str) -> ToolCallResult {
        ToolCallResult {
            content: vec![ToolContent { content_type: "text".to_string(), text: text.to_string() }],
            is_error: false,
            structured: None,
        }
    }

    #[test]
    fn parses_single_artifact_from_structured() {
        let result = structured(serde_json::json!({
            "name": "app", "type": "binary", "location": "/bin/app",
            "timestamp": "2026-07-27T10:00:00Z", "version": "v1"
        }));
        assert!(matches!(parse_build_result(&result), InvocationResult::Artifact(_)));
    }

    #[test]
    fn parses_artifact_list_from_structured() {
        let result = structured(serde_json::json!([
            {"name": "app", "type": "binary", "location": "/bin/app",
             "timestamp": "2026-07-27T10:00:00Z", "version": "v1"}
        ]));
        let InvocationResult::Artifacts(list) = parse_build_result(&result) else {
            unreachable!("expected artifacts")
        };
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn parses_artifact_from_text_fallback() {
        let result = text_only(
            r#"{"name": "app", "type": "binary", "location": "/bin/app", "timestamp": "2026-07-27T10:00:00Z", "version": "v1"}"#,
        );
        assert!(matches!(parse_build_result(&result), InvocationResult::Artifact(_)));
    }

    #[test]
    fn falls_back_to_unstructured_on_free_text() {
        let result = text_only("build succeeded");
        let InvocationResult::Unstructured(Value::String(text)) = parse_build_result(&result) else {
            unreachable!("expected unstructured text")
        };
        assert_eq!(text, "build succeeded");
    }

    #[test]
    fn parses_test_report_from_structured() {
        let result = structured(serde_json::json!({
            "id": "r1", "stage": "unit", "status": "passed",
            "startTime": "2026-07-27T10:00:00Z", "duration": 1.5,
            "testStats": {"total": 3, "passed": 3, "failed": 0, "skipped": 0},
            "createdAt": "2026-07-27T10:00:00Z", "updatedAt": "2026-07-27T10:00:00Z"
        }));
        assert!(matches!(parse_run_result(&result), InvocationResult::TestReport(_)));
    }

    #[test]
    fn parses_env_create_with_all_fields_absent() {
        let result = structured(serde_json::json!({}));
        let InvocationResult::EnvCreate { files, metadata, managed_resources } =
            parse_testenv_create_result(&result)
        else {
            unreachable!("expected env create")
        };
        assert!(files.is_empty());
        assert!(metadata.is_empty());
        assert!(managed_resources.is_empty());
    }

    #[test]
    fn parses_env_create_namespaced_fields() {
        let result = structured(serde_json::json!({
            "files": {"docker.compose": "docker-compose.yml"},
            "managedResources": ["/tmp/env-1/container-123"]
        }));
        let InvocationResult::EnvCreate { files, managed_resources, .. } =
            parse_testenv_create_result(&result)
        else {
            unreachable!("expected env create")
        };
        assert_eq!(files.get("docker.compose"), Some(&"docker-compose.yml".to_string()));
        assert_eq!(managed_resources, vec!["/tmp/env-1/container-123".to_string()]);
    }
}

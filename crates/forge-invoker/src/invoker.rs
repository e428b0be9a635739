// crates/forge-invoker/src/invoker.rs
// ============================================================================
// Module: Engine Invoker
// Description: Spawns a resolved sub-engine, sends one tool call, and parses
//              its typed result.
// Purpose: Implement §4.4's invocation contract on top of an already
//          `forge-resolver`-resolved sub-engine: config injection, then
//          spawn + call (`forge-protocol::ToolClient`), then result parsing
//          (§4.4.1).
// Dependencies: forge-protocol, forge-resolver, forge-core, tokio (via the
//               Tool Client's own async surface)
// ============================================================================

//! ## Overview
//! `EngineInvoker` deliberately does not re-resolve an [`forge_core::EngineUri`]
//! itself: `forge-resolver::Resolver` already turns a builder/test-runner/
//! testenv reference into an ordered list of `(command, args, config)`
//! tuples, and re-doing that work here would duplicate the alias-cycle and
//! role-matching checks the Resolver already owns. A caller (an
//! orchestrator) resolves once, then calls [`EngineInvoker::invoke_builder`],
//! [`EngineInvoker::invoke_test_runner`], [`EngineInvoker::invoke_testenv_create`],
//! or [`EngineInvoker::invoke_testenv_delete`] once per resolved sub-engine.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use forge_core::CancellationToken;
use forge_core::Logger;
use forge_protocol::ToolClient;
use forge_resolver::ResolvedSubEngine;
use forge_resolver::ResolvedTestenvSubEngine;
use serde_json::Value;

use crate::config_injection;
use crate::error::InvokerError;
use crate::result::InvocationResult;
use crate::result::parse_build_result;
use crate::result::parse_run_result;
use crate::result::parse_testenv_create_result;

/// Spawns resolved sub-engines and drives them through one tool call each.
pub struct EngineInvoker {
    /// Diagnostic sink for the spawned Tool Client's stderr forwarding.
    logger: Arc<dyn Logger>,
}

impl EngineInvoker {
    /// Builds an invoker that forwards spawned engines' stderr to `logger`.
    #[must_use]
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self { logger }
    }

    /// Invokes a resolved builder sub-engine's `tool`, injecting its declared
    /// config into `arguments` first, and parses the result as a `build`
    /// response (§4.4, §4.4.1).
    ///
    /// # Errors
    ///
    /// Returns [`InvokerError::Call`] on spawn/protocol/timeout/cancellation
    /// failure.
    pub async fn invoke_builder(
        &self,
        engine_label: &str,
        resolved: &ResolvedSubEngine,
        tool: &str,
        arguments: Value,
        timeout: Option<Duration>,
        cancellation: &CancellationToken,
    ) -> Result<InvocationResult, InvokerError> {
        let result = self.call(engine_label, resolved, tool, arguments, timeout, cancellation).await?;
        Ok(parse_build_result(&result))
    }

    /// Invokes a resolved test-runner sub-engine's `tool`, injecting its
    /// declared config into `arguments` first, and parses the result as a
    /// `run` response.
    ///
    /// # Errors
    ///
    /// Returns [`InvokerError::Call`] on spawn/protocol/timeout/cancellation
    /// failure.
    pub async fn invoke_test_runner(
        &self,
        engine_label: &str,
        resolved: &ResolvedSubEngine,
        tool: &str,
        arguments: Value,
        timeout: Option<Duration>,
        cancellation: &CancellationToken,
    ) -> Result<InvocationResult, InvokerError> {
        let result = self.call(engine_label, resolved, tool, arguments, timeout, cancellation).await?;
        Ok(parse_run_result(&result))
    }

    /// Invokes a resolved testenv sub-engine's `create` tool, merging its
    /// free-form declared spec into `arguments` (keys the caller did not
    /// already set), and parses the result per §4.7's
    /// `{files?, metadata?, managedResources?}` shape.
    ///
    /// # Errors
    ///
    /// Returns [`InvokerError::Call`] on spawn/protocol/timeout/cancellation
    /// failure.
    pub async fn invoke_testenv_create(
        &self,
        engine_label: &str,
        resolved: &ResolvedTestenvSubEngine,
        tool: &str,
        mut arguments: Value,
        timeout: Option<Duration>,
        cancellation: &CancellationToken,
    ) -> Result<InvocationResult, InvokerError> {
        merge_spec(&mut arguments, &resolved.spec);
        let result =
            self.call_testenv(engine_label, resolved, tool, arguments, timeout, cancellation).await?;
        Ok(parse_testenv_create_result(&result))
    }

    /// Invokes a resolved testenv sub-engine's `delete` tool. §4.7's `delete`
    /// contract has no structured result to parse; success is signaled by
    /// the call itself not erroring.
    ///
    /// # Errors
    ///
    /// Returns [`InvokerError::Call`] on spawn/protocol/timeout/cancellation
    /// failure, or a domain error the sub-engine reported.
    pub async fn invoke_testenv_delete(
        &self,
        engine_label: &str,
        resolved: &ResolvedTestenvSubEngine,
        tool: &str,
        mut arguments: Value,
        timeout: Option<Duration>,
        cancellation: &CancellationToken,
    ) -> Result<(), InvokerError> {
        merge_spec(&mut arguments, &resolved.spec);
        self.call_testenv(engine_label, resolved, tool, arguments, timeout, cancellation).await?;
        Ok(())
    }

    /// Spawns a builder/test-runner sub-engine and sends one call, injecting
    /// its config into `arguments` first.
    async fn call(
        &self,
        engine_label: &str,
        resolved: &ResolvedSubEngine,
        tool: &str,
        mut arguments: Value,
        timeout: Option<Duration>,
        cancellation: &CancellationToken,
    ) -> Result<forge_protocol::ToolCallResult, InvokerError> {
        config_injection::inject(&mut arguments, &resolved.config);
        let mut client = ToolClient::spawn(
            engine_label.to_string(),
            &resolved.command,
            &resolved.args,
            &BTreeMap::new(),
            None,
            Arc::clone(&self.logger),
        )?;
        let result = client.call(tool, arguments, timeout, cancellation).await?;
        Ok(result)
    }

    /// Spawns a testenv sub-engine and sends one call.
    async fn call_testenv(
        &self,
        engine_label: &str,
        resolved: &ResolvedTestenvSubEngine,
        tool: &str,
        arguments: Value,
        timeout: Option<Duration>,
        cancellation: &CancellationToken,
    ) -> Result<forge_protocol::ToolCallResult, InvokerError> {
        let mut client = ToolClient::spawn(
            engine_label.to_string(),
            &resolved.command,
            &resolved.args,
            &BTreeMap::new(),
            None,
            Arc::clone(&self.logger),
        )?;
        let result = client.call(tool, arguments, timeout, cancellation).await?;
        Ok(result)
    }
}

/// Merges a testenv sub-engine's free-form `spec` map into `arguments` for
/// any key not already present there, mirroring the precedence rule §4.4
/// applies to the constrained builder/test-runner config shape.
fn merge_spec(arguments: &mut Value, spec: &BTreeMap<String, Value>) {
    let Some(map) = arguments.as_object_mut() else { return };
    for (key, value) in spec {
        map.entry(key.clone()).or_insert_with(|| value.clone());
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions")]

    use forge_core::NullLogger;
    use forge_core::SubEngineConfigSpec;

    use super::*;

    fn canned_resolved_builder(response_json: &str) -> ResolvedSubEngine {
        let script = format!("read -r _line; printf '%s\\n' '{response_json}'");
        ResolvedSubEngine {
            command: "sh".to_string(),
            args: vec!["-c".to_string(), script],
            config: SubEngineConfigSpec::default(),
        }
    }

    #[tokio::test]
    async fn invoke_builder_parses_structured_artifact() {
        let resolved = canned_resolved_builder(
            r#"{"id":1,"result":{"content":[],"structured":{
                "name":"app","type":"binary","location":"/bin/app",
                "timestamp":"2026-07-27T10:00:00Z","version":"v1"
            }}}"#,
        );
        let invoker = EngineInvoker::new(Arc::new(NullLogger));
        let result = invoker
            .invoke_builder(
                "shell://canned",
                &resolved,
                "build",
                serde_json::json!({"name": "app"}),
                None,
                &CancellationToken::new(),
            )
            .await
            .expect("invoke");
        assert!(matches!(result, InvocationResult::Artifact(_)));
    }

    #[tokio::test]
    async fn invoke_testenv_create_merges_spec_and_parses_env() {
        let script = "read -r _line; printf '%s\\n' '{\"id\":1,\"result\":{\"content\":[],\"structured\":{\"files\":{\"fixtures.seed\":\"seed.sql\"}}}}'";
        let resolved = ResolvedTestenvSubEngine {
            command: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            spec: BTreeMap::from([("seed".to_string(), Value::from("demo"))]),
        };
        let invoker = EngineInvoker::new(Arc::new(NullLogger));
        let result = invoker
            .invoke_testenv_create(
                "shell://fixtures",
                &resolved,
                "create",
                serde_json::json!({"stage": "unit", "id": "unit-1", "tmpDir": "/tmp/unit-1"}),
                None,
                &CancellationToken::new(),
            )
            .await
            .expect("invoke");
        let InvocationResult::EnvCreate { files, .. } = result else {
            unreachable!("expected env create")
        };
        assert_eq!(files.get("fixtures.seed"), Some(&"seed.sql".to_string()));
    }

    #[test]
    fn merge_spec_leaves_caller_keys_untouched() {
        let mut arguments = serde_json::json!({"stage": "unit"});
        let spec = BTreeMap::from([("stage".to_string(), Value::from("ignored"))]);
        merge_spec(&mut arguments, &spec);
        assert_eq!(arguments["stage"], "unit");
    }
}

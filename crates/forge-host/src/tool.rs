// crates/forge-host/src/tool.rs
// ============================================================================
// Module: Tool Registration
// Description: The handler trait and registry backing `ToolHost`.
// Purpose: Let worker implementers register `(name, description, handler)`
//          triples without hand-rolling dispatch-by-name match arms.
// Dependencies: async-trait, serde_json
// ============================================================================

//! ## Overview
//! A [`ToolHandler`] receives the raw `arguments` object from a tool-call
//! request and returns either a `structured` payload or free-form text,
//! mirroring the `ToolCallResult` shape `forge_protocol::wire` already
//! defines for the client side of this same envelope.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

/// The payload a handler produces for a single tool call.
#[derive(Debug, Clone)]
pub enum ToolOutcome {
    /// A machine-readable result, serialized into the response's `structured` field.
    Structured(Value),
    /// Free-form text, serialized into the response's `content[0].text` field.
    Text(String),
}

/// A single registered tool: executes a call and returns its outcome.
///
/// ## Invariants
/// - Implementations must not write to stdout; any subprocess they spawn
///   must go through [`crate::protocol_safe_command`] so the real stdout
///   stays reserved for the host's own response line.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Runs the tool against the request's `arguments` object.
    ///
    /// ## Errors
    /// Returns the handler's own failure message; the host wraps it into a
    /// JSON-RPC error object rather than propagating a Rust error type, since
    /// tool handlers are written by independent engine implementers who
    /// should not need to share an error type with the host.
    async fn call(&self, arguments: Value) -> Result<ToolOutcome, String>;
}

/// One entry in a [`ToolRegistry`]: a tool's metadata plus its handler.
pub struct ToolDefinition {
    /// The tool name as it appears in `tools/call` requests.
    pub name: String,
    /// Human-readable description, surfaced by discovery tooling if any.
    pub description: String,
    /// The handler invoked when this tool is called.
    pub handler: Arc<dyn ToolHandler>,
}

/// A name-keyed table of registered tools.
#[derive(Default)]
pub struct ToolRegistry {
    /// Registered tools keyed by name.
    tools: BTreeMap<String, ToolDefinition>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Registers a tool, replacing any prior registration under the same name.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        handler: Arc<dyn ToolHandler>,
    ) {
        let name = name.into();
        self.tools.insert(
            name.clone(),
            ToolDefinition {
                name,
                description: description.into(),
                handler,
            },
        );
    }

    /// Looks up a tool by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name)
    }

    /// Lists registered tool names and descriptions in registration order
    /// (alphabetical, since the registry is name-keyed).
    pub fn list(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tools
            .values()
            .map(|def| (def.name.as_str(), def.description.as_str()))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions")]

    use super::*;

    struct Echo;

    #[async_trait]
    impl ToolHandler for Echo {
        async fn call(&self, arguments: Value) -> Result<ToolOutcome, String> {
            Ok(ToolOutcome::Structured(arguments))
        }
    }

    struct AlwaysFails;

    #[async_trait]
    impl ToolHandler for AlwaysFails {
        async fn call(&self, _arguments: Value) -> Result<ToolOutcome, String> {
            Err("always fails".to_owned())
        }
    }

    #[tokio::test]
    async fn registered_tool_is_found_and_runs() {
        let mut registry = ToolRegistry::new();
        registry.register("echo", "echoes its input", Arc::new(Echo));

        let def = registry.get("echo").expect("registered");
        let outcome = def.handler.call(serde_json::json!({"a": 1})).await.expect("handler ok");
        let ToolOutcome::Structured(value) = outcome else {
            unreachable!("echo handler only ever returns Structured");
        };
        assert_eq!(value, serde_json::json!({"a": 1}));
    }

    #[test]
    fn unregistered_tool_is_absent() {
        let registry = ToolRegistry::new();
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn later_registration_replaces_earlier_one_under_the_same_name() {
        let mut registry = ToolRegistry::new();
        registry.register("echo", "first", Arc::new(Echo));
        registry.register("echo", "second", Arc::new(AlwaysFails));

        let def = registry.get("echo").expect("registered");
        assert_eq!(def.description, "second");
    }

    #[test]
    fn list_reports_every_registered_tool() {
        let mut registry = ToolRegistry::new();
        registry.register("a", "tool a", Arc::new(Echo));
        registry.register("b", "tool b", Arc::new(Echo));

        let names: Vec<&str> = registry.list().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}

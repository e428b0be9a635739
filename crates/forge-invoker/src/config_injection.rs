// crates/forge-invoker/src/config_injection.rs
// ============================================================================
// Module: Config Injection
// Description: Merges a sub-engine's declared configuration into a call's
//              arguments.
// Purpose: Implement §4.4's precedence rule: `command`/`args`/`env`/
//          `envFile`/`workDir` from the sub-engine's declared spec are added
//          to the request's arguments only for keys the orchestrator did not
//          already set; orchestrator-provided keys (`stage`, `name`,
//          `tmpDir`, ...) always win on a collision.
// Dependencies: serde_json, forge-core
// ============================================================================

use forge_core::SubEngineConfigSpec;
use serde_json::Value;

/// Inserts `config`'s declared `command`/`args`/`env`/`envFile`/`workDir`
/// into `arguments` for any key not already present there.
///
/// `arguments` is assumed to be a JSON object; a non-object value is left
/// untouched (the caller always builds `arguments` as an object).
pub fn inject(arguments: &mut Value, config: &SubEngineConfigSpec) {
    let Some(map) = arguments.as_object_mut() else { return };
    if let Some(command) = &config.command {
        map.entry("command").or_insert_with(|| Value::String(command.clone()));
    }
    if let Some(args) = &config.args {
        map.entry("args")
            .or_insert_with(|| Value::Array(args.iter().cloned().map(Value::String).collect()));
    }
    if let Some(env) = &config.env {
        map.entry("env").or_insert_with(|| {
            Value::Object(env.iter().map(|(k, v)| (k.clone(), Value::String(v.clone()))).collect())
        });
    }
    if let Some(env_file) = &config.env_file {
        map.entry("envFile").or_insert_with(|| Value::String(env_file.clone()));
    }
    if let Some(work_dir) = &config.work_dir {
        map.entry("workDir").or_insert_with(|| Value::String(work_dir.clone()));
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions")]

    use std::collections::BTreeMap;

    use super::*;

    fn config() -> SubEngineConfigSpec {
        SubEngineConfigSpec {
            command: Some("docker".to_string()),
            args: Some(vec!["run".to_string()]),
            env: Some(BTreeMap::from([("DEBUG".to_string(), "1".to_string())])),
            env_file: Some(".env".to_string()),
            work_dir: Some("/srv/app".to_string()),
        }
    }

    #[test]
    fn injects_every_field_into_empty_arguments() {
        let mut arguments = serde_json::json!({"name": "app"});
        inject(&mut arguments, &config());
        assert_eq!(arguments["command"], "docker");
        assert_eq!(arguments["args"], serde_json::json!(["run"]));
        assert_eq!(arguments["env"]["DEBUG"], "1");
        assert_eq!(arguments["envFile"], ".env");
        assert_eq!(arguments["workDir"], "/srv/app");
        assert_eq!(arguments["name"], "app");
    }

    #[test]
    fn orchestrator_provided_keys_win_on_collision() {
        let mut arguments = serde_json::json!({"workDir": "/caller/chosen"});
        inject(&mut arguments, &config());
        assert_eq!(arguments["workDir"], "/caller/chosen");
        assert_eq!(arguments["command"], "docker");
    }

    #[test]
    fn unset_spec_fields_are_not_injected() {
        let mut arguments = serde_json::json!({});
        inject(&mut arguments, &SubEngineConfigSpec::default());
        assert_eq!(arguments, serde_json::json!({}));
    }
}

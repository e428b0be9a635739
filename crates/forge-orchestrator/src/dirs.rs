// crates/forge-orchestrator/src/dirs.rs
// ============================================================================
// Module: Engine Directories
// Description: The `tmpDir`/`buildDir`/`rootDir` triple every tool call
//              carries (§4.5, §4.6).
// Purpose: Share one argument-seeding helper between the Builder and
//          Test-Runner orchestrators instead of each hand-building the same
//          three JSON keys.
// Dependencies: serde_json
// ============================================================================

use std::time::Duration;

use forge_core::SubEngineConfigSpec;
use forge_protocol::TOOL_TIMEOUT_ENV;
use serde_json::Value;

/// The directory triple passed to every builder and test-runner call.
#[derive(Debug, Clone)]
pub struct EngineDirs {
    /// Scratch space private to one pipeline run.
    pub tmp_dir: String,
    /// Directory builders write their outputs under.
    pub build_dir: String,
    /// The project's root directory.
    pub root_dir: String,
}

impl EngineDirs {
    /// Builds the base `tmpDir`/`buildDir`/`rootDir` arguments object every
    /// call seeds before adding tool-specific fields.
    #[must_use]
    pub fn as_arguments(&self) -> Value {
        serde_json::json!({
            "tmpDir": self.tmp_dir,
            "buildDir": self.build_dir,
            "rootDir": self.root_dir,
        })
    }
}

/// Reads a sub-engine's declared `FORGE_TOOL_TIMEOUT` (seconds) from its
/// config, if set, per §4.6's "Timeouts are per-call and configurable via
/// SubEngineSpec" rule.
#[must_use]
pub fn sub_engine_timeout(config: &SubEngineConfigSpec) -> Option<Duration> {
    let raw = config.env.as_ref()?.get(TOOL_TIMEOUT_ENV)?;
    let seconds: u64 = raw.parse().ok()?;
    Some(Duration::from_secs(seconds))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions")]

    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn arguments_carry_all_three_dirs() {
        let dirs = EngineDirs {
            tmp_dir: "/tmp/run-1".to_string(),
            build_dir: "/tmp/run-1/build".to_string(),
            root_dir: "/repo".to_string(),
        };
        let arguments = dirs.as_arguments();
        assert_eq!(arguments["tmpDir"], "/tmp/run-1");
        assert_eq!(arguments["buildDir"], "/tmp/run-1/build");
        assert_eq!(arguments["rootDir"], "/repo");
    }

    #[test]
    fn timeout_parses_seconds_from_env() {
        let config = SubEngineConfigSpec {
            env: Some(BTreeMap::from([(TOOL_TIMEOUT_ENV.to_string(), "30".to_string())])),
            ..SubEngineConfigSpec::default()
        };
        assert_eq!(sub_engine_timeout(&config), Some(Duration::from_secs(30)));
    }

    #[test]
    fn timeout_is_none_when_unset_or_unparseable() {
        assert_eq!(sub_engine_timeout(&SubEngineConfigSpec::default()), None);
        let config = SubEngineConfigSpec {
            env: Some(BTreeMap::from([(TOOL_TIMEOUT_ENV.to_string(), "soon".to_string())])),
            ..SubEngineConfigSpec::default()
        };
        assert_eq!(sub_engine_timeout(&config), None);
    }
}

// crates/forge-config/src/validate.rs
// ============================================================================
// Module: Manifest Structural Validation
// Description: Fail-closed checks run once at manifest load time.
// Purpose: Catch the structural errors §9 says belong at load time rather
//          than at resolve time: empty sub-engine lists, alias cycles
//          (a sub-engine referencing another alias), and duplicate alias
//          names, mirroring the teacher's `DecisionGateConfig::validate`
//          dispatching to one checker per concern.
// Dependencies: forge-core, crate::error
// ============================================================================

use std::collections::BTreeSet;

use forge_core::EngineUri;
use forge_core::ForgeManifest;

use crate::error::ManifestError;

/// Runs every structural-validity check against an already-parsed manifest.
///
/// # Errors
///
/// Returns [`ManifestError::Invalid`] on the first rule violation found;
/// checks run in a fixed order (duplicates, then per-alias rules) so
/// failures are deterministic across runs of the same manifest.
pub fn validate(manifest: &ForgeManifest) -> Result<(), ManifestError> {
    check_duplicate_aliases(manifest)?;
    for config in &manifest.engines {
        if !config.has_subengines() {
            return Err(ManifestError::Invalid(format!(
                "alias {} has no sub-engines configured for its role",
                config.alias
            )));
        }
        for uri in config.subengine_uris() {
            if let EngineUri::Alias(nested) = uri {
                return Err(ManifestError::Invalid(format!(
                    "alias cycle: {} references another alias ({nested})",
                    config.alias
                )));
            }
        }
    }
    Ok(())
}

/// Rejects a manifest declaring two `engines` entries under the same alias.
fn check_duplicate_aliases(manifest: &ForgeManifest) -> Result<(), ManifestError> {
    let mut seen = BTreeSet::new();
    for config in &manifest.engines {
        if !seen.insert(config.alias.as_str()) {
            return Err(ManifestError::Invalid(format!("duplicate alias: {}", config.alias)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions")]

    use forge_core::EngineConfig;
    use forge_core::EngineRole;
    use forge_core::SubEngineConfigSpec;
    use forge_core::SubEngineSpec;

    use super::*;

    fn manifest_with(engines: Vec<EngineConfig>) -> ForgeManifest {
        ForgeManifest {
            name: "demo".to_string(),
            artifact_store_path: None,
            build: Vec::new(),
            test: Vec::new(),
            engines,
        }
    }

    fn builder(alias: &str, subengines: Vec<SubEngineSpec>) -> EngineConfig {
        EngineConfig {
            alias: alias.to_string(),
            role: EngineRole::Builder,
            builder: subengines,
            test_runner: Vec::new(),
            testenv: Vec::new(),
        }
    }

    fn subengine(uri: EngineUri) -> SubEngineSpec {
        SubEngineSpec { engine: uri, spec: SubEngineConfigSpec::default() }
    }

    #[test]
    fn accepts_a_well_formed_manifest() {
        let manifest = manifest_with(vec![builder(
            "fmt",
            vec![subengine(EngineUri::Go("gofmt".to_string()))],
        )]);
        validate(&manifest).expect("valid");
    }

    #[test]
    fn rejects_empty_subengine_list() {
        let manifest = manifest_with(vec![builder("fmt", Vec::new())]);
        let error = validate(&manifest).expect_err("invalid");
        assert!(error.to_string().contains("no sub-engines"));
    }

    #[test]
    fn rejects_nested_alias_reference() {
        let manifest =
            manifest_with(vec![builder("fmt", vec![subengine(EngineUri::Alias("other".to_string()))])]);
        let error = validate(&manifest).expect_err("invalid");
        assert!(error.to_string().contains("alias cycle"));
    }

    #[test]
    fn rejects_self_referencing_alias() {
        let manifest =
            manifest_with(vec![builder("fmt", vec![subengine(EngineUri::Alias("fmt".to_string()))])]);
        let error = validate(&manifest).expect_err("invalid");
        assert!(error.to_string().contains("alias cycle"));
    }

    #[test]
    fn rejects_duplicate_alias_names() {
        let subengines = vec![subengine(EngineUri::Go("gofmt".to_string()))];
        let manifest = manifest_with(vec![builder("fmt", subengines.clone()), builder("fmt", subengines)]);
        let error = validate(&manifest).expect_err("invalid");
        assert!(error.to_string().contains("duplicate alias"));
    }
}

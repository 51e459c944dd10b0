use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use jsonschema::JSONSchema;
use log::{info, warn};
use serde_json::Value;

use crate::config::settings::Settings;

/// included configuration schema
static SCHEMA: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/schema/config.json"));

impl Settings {
    /// Read a configuration file, validate it, and deserialise it
    pub fn load(path: &Path) -> Result<Settings> {
        info!("Reading configuration at {}", path.display());
        let text = fs::read_to_string(path)
            .with_context(|| format!("Can't read configuration at {}", path.display()))?;
        Settings::from_json_str(&text)
            .with_context(|| format!("Invalid configuration {}", path.display()))
    }

    pub fn from_json_str(text: &str) -> Result<Settings> {
        info!("Parsing JSON into untyped structure");
        let json: Value = serde_json::from_str(text).context("Configuration is not valid JSON")?;
        validate(&json)?;
        info!("Deserialising valid JSON into settings");
        serde_json::from_value::<Settings>(json).context("Can't deserialise configuration")
    }

    /// Write the configuration as pretty printed JSON, e.g. to make a template to edit
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json + "\n")
            .with_context(|| format!("Can't write configuration to {}", path.display()))
    }
}

fn compile_schema() -> Result<JSONSchema> {
    let schema: Value = serde_json::from_str(SCHEMA).context("Bundled schema is not valid JSON")?;
    JSONSchema::compile(&schema).map_err(|err| anyhow!("Bundled schema doesn't compile: {err}"))
}

fn validate(json: &Value) -> Result<()> {
    info!("Validating configuration against JSON schema");
    let schema = compile_schema()?;
    let problems: Vec<String> = match schema.validate(json) {
        Ok(()) => Vec::new(),
        Err(errors) => errors
            .map(|err| format!("{}: {}", err.instance_path, err))
            .collect(),
    };

    if problems.is_empty() {
        return Ok(());
    }
    for problem in &problems {
        warn!("Configuration fails validation at {problem}");
    }
    Err(anyhow!("configuration fails validation ({} problems)", problems.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::{CompactMode, EventCount, RunSource};
    use tempfile::tempdir;

    #[test]
    fn test_minimal_config_uses_defaults() -> Result<()> {
        let settings = Settings::from_json_str(r#"{"remote_dir": "/alice/cern.ch/user/x/sim"}"#)?;
        assert_eq!(settings.remote_dir, "/alice/cern.ch/user/x/sim");
        assert_eq!(settings.max_events_per_chunk, 5000);
        assert_eq!(settings.compact_mode, CompactMode::MuonAods);
        assert!(settings.use_ocdb_snapshots);
        Ok(())
    }

    #[test]
    fn test_full_config() -> Result<()> {
        let text = r#"{
            "remote_dir": "/alice/sim",
            "overwrite_files": true,
            "events": {"prop_to_trigger": {"trigger": "CMUL7-B-NOPF-MUON", "ratio": 2.0}},
            "vars": {"VAR_GENPARAM_GENLIB_PARNAME": "\"pp 5.03\""},
            "runs": 195682,
            "compact_mode": 0
        }"#;
        let settings = Settings::from_json_str(text)?;
        assert!(settings.overwrite_files);
        assert_eq!(settings.runs, Some(RunSource::Single(195682)));
        assert_eq!(settings.compact_mode, CompactMode::Full);
        assert!(matches!(settings.events, EventCount::PropToTrigger { ratio, .. } if ratio == 2.0));
        Ok(())
    }

    #[test]
    fn test_schema_rejects_bad_values() {
        assert!(Settings::from_json_str(r#"{"compact_mode": 3}"#).is_err());
        assert!(Settings::from_json_str(r#"{"max_events_per_chunk": 0}"#).is_err());
        assert!(Settings::from_json_str(r#"{"vars": {"GENLIB": "x"}}"#).is_err());
        assert!(Settings::from_json_str(r#"{"unknown_key": true}"#).is_err());
    }

    #[test]
    fn test_saved_default_config_loads() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("acceff.json");
        Settings::default().save(&path)?;
        assert_eq!(Settings::load(&path)?, Settings::default());
        Ok(())
    }
}

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::runs::RunNumber;

/// Everything a submitter needs to know before touching the grid
///
/// Deserialised from a JSON configuration file. Missing keys fall back to the values of
/// [`Settings::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Name of the generator macro (without `.C`) in the template directory
    pub generator: String,
    /// Grid directory receiving the local files, and where jobs write their output
    pub remote_dir: String,
    /// Create `remote_dir` (and `merged_dir`) when missing instead of failing
    pub create_remote_dir: bool,
    /// Grid directory receiving merged AODs, `<remote_dir>/AODs` when unset
    pub merged_dir: Option<String>,
    pub local_dir: PathBuf,
    /// Top directory of the OCDB snapshots (must contain an `OCDB` subdirectory), `local_dir` when unset
    pub snapshot_dir: Option<PathBuf>,
    pub template_dir: PathBuf,
    pub ocdb_path: String,
    pub packages: Packages,
    pub events: EventCount,
    pub max_events_per_chunk: u64,
    pub split_max_input_file_number: u32,
    pub compact_mode: CompactMode,
    pub overwrite_files: bool,
    pub use_ocdb_snapshots: bool,
    pub use_aod_merging: bool,
    /// Replaces `Config.C` in the template file list
    pub external_config: Option<String>,
    /// Template variables, applied on top of the defaults
    pub vars: BTreeMap<String, String>,
    pub runs: Option<RunSource>,
    /// JSON file with the trigger scalers of the runs
    pub scalers: Option<PathBuf>,
    pub grid: GridSettings,
    pub toolchain: ToolchainSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            generator: "GenParamCustom".to_string(),
            remote_dir: String::new(),
            create_remote_dir: false,
            merged_dir: None,
            local_dir: PathBuf::from("."),
            snapshot_dir: None,
            template_dir: default_template_dir(),
            ocdb_path: "raw://".to_string(),
            packages: Packages::default(),
            events: EventCount::default(),
            max_events_per_chunk: 5000,
            split_max_input_file_number: 20,
            compact_mode: CompactMode::default(),
            overwrite_files: false,
            use_ocdb_snapshots: true,
            use_aod_merging: false,
            external_config: None,
            vars: BTreeMap::new(),
            runs: None,
            scalers: None,
            grid: GridSettings::default(),
            toolchain: ToolchainSettings::default(),
        }
    }
}

impl Settings {
    pub fn merged_dir(&self) -> String {
        match &self.merged_dir {
            Some(dir) => dir.clone(),
            None => format!("{}/AODs", self.remote_dir),
        }
    }
}

/// `$ALICE_ROOT/PWG/muondep/AccEffTemplates`, or a relative `AccEffTemplates` without ALICE_ROOT
fn default_template_dir() -> PathBuf {
    match std::env::var("ALICE_ROOT") {
        Ok(root) => PathBuf::from(root).join("PWG/muondep/AccEffTemplates"),
        Err(_) => PathBuf::from("AccEffTemplates"),
    }
}

/// Software packages the jobs run with. Must be a valid combination on the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Packages {
    pub aliroot: String,
    pub geant3: String,
    pub root: String,
    pub api: String,
}

impl Default for Packages {
    fn default() -> Self {
        Packages {
            aliroot: "VO_ALICE@AliRoot::v5-03-Rev-18".to_string(),
            geant3: "VO_ALICE@GEANT3::v1-14-8".to_string(),
            root: "VO_ALICE@ROOT::v5-34-05-1".to_string(),
            api: String::new(),
        }
    }
}

impl Packages {
    pub fn as_list(&self) -> [&str; 4] {
        [&self.aliroot, &self.geant3, &self.root, &self.api]
    }
}

/// How many events to generate per run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCount {
    /// `ratio` times the number of `trigger` counts (L2A) of the run
    PropToTrigger { trigger: String, ratio: f64 },
    /// The same number of events for every run
    Fixed(u64),
}

impl Default for EventCount {
    fn default() -> Self {
        EventCount::Fixed(10000)
    }
}

impl fmt::Display for EventCount {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EventCount::PropToTrigger { trigger, ratio } => write!(
                f,
                "For each run, will generate {ratio:5.2} times the number of real events for trigger {trigger}"
            ),
            EventCount::Fixed(n) => write!(f, "For each run, will generate {n:10} events"),
        }
    }
}

/// Which files the run jobs keep in their output archive
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum CompactMode {
    /// Store everything
    Full,
    /// Keep only the muon AODs
    #[default]
    MuonAods,
}

impl TryFrom<u8> for CompactMode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CompactMode::Full),
            1 => Ok(CompactMode::MuonAods),
            other => Err(format!("unknown compact mode {other}")),
        }
    }
}

impl From<CompactMode> for u8 {
    fn from(mode: CompactMode) -> u8 {
        match mode {
            CompactMode::Full => 0,
            CompactMode::MuonAods => 1,
        }
    }
}

/// Where the run list comes from: a single run number or a text file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RunSource {
    Single(RunNumber),
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridSettings {
    /// The alien command line client
    pub program: String,
}

impl Default for GridSettings {
    fn default() -> Self {
        GridSettings { program: "alien.py".to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolchainSettings {
    pub root: String,
    pub aliroot: String,
    /// Include paths for compiling the generator macro, expanded by ROOT
    pub include_dirs: Vec<String>,
}

impl Default for ToolchainSettings {
    fn default() -> Self {
        ToolchainSettings {
            root: "root".to_string(),
            aliroot: "aliroot".to_string(),
            include_dirs: vec!["$ALICE_ROOT/include".to_string(), "$ALICE_ROOT/EVGEN".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_mode_from_integer() {
        let mode: CompactMode = serde_json::from_str("0").unwrap();
        assert_eq!(mode, CompactMode::Full);
        assert!(serde_json::from_str::<CompactMode>("2").is_err());
        assert_eq!(serde_json::to_string(&CompactMode::MuonAods).unwrap(), "1");
    }

    #[test]
    fn test_event_count_variants() {
        let ratio: EventCount =
            serde_json::from_str(r#"{"prop_to_trigger": {"trigger": "CMUL7-B-NOPF-MUON", "ratio": 2.0}}"#)
                .unwrap();
        assert_eq!(
            ratio,
            EventCount::PropToTrigger { trigger: "CMUL7-B-NOPF-MUON".to_string(), ratio: 2.0 }
        );
        let fixed: EventCount = serde_json::from_str(r#"{"fixed": 500}"#).unwrap();
        assert_eq!(fixed, EventCount::Fixed(500));
    }

    #[test]
    fn test_run_source_untagged() {
        let single: RunSource = serde_json::from_str("195682").unwrap();
        assert_eq!(single, RunSource::Single(195682));
        let file: RunSource = serde_json::from_str("\"runs.txt\"").unwrap();
        assert_eq!(file, RunSource::File(PathBuf::from("runs.txt")));
    }

    #[test]
    fn test_merged_dir_defaults_to_remote_aods() {
        let settings = Settings { remote_dir: "/alice/sim".to_string(), ..Settings::default() };
        assert_eq!(settings.merged_dir(), "/alice/sim/AODs");
    }
}

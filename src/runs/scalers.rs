use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

use crate::runs::RunNumber;

/// Trigger level used to count reference triggers
pub const REFERENCE_LEVEL: &str = "L2A";

/// Source of per run trigger counts
pub trait TriggerScalers {
    /// Number of `trigger` counts at `level` during `run`, if known
    fn trigger_count(&self, run: RunNumber, level: &str, trigger: &str) -> Option<u64>;
}

/// One trigger counter of one run
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ScalerRecord {
    pub run: RunNumber,
    pub level: String,
    pub trigger: String,
    pub value: u64,
}

/// Trigger scalers read from a JSON file (a list of [`ScalerRecord`])
#[derive(Debug, Default)]
pub struct ScalerTable {
    values: HashMap<(RunNumber, String, String), u64>,
}

impl ScalerTable {
    pub fn from_records(records: impl IntoIterator<Item = ScalerRecord>) -> Self {
        let values = records
            .into_iter()
            .map(|r| ((r.run, r.level, r.trigger), r.value))
            .collect();
        ScalerTable { values }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        info!("Reading trigger scalers from {}", path.display());
        let text = fs::read_to_string(path)
            .with_context(|| format!("Can't read scalers {}", path.display()))?;
        let records: Vec<ScalerRecord> = serde_json::from_str(&text)
            .with_context(|| format!("Invalid scalers file {}", path.display()))?;
        Ok(ScalerTable::from_records(records))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl TriggerScalers for ScalerTable {
    fn trigger_count(&self, run: RunNumber, level: &str, trigger: &str) -> Option<u64> {
        self.values
            .get(&(run, level.to_string(), trigger.to_string()))
            .copied()
    }
}

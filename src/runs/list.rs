use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use crate::config::settings::RunSource;
use crate::runs::RunNumber;

/// The runs to simulate, in the order they were given. Duplicates are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunList {
    runs: Vec<RunNumber>,
}

impl RunList {
    pub fn single(run: RunNumber) -> Self {
        RunList { runs: vec![run] }
    }

    pub fn from_runs(runs: impl IntoIterator<Item = RunNumber>) -> Self {
        let mut list = RunList::default();
        for run in runs {
            if !list.runs.contains(&run) {
                list.runs.push(run);
            }
        }
        list
    }

    /// Parse run numbers separated by whitespace or commas. `#` starts a comment.
    pub fn parse(text: &str) -> Result<Self> {
        let mut runs = Vec::new();
        for (n, line) in text.lines().enumerate() {
            let line = line.split('#').next().unwrap_or_default();
            for field in line.split(|c: char| c == ',' || c.is_whitespace()) {
                if field.is_empty() {
                    continue;
                }
                let run: RunNumber = field
                    .parse()
                    .with_context(|| format!("Invalid run number {field:?} on line {}", n + 1))?;
                runs.push(run);
            }
        }
        Ok(RunList::from_runs(runs))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        info!("Reading run list from {}", path.display());
        let text = fs::read_to_string(path)
            .with_context(|| format!("Can't read run list {}", path.display()))?;
        RunList::parse(&text)
    }

    pub fn from_source(source: &RunSource) -> Result<Self> {
        match source {
            RunSource::Single(run) => Ok(RunList::single(*run)),
            RunSource::File(path) => RunList::from_file(path),
        }
    }

    pub fn runs(&self) -> &[RunNumber] {
        &self.runs
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_separators() -> Result<()> {
        let list = RunList::parse("# LHC13d\n195682, 195681\n195677 195682\n\n")?;
        assert_eq!(list.runs(), &[195682, 195681, 195677]);
        Ok(())
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = RunList::parse("195682\nabc\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::GridError;

/// One record of a grid reply, e.g. one entry of a directory listing
pub type GridRecord = BTreeMap<String, String>;

/// Structured reply of a grid command: an ordered list of key/value records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridResult {
    records: Vec<GridRecord>,
}

impl GridResult {
    pub fn new(records: Vec<GridRecord>) -> Self {
        GridResult { records }
    }

    /// Value of `key` in the record at `index`
    pub fn key(&self, index: usize, key: &str) -> Option<&str> {
        self.records.get(index)?.get(key).map(String::as_str)
    }

    pub fn records(&self) -> &[GridRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<GridRecord> for GridResult {
    fn from_iter<T: IntoIterator<Item = GridRecord>>(iter: T) -> Self {
        GridResult { records: iter.into_iter().collect() }
    }
}

/// Capabilities the submitter needs from the grid
///
/// Queries return `None` when the command gave no result, which is how the grid reports both
/// failures and missing paths.
pub trait GridClient {
    /// Check the grid can be reached
    fn connect(&mut self) -> Result<(), GridError>;

    /// List `path`. With `classify`, directory names carry a trailing `/`.
    fn list(&self, path: &str, classify: bool) -> Option<GridResult>;

    /// Create a directory and its missing parents
    fn mkdir(&self, path: &str) -> Result<(), GridError>;

    /// Copy a local file to a grid path
    fn copy(&self, local: &Path, remote: &str) -> Result<(), GridError>;

    fn remove(&self, path: &str) -> Result<(), GridError>;

    /// Collect the files matching `pattern` below `dir` into the XML collection `collection`
    fn find(&self, dir: &str, pattern: &str, collection: &str) -> Option<String>;

    /// Submit the JDL at `jdl` with positional arguments; a successful reply carries `jobId`
    fn submit(&self, jdl: &str, args: &[String]) -> Option<GridResult>;

    /// State of a job; a successful reply carries `status`
    fn query_job(&self, job_id: &str) -> Option<GridResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_lookup() {
        let result: GridResult = vec![GridRecord::from([("jobId".to_string(), "42".to_string())])]
            .into_iter()
            .collect();
        assert_eq!(result.key(0, "jobId"), Some("42"));
        assert_eq!(result.key(0, "status"), None);
        assert_eq!(result.key(1, "jobId"), None);
    }
}

use std::path::PathBuf;

use crate::runs::RunNumber;

/// Failures of the submission workflow.
///
/// Connectivity problems and missing prerequisites abort the current operation. Per-run
/// failures are collected by the submit and merge loops and only surface once the whole run
/// list has been processed.
#[derive(Debug, thiserror::Error)]
pub enum SubmitterError {
    #[error("cannot connect to the grid: {0}")]
    Connectivity(GridError),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("submitter is not valid, check the configuration")]
    Invalid,

    #[error("you must provide the grid location where to copy the files")]
    NoRemoteDir,

    #[error("remote directory {0} does not exist")]
    MissingRemoteDir(String),

    #[error("remote file {file} does not exist in {dir}")]
    MissingRemoteFile { file: String, dir: String },

    #[error("local file {} does not exist", .0.display())]
    MissingLocalFile(PathBuf),

    #[error("local file {} already exists, remove it first if you want to overwrite it", .0.display())]
    LocalFileExists(PathBuf),

    #[error("{0} local files could not be overwritten, cross-check them before uploading")]
    LocalConflicts(usize),

    #[error("variable name {0} should start with VAR_")]
    InvalidVariableName(String),

    #[error("file {} has unresolved variables: {}", .file.display(), .missing.join(", "))]
    UnresolvedVariables { file: PathBuf, missing: Vec<String> },

    #[error("can not work with the generator macro {}", .0.display())]
    MissingGenerator(PathBuf),

    #[error("generator macro {} can not be compiled", .0.display())]
    Compilation(PathBuf),

    #[error("snapshot top directory {} should contain an OCDB subdirectory", .0.display())]
    InvalidSnapshotDir(PathBuf),

    #[error("could not create OCDB snapshots for runs {0:?}")]
    Snapshots(Vec<RunNumber>),

    #[error("no run to work with")]
    NoRuns,

    #[error("latest merging stage of run {run} is {last}, next must be stage {} or the final stage", .last + 1)]
    StageOrder { run: RunNumber, last: u32 },

    #[error("{0} failed for runs {1:?}")]
    FailedRuns(&'static str, Vec<RunNumber>),

    #[error("{0} failed due to {1} errors")]
    Aggregated(&'static str, usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Database(#[from] rusqlite::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failures reported by a remote grid client.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("grid command {0} could not be executed: {1}")]
    Spawn(String, std::io::Error),

    #[error("grid command {0} failed: {1}")]
    Command(String, String),

    #[error("invalid grid path {0}: {1}")]
    Url(String, url::ParseError),

    #[error("not connected to the grid")]
    NotConnected,
}

use std::fmt;

use clap::ValueEnum;

/// What a submitter run does
///
/// Later modes need the files produced by earlier ones: `upload` needs `local`, `submit` needs
/// `upload`. `full` and `test` chain everything, `test` stopping short of the actual submission.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum Mode {
    /// Copy the template files to the local directory
    Local,
    /// Copy the local files to the remote directory
    Upload,
    /// Copy the template files, then make the OCDB snapshots
    Ocdb,
    /// Submit the jobs
    Submit,
    /// Local copy, snapshots, upload and submission
    Full,
    /// As full, but in dry mode: jobs are not submitted
    Test,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Mode::Local => write!(f, "local"),
            Mode::Upload => write!(f, "upload"),
            Mode::Ocdb => write!(f, "ocdb"),
            Mode::Submit => write!(f, "submit"),
            Mode::Full => write!(f, "full"),
            Mode::Test => write!(f, "test"),
        }
    }
}

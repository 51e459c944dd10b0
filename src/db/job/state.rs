use std::fmt;

/// State of a submitted grid job as far as the database knows
///
/// `Submitted` is stored when the queue accepts the JDL, `Failed` when it doesn't. The other
/// states are read back from the grid by a status refresh.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum JobState {
    Submitted,
    Failed,
    Waiting,
    Running,
    Done,
    Error,
}

impl JobState {
    /// db column values are all lower case
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Submitted => "submitted",
            JobState::Failed => "failed",
            JobState::Waiting => "waiting",
            JobState::Running => "running",
            JobState::Done => "done",
            JobState::Error => "error",
        }
    }

    pub fn from_db(value: &str) -> Option<JobState> {
        match value {
            "submitted" => Some(JobState::Submitted),
            "failed" => Some(JobState::Failed),
            "waiting" => Some(JobState::Waiting),
            "running" => Some(JobState::Running),
            "done" => Some(JobState::Done),
            "error" => Some(JobState::Error),
            _ => None,
        }
    }

    /// Map a grid job status (`DONE`, `RUNNING`, `ERROR_V`, ...) to a state
    pub fn from_grid_status(status: &str) -> JobState {
        let status = status.to_uppercase();
        match status.as_str() {
            "DONE" | "DONE_WARN" => JobState::Done,
            "RUNNING" | "STARTED" | "SAVING" | "SAVED" | "ASSIGNED" => JobState::Running,
            s if s.starts_with("ERROR") || s.starts_with("EXPIRED") || s == "KILLED" => JobState::Error,
            _ => JobState::Waiting,
        }
    }

    /// Jobs still worth asking the grid about
    pub fn is_active(&self) -> bool {
        matches!(self, JobState::Submitted | JobState::Waiting | JobState::Running)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_status() {
        assert_eq!(JobState::from_grid_status("DONE"), JobState::Done);
        assert_eq!(JobState::from_grid_status("running"), JobState::Running);
        assert_eq!(JobState::from_grid_status("ERROR_V"), JobState::Error);
        assert_eq!(JobState::from_grid_status("INSERTING"), JobState::Waiting);
    }

    #[test]
    fn test_db_round_trip_names() {
        for state in [JobState::Submitted, JobState::Failed, JobState::Done] {
            assert_eq!(JobState::from_db(state.as_str()), Some(state));
        }
        assert_eq!(JobState::from_db("staged"), None);
    }
}

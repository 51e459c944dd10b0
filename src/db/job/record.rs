use chrono::Utc;
use log::info;
use rusqlite::Connection;

use crate::db::job::state::JobState;
use crate::runs::RunNumber;

/// One submission of a JDL to the grid queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub id: i64,
    pub run: RunNumber,
    pub jdl: String,
    /// Space separated JDL arguments
    pub arguments: String,
    pub job_id: Option<String>,
    pub state: JobState,
}

/// Store a new submission, returning its row id
pub fn record_submission(
    conn: &Connection,
    run: RunNumber,
    jdl: &str,
    arguments: &[String],
    job_id: Option<&str>,
) -> rusqlite::Result<i64> {
    let state = match job_id {
        Some(_) => JobState::Submitted,
        None => JobState::Failed,
    };
    let now = Utc::now().to_rfc3339();
    info!("Recording {jdl} for run {run} as {state}");
    conn.execute(
        "INSERT INTO submission (run, jdl, arguments, job_id, state, submitted_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        (run, jdl, arguments.join(" "), job_id, state.as_str(), &now),
    )?;
    Ok(conn.last_insert_rowid())
}

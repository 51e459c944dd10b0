use log::{info, warn};
use rusqlite::{Connection, Row};

use crate::db::job::record::Submission;
use crate::db::job::state::JobState;

/// Jobs the grid may still change the state of
pub fn get_active_jobs(conn: &Connection) -> rusqlite::Result<Vec<Submission>> {
    let jobs: Vec<Submission> = get_jobs(conn)?
        .into_iter()
        .filter(|job| job.state.is_active() && job.job_id.is_some())
        .collect();
    info!("Loaded {} active jobs from db", jobs.len());
    Ok(jobs)
}

pub fn get_jobs(conn: &Connection) -> rusqlite::Result<Vec<Submission>> {
    let mut stmt = conn.prepare(
        "SELECT id, run, jdl, arguments, job_id, state FROM submission ORDER BY id",
    )?;
    let rows = stmt.query_map([], read_row)?;

    let mut jobs = Vec::new();
    for row in rows {
        if let Some(job) = row? {
            jobs.push(job);
        }
    }
    Ok(jobs)
}

fn read_row(row: &Row) -> rusqlite::Result<Option<Submission>> {
    let id: i64 = row.get(0)?;
    let state: String = row.get(5)?;
    let Some(state) = JobState::from_db(&state) else {
        warn!("Skipping submission {id} with unknown state {state}");
        return Ok(None);
    };
    Ok(Some(Submission {
        id,
        run: row.get(1)?,
        jdl: row.get(2)?,
        arguments: row.get(3)?,
        job_id: row.get(4)?,
        state,
    }))
}

use log::{info, warn};

use crate::db::job::load::{get_active_jobs, get_jobs};
use crate::db::job::record::Submission;
use crate::db::job::state::JobState;
use crate::db::job::update::update_state;
use crate::error::SubmitterError;
use crate::submitter::Submitter;

impl Submitter {
    /// Ask the grid about every job still in flight and store the states that changed
    ///
    /// Returns the jobs that changed, with their new state. Jobs the grid doesn't know
    /// about are left alone.
    pub fn refresh_job_states(&self) -> Result<Vec<Submission>, SubmitterError> {
        self.require_valid()?;
        let Some(conn) = &self.db else {
            warn!("No submission database, nothing to refresh");
            return Ok(Vec::new());
        };

        let mut changed = Vec::new();
        for mut job in get_active_jobs(conn)? {
            let Some(job_id) = job.job_id.as_deref() else {
                continue;
            };
            let status = self
                .grid
                .query_job(job_id)
                .and_then(|reply| reply.key(0, "status").map(str::to_string));
            let Some(status) = status else {
                warn!("No status for job {job_id} (run {})", job.run);
                continue;
            };

            let state = JobState::from_grid_status(&status);
            if state != job.state {
                info!("Job {job_id} of run {} is now {state}", job.run);
                update_state(conn, job.id, state)?;
                job.state = state;
                changed.push(job);
            }
        }
        Ok(changed)
    }

    /// Every recorded submission, oldest first
    pub fn jobs(&self) -> Result<Vec<Submission>, SubmitterError> {
        match &self.db {
            Some(conn) => Ok(get_jobs(conn)?),
            None => Ok(Vec::new()),
        }
    }
}

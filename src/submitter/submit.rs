use log::{error, info, warn};

use crate::config::settings::EventCount;
use crate::db::job::record::record_submission;
use crate::db::open::{begin, release_or_rollback};
use crate::error::SubmitterError;
use crate::grid::client::GridResult;
use crate::grid::remote::remote_file_exists;
use crate::jdl::RUN_JDL;
use crate::plan::{events_for_run, plan_chunks, ChunkPlan};
use crate::runs::scalers::REFERENCE_LEVEL;
use crate::runs::RunNumber;
use crate::submitter::Submitter;

/// Outcome of a submission loop
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitReport {
    /// Sub jobs (chunks) submitted, or that would have been in a dry run
    pub jobs: u64,
    pub events: u64,
    pub runs: Vec<(RunNumber, ChunkPlan)>,
    pub failed: Vec<RunNumber>,
}

/// One master job handed (or not, in a dry run) to the queue
pub(super) struct Attempt {
    pub run: RunNumber,
    pub jdl: String,
    pub args: Vec<String>,
    pub job_id: Option<String>,
}

/// The job id of a submission reply, if there's a non-empty one
pub(super) fn reply_job_id(reply: Option<GridResult>) -> Option<String> {
    reply?
        .key(0, "jobId")
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

impl Submitter {
    /// Submit one master job per run: `submit run.jdl <run> <chunks> <events per chunk>`
    ///
    /// The run JDL must already be in the remote directory. Runs that can't be planned or
    /// submitted are listed in the report, the other runs are submitted anyway.
    pub fn submit(&self, dry_run: bool) -> Result<SubmitReport, SubmitterError> {
        self.require_valid()?;

        if !remote_file_exists(self.grid.as_ref(), &format!("{}/{RUN_JDL}", self.remote_dir)) {
            error!("File {RUN_JDL} does not exist in {}", self.remote_dir);
            return Err(SubmitterError::MissingRemoteFile {
                file: RUN_JDL.to_string(),
                dir: self.remote_dir.clone(),
            });
        }
        if self.runs.is_empty() {
            error!("No run to work with");
            return Err(SubmitterError::NoRuns);
        }

        let jdl = format!("{}/{RUN_JDL}", self.remote_dir);
        let mut report = SubmitReport::default();
        let mut attempts = Vec::new();

        info!("run\tchunks\tevents");
        for &run in self.runs.runs() {
            let Some(events) = self.run_events(run) else {
                report.failed.push(run);
                continue;
            };
            let plan = plan_chunks(events, self.settings.max_events_per_chunk);
            report.jobs += plan.chunks;
            report.events += plan.total_events();
            report.runs.push((run, plan));
            info!("{run}\t{}\t{}", plan.chunks, plan.events_per_chunk);

            let args = vec![
                run.to_string(),
                plan.chunks.to_string(),
                plan.events_per_chunk.to_string(),
            ];
            info!("submit {jdl} {} ...", args.join(" "));

            let job_id = match dry_run {
                true => {
                    info!("dry run");
                    None
                }
                false => match reply_job_id(self.grid.submit(&jdl, &args)) {
                    Some(id) => {
                        info!("DONE, the job id is {id}");
                        Some(id)
                    }
                    None => {
                        error!("FAILED submitting run {run}");
                        report.failed.push(run);
                        None
                    }
                },
            };
            attempts.push(Attempt { run, jdl: jdl.clone(), args, job_id });
        }

        info!("total number of jobs = {}", report.jobs);
        info!("total number of generated events = {}", report.events);
        if !report.failed.is_empty() {
            warn!("Failed runs: {:?}", report.failed);
        }

        self.record_attempts(&attempts, dry_run)?;
        Ok(report)
    }

    fn run_events(&self, run: RunNumber) -> Option<u64> {
        let count = match &self.settings.events {
            EventCount::Fixed(_) => None,
            EventCount::PropToTrigger { trigger, .. } => {
                let count = self.scalers.trigger_count(run, REFERENCE_LEVEL, trigger);
                if count.is_none() {
                    error!("Could not get trigger {trigger} for run {run:09}");
                }
                count
            }
        };
        events_for_run(&self.settings.events, count)
    }

    /// Store the attempts in the submission database, if there's one. Dry runs are rolled back.
    pub(super) fn record_attempts(
        &self,
        attempts: &[Attempt],
        dry_run: bool,
    ) -> Result<(), SubmitterError> {
        let Some(conn) = &self.db else {
            return Ok(());
        };
        begin(conn)?;
        for attempt in attempts {
            let job_id = attempt.job_id.as_deref();
            record_submission(conn, attempt.run, &attempt.jdl, &attempt.args, job_id)?;
        }
        release_or_rollback(conn, dry_run)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::client::GridRecord;

    #[test]
    fn test_job_id_needs_a_value() {
        let reply = |id: &str| Some(GridResult::new(vec![GridRecord::from([("jobId".to_string(), id.to_string())])]));
        assert_eq!(reply_job_id(reply("12345")), Some("12345".to_string()));
        assert_eq!(reply_job_id(reply("")), None);
        assert_eq!(reply_job_id(Some(GridResult::default())), None);
        assert_eq!(reply_job_id(None), None);
    }
}

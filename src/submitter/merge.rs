use std::fs;

use log::{error, info, warn};

use crate::error::SubmitterError;
use crate::grid::remote::{last_stage, remote_directory_exists, remote_file_exists};
use crate::jdl::merge_jdl_name;
use crate::runs::RunNumber;
use crate::submitter::submit::{reply_job_id, Attempt};
use crate::submitter::Submitter;

/// Intermediate stages with at most this many files to merge ask for confirmation
pub const SPLIT_LEVEL: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Runs with a merging job, and its id (none in a dry run)
    pub submitted: Vec<(RunNumber, Option<String>)>,
    /// Runs already merged, with nothing to merge, or declined
    pub skipped: Vec<RunNumber>,
    pub failed: Vec<RunNumber>,
}

/// Decision for one run
enum Step {
    Submit(Vec<String>),
    Skip,
}

impl Submitter {
    /// Submit AOD merging jobs: `submit AOD_merge.jdl <run> <stage>`, or with stage 0 the final
    /// merging `submit AOD_merge_final.jdl <run>`
    ///
    /// AODs are read from `<remote_dir>/<run>` (or its last `Stage_<n>`), merged ones land in
    /// `<merged_dir>/<run>`. Stages must be done in order. `confirm` is asked, once for the
    /// whole batch, whether to go on with a stage that has few files to merge.
    pub fn merge(
        &self,
        stage: u32,
        dry_run: bool,
        confirm: &mut dyn FnMut(usize) -> bool,
    ) -> Result<MergeReport, SubmitterError> {
        self.require_valid()?;
        let grid = self.grid.as_ref();

        if !remote_directory_exists(grid, &self.merged_dir) {
            error!("Directory {} does not exist", self.merged_dir);
            return Err(SubmitterError::MissingRemoteDir(self.merged_dir.clone()));
        }

        let name = merge_jdl_name(stage == 0);
        let jdl = format!("{}/{name}", self.remote_dir);
        if !remote_file_exists(grid, &jdl) {
            error!("File {name} does not exist in {}", self.remote_dir);
            return Err(SubmitterError::MissingRemoteFile {
                file: name.to_string(),
                dir: self.remote_dir.clone(),
            });
        }
        if self.runs.is_empty() {
            error!("No run to work with");
            return Err(SubmitterError::NoRuns);
        }

        let mut report = MergeReport::default();
        let mut attempts = Vec::new();
        let mut answer: Option<bool> = None;

        for &run in self.runs.runs() {
            info!("--- processing run {run} ---");
            let args = match self.prepare_merge(run, stage, dry_run, &mut answer, confirm) {
                Ok(Step::Submit(args)) => args,
                Ok(Step::Skip) => {
                    report.skipped.push(run);
                    continue;
                }
                Err(err) => {
                    error!("{err}");
                    report.failed.push(run);
                    continue;
                }
            };

            info!("submit {jdl} {} ...", args.join(" "));
            if dry_run {
                info!("dry run");
                report.submitted.push((run, None));
                attempts.push(Attempt { run, jdl: jdl.clone(), args, job_id: None });
                continue;
            }

            // merging job ids are plain numbers
            let job_id = reply_job_id(grid.submit(&jdl, &args))
                .filter(|id| id.bytes().all(|b| b.is_ascii_digit()));
            match &job_id {
                Some(id) => {
                    info!("DONE, the job id is {id}");
                    report.submitted.push((run, Some(id.clone())));
                }
                None => {
                    error!("FAILED submitting merging of run {run}");
                    report.failed.push(run);
                }
            }
            attempts.push(Attempt { run, jdl: jdl.clone(), args, job_id });
        }

        if !report.failed.is_empty() {
            warn!("List of failed runs: {:?}", report.failed);
        }
        self.record_attempts(&attempts, dry_run)?;
        Ok(report)
    }

    /// Check one run can be merged at `stage` and upload its collection of files to merge
    fn prepare_merge(
        &self,
        run: RunNumber,
        stage: u32,
        dry_run: bool,
        answer: &mut Option<bool>,
        confirm: &mut dyn FnMut(usize) -> bool,
    ) -> Result<Step, SubmitterError> {
        let grid = self.grid.as_ref();
        let run_dir = format!("{}/{run}", self.merged_dir);

        if !remote_directory_exists(grid, &run_dir) {
            info!("Creating output directory {run_dir}");
            grid.mkdir(&run_dir)?;
        }

        if remote_file_exists(grid, &format!("{run_dir}/root_archive.zip")) {
            warn!("Final merging already done for run {run}");
            return Ok(Step::Skip);
        }

        let last = last_stage(grid, &run_dir);
        if stage > 0 && stage != last + 1 {
            return Err(SubmitterError::StageOrder { run, last });
        }

        let collection = match stage {
            0 => "wn.xml".to_string(),
            n => format!("Stage_{n}.xml"),
        };
        let source = match last {
            0 => format!("{}/{run}", self.remote_dir),
            n => format!("{}/{run}/Stage_{n}", self.remote_dir),
        };
        let xml = grid.find(&source, "*root_archive.zip", &collection).unwrap_or_default();
        let files = xml.lines().filter(|line| line.contains("/event")).count();
        info!("Number of files to merge = {files}");

        if files == 0 {
            warn!("Collection of files to merge is empty for run {run}");
            return Ok(Step::Skip);
        }
        if stage > 0 && files <= SPLIT_LEVEL {
            let go_on = *answer.get_or_insert_with(|| confirm(files));
            if !go_on {
                return Ok(Step::Skip);
            }
        }

        if !dry_run {
            let remote = format!("{run_dir}/{collection}");
            if remote_file_exists(grid, &remote) {
                grid.remove(&remote)?;
            }
            let local = self.settings.local_dir.join(&collection);
            fs::write(&local, &xml)?;
            let copied = grid.copy(&local, &remote);
            fs::remove_file(&local)?;
            copied?;
        }

        let mut args = vec![run.to_string()];
        if stage > 0 {
            args.push(stage.to_string());
        }
        Ok(Step::Submit(args))
    }
}

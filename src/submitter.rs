//! Acceptance x efficiency simulation submitter
//!
//! A submitter deals with three directories:
//!
//! - the template directory, holding the simulation macros. Templates can contain variables
//!   that are replaced while copying them to the local directory
//! - the local directory, receiving the instantiated templates and the generated JDL files.
//!   These are the files uploaded for the production and can be checked before uploading
//! - the remote directory on the grid, where the local files are copied before submission
//!
//! A submitter is only valid once the grid is reachable, the remote directory exists and the
//! generator macro has been validated. Nothing touching files or the grid runs otherwise.

/// Template and local file lists, local copy and cleanup
pub mod files;

/// OCDB snapshot production
pub mod snapshots;

/// Copy of the local files to the grid
pub mod upload;

/// Simulation job submission
pub mod submit;

/// AOD merging job submission
pub mod merge;

/// Refresh the state of recorded jobs
pub mod status;

/// Human readable configuration summary
pub mod summary;

use std::fs;
use std::path::{Path, PathBuf};

use log::{error, info, warn};
use rusqlite::Connection;

use crate::config::settings::Settings;
use crate::error::SubmitterError;
use crate::grid::client::GridClient;
use crate::grid::remote::get_remote_dir;
use crate::mode::Mode;
use crate::runs::list::RunList;
use crate::runs::scalers::TriggerScalers;
use crate::template::replace::{get_variables, has_vars, replace_vars};
use crate::template::vars::VariableStore;
use crate::tools::Toolchain;

use files::{template_file_list, LocalFile};

pub struct Submitter {
    settings: Settings,
    vars: VariableStore,
    template_files: Vec<String>,
    local_files: Vec<LocalFile>,
    remote_dir: String,
    merged_dir: String,
    snapshot_dir: PathBuf,
    runs: RunList,
    grid: Box<dyn GridClient>,
    tools: Box<dyn Toolchain>,
    scalers: Box<dyn TriggerScalers>,
    db: Option<Connection>,
    valid: bool,
}

impl Submitter {
    /// Build a submitter from its settings and collaborators, then validate it
    ///
    /// Configuration mistakes (bad variable names, unreadable run list) are errors. Failing to
    /// reach the grid or to validate the generator only leaves the submitter invalid, so its
    /// configuration can still be printed.
    pub fn new(
        settings: Settings,
        grid: Box<dyn GridClient>,
        tools: Box<dyn Toolchain>,
        scalers: Box<dyn TriggerScalers>,
    ) -> Result<Submitter, SubmitterError> {
        let mut vars = VariableStore::with_defaults();
        vars.set("VAR_OCDB_PATH", &format!("\"{}\"", settings.ocdb_path))?;
        for (name, value) in &settings.vars {
            vars.set(name, value)?;
        }

        let runs = match &settings.runs {
            Some(source) => RunList::from_source(source)?,
            None => RunList::default(),
        };
        let template_files = template_file_list(&settings);
        let local_files = template_files.iter().cloned().map(LocalFile::Template).collect();

        let mut submitter = Submitter {
            remote_dir: settings.remote_dir.trim_end_matches('/').to_string(),
            merged_dir: settings.merged_dir().trim_end_matches('/').to_string(),
            snapshot_dir: settings.local_dir.clone(),
            settings,
            vars,
            template_files,
            local_files,
            runs,
            grid,
            tools,
            scalers,
            db: None,
            valid: false,
        };

        submitter.use_ocdb_snapshots(submitter.settings.use_ocdb_snapshots);
        if let Some(dir) = submitter.settings.snapshot_dir.clone() {
            if let Err(err) = submitter.set_ocdb_snapshot_dir(&dir) {
                error!("{err}");
            }
        }

        match submitter.validate() {
            Ok(()) => submitter.valid = true,
            Err(err) => error!("Invalid submitter: {err}"),
        }
        submitter.update_local_file_list(true);
        Ok(submitter)
    }

    /// Record submissions in this database
    pub fn with_db(mut self, conn: Connection) -> Self {
        self.db = Some(conn);
        self
    }

    fn validate(&mut self) -> Result<(), SubmitterError> {
        self.grid.connect().map_err(SubmitterError::Connectivity)?;

        if self.remote_dir.is_empty() {
            return Err(SubmitterError::NoRemoteDir);
        }
        let create = self.settings.create_remote_dir;
        self.remote_dir = get_remote_dir(self.grid.as_ref(), &self.remote_dir, create)?;

        if self.settings.use_aod_merging {
            if let Err(err) = get_remote_dir(self.grid.as_ref(), &self.merged_dir, create) {
                warn!("Merged directory not usable, merging won't work: {err}");
            }
        }

        let generator = self.settings.generator.clone();
        self.set_generator(&generator)
    }

    /// Select the generator macro, after checking all its variables are defined and it compiles
    fn set_generator(&mut self, generator: &str) -> Result<(), SubmitterError> {
        let macro_name = format!("{generator}.C");
        let macro_path = self.settings.template_dir.join(&macro_name);
        if !macro_path.exists() {
            return Err(SubmitterError::MissingGenerator(macro_path));
        }

        let missing: Vec<String> = get_variables(&macro_path)?
            .into_iter()
            .filter(|var| !self.vars.contains(var))
            .collect();
        if !missing.is_empty() {
            for var in &missing {
                error!("{} expects the variable {var} to be defined", macro_path.display());
            }
            return Err(SubmitterError::UnresolvedVariables { file: macro_path, missing });
        }

        self.check_compilation(&macro_path)?;

        self.vars.set_builtin("VAR_GENERATOR", generator);
        if !self.template_files.contains(&macro_name) {
            self.template_files.push(macro_name.clone());
            self.local_files.push(LocalFile::Template(macro_name));
        }
        Ok(())
    }

    /// Compile a copy of the macro with its variables substituted
    fn check_compilation(&self, macro_path: &Path) -> Result<(), SubmitterError> {
        let base = macro_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        fs::create_dir_all(&self.settings.local_dir)?;
        let tmp = self.settings.local_dir.join(format!("tmpfile_{base}"));
        fs::copy(macro_path, &tmp)?;

        let compiled = has_vars(&tmp)
            .and_then(|found| match found {
                true => replace_vars(&tmp, &self.vars).map(|_| ()),
                false => Ok(()),
            })
            .and_then(|_| Ok(self.tools.compile_macro(&tmp)?));
        if let Err(err) = fs::remove_file(&tmp) {
            warn!("Can't remove {}: {err}", tmp.display());
        }

        match compiled? {
            true => Ok(()),
            false => Err(SubmitterError::Compilation(macro_path.to_path_buf())),
        }
    }

    fn require_valid(&self) -> Result<(), SubmitterError> {
        match self.valid {
            true => Ok(()),
            false => Err(SubmitterError::Invalid),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn set_var(&mut self, name: &str, value: &str) -> Result<(), SubmitterError> {
        self.vars.set(name, value)
    }

    pub fn vars(&self) -> &VariableStore {
        &self.vars
    }

    pub fn set_run_list(&mut self, runs: RunList) {
        self.runs = runs;
        self.update_local_file_list(true);
    }

    pub fn runs(&self) -> &RunList {
        &self.runs
    }

    /// Use OCDB snapshots: faster job initialisation, but they take time to produce
    pub fn use_ocdb_snapshots(&mut self, flag: bool) {
        self.settings.use_ocdb_snapshots = flag;
        let value = if flag { "kTRUE" } else { "kFALSE" };
        self.vars.set_builtin("VAR_OCDB_SNAPSHOT", value);
        self.update_local_file_list(false);
    }

    /// Change the snapshot top directory, which must contain an `OCDB` subdirectory
    pub fn set_ocdb_snapshot_dir(&mut self, dir: &Path) -> Result<(), SubmitterError> {
        if !dir.join("OCDB").is_dir() {
            return Err(SubmitterError::InvalidSnapshotDir(dir.to_path_buf()));
        }
        self.snapshot_dir = dir.to_path_buf();
        self.update_local_file_list(true);
        Ok(())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn remote_dir(&self) -> &str {
        &self.remote_dir
    }

    pub fn merged_dir(&self) -> &str {
        &self.merged_dir
    }

    pub fn snapshot_dir(&self) -> &Path {
        &self.snapshot_dir
    }

    pub fn local_dir(&self) -> &Path {
        &self.settings.local_dir
    }

    /// Run one mode, chaining the steps it is made of
    pub fn run(&mut self, mode: Mode) -> Result<(), SubmitterError> {
        self.require_valid()?;
        info!("Running mode {mode}");

        match mode {
            Mode::Local => self.copy_template_files_to_local(),
            Mode::Upload => self.copy_local_files_to_remote(),
            Mode::Ocdb => {
                self.copy_template_files_to_local()?;
                self.make_ocdb_snapshots()
            }
            Mode::Submit => self.submit_all(false),
            Mode::Full => {
                self.copy_template_files_to_local()?;
                self.make_ocdb_snapshots()?;
                self.copy_local_files_to_remote()?;
                self.submit_all(false)
            }
            Mode::Test => {
                self.copy_template_files_to_local()?;
                self.make_ocdb_snapshots()?;
                self.copy_local_files_to_remote()?;
                self.submit_all(true)
            }
        }
    }

    /// Submit, turning failed runs into an error, dry run or not
    fn submit_all(&self, dry_run: bool) -> Result<(), SubmitterError> {
        let report = self.submit(dry_run)?;
        let what = if dry_run { "dry-run submission" } else { "submission" };
        match report.failed.is_empty() {
            true => Ok(()),
            false => Err(SubmitterError::FailedRuns(what, report.failed)),
        }
    }
}

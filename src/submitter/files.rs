use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};

use crate::config::settings::Settings;
use crate::error::SubmitterError;
use crate::jdl::merge::MergeJdl;
use crate::jdl::run::RunJdl;
use crate::jdl::{
    is_final_merge_jdl, is_jdl, is_merge_jdl, write_jdl, FINAL_MERGE_JDL, MERGE_JDL, RUN_JDL,
};
use crate::runs::RunNumber;
use crate::submitter::Submitter;
use crate::template::replace::{substitute, variables_in};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SnapshotKind {
    Sim,
    Rec,
}

impl SnapshotKind {
    pub const ALL: [SnapshotKind; 2] = [SnapshotKind::Sim, SnapshotKind::Rec];

    pub fn as_str(&self) -> &'static str {
        match self {
            SnapshotKind::Sim => "sim",
            SnapshotKind::Rec => "rec",
        }
    }
}

/// A file to upload to the remote directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalFile {
    /// Instantiated template (or generated JDL), relative to the local directory
    Template(String),
    /// OCDB snapshot of one run, below the snapshot directory
    Snapshot { run: RunNumber, kind: SnapshotKind, path: PathBuf },
}

impl LocalFile {
    pub fn local_path(&self, local_dir: &Path) -> PathBuf {
        match self {
            LocalFile::Template(name) => local_dir.join(name),
            LocalFile::Snapshot { path, .. } => path.clone(),
        }
    }

    /// Path relative to the remote directory
    pub fn remote_name(&self) -> String {
        match self {
            LocalFile::Template(name) => name.clone(),
            LocalFile::Snapshot { run, kind, .. } => snapshot_name(*run, *kind),
        }
    }

    pub fn is_snapshot(&self) -> bool {
        matches!(self, LocalFile::Snapshot { .. })
    }
}

impl fmt::Display for LocalFile {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LocalFile::Template(name) => write!(f, "{name}"),
            LocalFile::Snapshot { path, .. } => write!(f, "{}", path.display()),
        }
    }
}

/// `OCDB/<run>/OCDB_<kind>.root`
pub fn snapshot_name(run: RunNumber, kind: SnapshotKind) -> String {
    format!("OCDB/{run}/OCDB_{}.root", kind.as_str())
}

pub fn snapshot_path(snapshot_dir: &Path, run: RunNumber, kind: SnapshotKind) -> PathBuf {
    snapshot_dir.join(snapshot_name(run, kind))
}

/// Files every production needs, in upload order. The generator macro is added once validated.
pub fn template_file_list(settings: &Settings) -> Vec<String> {
    let config = settings.external_config.as_deref().unwrap_or("Config.C");
    let mut files: Vec<String> = [
        "CheckESD.C",
        "CheckAOD.C",
        "AODtrain.C",
        "validation.sh",
        config,
        "rec.C",
        "sim.C",
        "simrun.C",
        RUN_JDL,
    ]
    .iter()
    .map(|name| name.to_string())
    .collect();

    if settings.use_aod_merging {
        for name in [MERGE_JDL, FINAL_MERGE_JDL, "AOD_merge.sh", "validation_merge.sh"] {
            files.push(name.to_string());
        }
    }
    files
}

impl Submitter {
    pub fn template_files(&self) -> &[String] {
        &self.template_files
    }

    pub fn local_files(&self) -> &[LocalFile] {
        &self.local_files
    }

    /// Add the snapshots found on disk for the current runs, optionally forgetting known ones first
    ///
    /// Without OCDB snapshots the list only holds templates.
    pub fn update_local_file_list(&mut self, clear_snapshots: bool) {
        if clear_snapshots || !self.settings.use_ocdb_snapshots {
            self.local_files.retain(|file| !file.is_snapshot());
        }
        if !self.settings.use_ocdb_snapshots {
            return;
        }

        for run in self.runs.runs().to_vec() {
            for kind in SnapshotKind::ALL {
                let path = snapshot_path(&self.snapshot_dir, run, kind);
                if path.exists() {
                    self.add_snapshot(run, kind, path);
                }
            }
        }
    }

    pub(super) fn add_snapshot(&mut self, run: RunNumber, kind: SnapshotKind, path: PathBuf) {
        let file = LocalFile::Snapshot { run, kind, path };
        if !self.local_files.contains(&file) {
            debug!("Adding {file} to the local files");
            self.local_files.push(file);
        }
    }

    /// Instantiate the templates into the local directory
    ///
    /// JDL files are generated, the other templates are copied and their variables replaced.
    /// Existing local files are kept unless overwriting is enabled; they count as conflicts
    /// which fail the copy once every other file has been dealt with.
    pub fn copy_template_files_to_local(&self) -> Result<(), SubmitterError> {
        self.require_valid()?;
        let local_dir = &self.settings.local_dir;
        fs::create_dir_all(local_dir)?;

        let overwrite = self.settings.overwrite_files;
        let mut errors = 0;
        let mut conflicts = 0;

        for name in &self.template_files {
            let local = local_dir.join(name);
            if !overwrite && local.exists() {
                error!(
                    "Local file {} already exists, remove it first if you want to overwrite it",
                    local.display()
                );
                conflicts += 1;
                continue;
            }

            let result = match is_jdl(name) {
                true => self.generate_jdl(name, &local),
                false => self.instantiate_template(name, &local),
            };
            if let Err(err) = result {
                error!("Error copying {name}: {err}");
                errors += 1;
            }
        }

        if conflicts > 0 {
            warn!(
                "At least one local file could not be overwritten, \
                 cross-check the local files before uploading them"
            );
            return Err(SubmitterError::LocalConflicts(conflicts));
        }
        match errors {
            0 => Ok(()),
            n => Err(SubmitterError::Aggregated("local copy", n)),
        }
    }

    fn instantiate_template(&self, name: &str, local: &Path) -> Result<(), SubmitterError> {
        let template = self.settings.template_dir.join(name);
        if !template.exists() {
            return Err(SubmitterError::MissingLocalFile(template));
        }
        let text = fs::read_to_string(&template)?;
        if variables_in(&text).is_empty() {
            info!("Copying {} to {}", template.display(), local.display());
            fs::copy(&template, local)?;
            return Ok(());
        }

        // nothing is written unless every variable has a value
        let rendered = substitute(&text, &self.vars).map_err(|missing| {
            SubmitterError::UnresolvedVariables { file: template.clone(), missing }
        })?;
        info!("Instantiating {} into {}", template.display(), local.display());
        fs::write(local, rendered)?;
        Ok(())
    }

    fn generate_jdl(&self, name: &str, local: &Path) -> Result<(), SubmitterError> {
        let content = if is_merge_jdl(name) {
            MergeJdl {
                remote_dir: &self.remote_dir,
                packages: &self.settings.packages,
                split_max_input_file_number: self.settings.split_max_input_file_number,
                final_stage: is_final_merge_jdl(name),
            }
            .render()?
        } else {
            // every template is shipped, JDLs included
            RunJdl {
                remote_dir: &self.remote_dir,
                packages: &self.settings.packages,
                input_files: &self.template_files,
                use_ocdb_snapshots: self.settings.use_ocdb_snapshots,
                compact_mode: self.settings.compact_mode,
            }
            .render()?
        };
        write_jdl(local, &content, self.settings.overwrite_files)
    }

    /// Local files that are missing
    pub fn check_local(&self) -> Vec<PathBuf> {
        self.local_files
            .iter()
            .map(|file| file.local_path(&self.settings.local_dir))
            .filter(|path| !path.exists())
            .inspect(|path| warn!("Local file {} is missing", path.display()))
            .collect()
    }

    /// Remove the local files. Snapshots are slow to make, so they are only removed on demand.
    pub fn clean_local(&self, clean_snapshots: bool) -> Result<usize, SubmitterError> {
        let mut removed = 0;
        for file in &self.local_files {
            if file.is_snapshot() && !clean_snapshots {
                continue;
            }
            let path = file.local_path(&self.settings.local_dir);
            if path.exists() {
                info!("Removing {}", path.display());
                fs::remove_file(&path)?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_file_list() {
        let settings = Settings::default();
        let files = template_file_list(&settings);
        assert_eq!(files.len(), 9);
        assert_eq!(files[4], "Config.C");
        assert_eq!(files.last().map(String::as_str), Some(RUN_JDL));
    }

    #[test]
    fn test_template_file_list_with_merging_and_external_config() {
        let settings = Settings {
            use_aod_merging: true,
            external_config: Some("ConfigPbPb.C".to_string()),
            ..Settings::default()
        };
        let files = template_file_list(&settings);
        assert_eq!(files.len(), 13);
        assert!(files.contains(&"ConfigPbPb.C".to_string()));
        assert!(!files.contains(&"Config.C".to_string()));
        assert!(files.contains(&FINAL_MERGE_JDL.to_string()));
        assert!(files.contains(&"validation_merge.sh".to_string()));
    }

    #[test]
    fn test_snapshot_names() {
        let file = LocalFile::Snapshot {
            run: 195682,
            kind: SnapshotKind::Rec,
            path: snapshot_path(Path::new("/data/snap"), 195682, SnapshotKind::Rec),
        };
        assert_eq!(file.remote_name(), "OCDB/195682/OCDB_rec.root");
        assert_eq!(
            file.local_path(Path::new("/work")),
            PathBuf::from("/data/snap/OCDB/195682/OCDB_rec.root")
        );
        assert_eq!(LocalFile::Template("sim.C".to_string()).local_path(Path::new("/work")), PathBuf::from("/work/sim.C"));
    }
}

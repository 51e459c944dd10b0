use log::{error, info, warn};

use crate::error::SubmitterError;
use crate::grid::remote::{remote_directory_exists, remote_file_exists, split_path};
use crate::submitter::files::LocalFile;
use crate::submitter::Submitter;

impl Submitter {
    /// The grid is reachable and the remote directory exists
    pub fn check_remote_dir(&self) -> Result<(), SubmitterError> {
        if self.remote_dir.is_empty() {
            return Err(SubmitterError::NoRemoteDir);
        }
        if !remote_directory_exists(self.grid.as_ref(), &self.remote_dir) {
            error!("Directory {} does not exist", self.remote_dir);
            return Err(SubmitterError::MissingRemoteDir(self.remote_dir.clone()));
        }
        Ok(())
    }

    fn remote_path(&self, file: &LocalFile) -> String {
        format!("{}/{}", self.remote_dir, file.remote_name())
    }

    /// Copy one local file to its place below the remote directory, creating directories as needed
    pub fn copy_file(&self, file: &LocalFile) -> Result<(), SubmitterError> {
        let local = file.local_path(&self.settings.local_dir);
        if !local.exists() {
            error!("Local file {} does not exist", local.display());
            return Err(SubmitterError::MissingLocalFile(local));
        }

        let remote = self.remote_path(file);
        let (dir, _) = split_path(&remote);
        if !remote_directory_exists(self.grid.as_ref(), dir) {
            self.grid.mkdir(dir)?;
        }
        self.grid.copy(&local, &remote)?;
        Ok(())
    }

    /// Upload every local file. A failed copy doesn't stop the others.
    pub fn copy_local_files_to_remote(&self) -> Result<(), SubmitterError> {
        self.require_valid()?;
        self.check_remote_dir()?;

        let mut errors = 0;
        for file in &self.local_files {
            if let Err(err) = self.copy_file(file) {
                error!("Could not upload {file}: {err}");
                errors += 1;
            }
        }
        match errors {
            0 => {
                info!("Uploaded {} files to {}", self.local_files.len(), self.remote_dir);
                Ok(())
            }
            n => Err(SubmitterError::Aggregated("upload", n)),
        }
    }

    /// Remote paths of the local files not found on the grid
    pub fn check_remote(&self) -> Result<Vec<String>, SubmitterError> {
        self.require_valid()?;
        self.check_remote_dir()?;

        let missing: Vec<String> = self
            .local_files
            .iter()
            .map(|file| self.remote_path(file))
            .filter(|remote| !remote_file_exists(self.grid.as_ref(), remote))
            .collect();
        for remote in &missing {
            warn!("Remote file {remote} is missing");
        }
        Ok(missing)
    }

    /// Remove the uploaded copies of the local files, returning how many were removed
    pub fn clean_remote(&self) -> Result<usize, SubmitterError> {
        self.require_valid()?;
        self.check_remote_dir()?;

        let mut removed = 0;
        let mut errors = 0;
        for file in &self.local_files {
            let remote = self.remote_path(file);
            if !remote_file_exists(self.grid.as_ref(), &remote) {
                continue;
            }
            match self.grid.remove(&remote) {
                Ok(()) => removed += 1,
                Err(err) => {
                    error!("Could not remove {remote}: {err}");
                    errors += 1;
                }
            }
        }
        match errors {
            0 => Ok(removed),
            n => Err(SubmitterError::Aggregated("remote cleanup", n)),
        }
    }
}

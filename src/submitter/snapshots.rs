use log::{error, info, warn};

use crate::error::SubmitterError;
use crate::submitter::files::{snapshot_path, SnapshotKind};
use crate::submitter::Submitter;

impl Submitter {
    /// Run the simulation macro in snapshot mode for every run without snapshots yet
    ///
    /// Needs the templates in the local directory. Snapshots already on disk are never redone,
    /// delete them by hand to force it.
    pub fn make_ocdb_snapshots(&mut self) -> Result<(), SubmitterError> {
        self.require_valid()?;
        if !self.settings.use_ocdb_snapshots {
            info!("OCDB snapshots are not used");
            return Ok(());
        }
        if self.runs.is_empty() {
            return Err(SubmitterError::NoRuns);
        }

        let mut failed = Vec::new();
        for run in self.runs.runs().to_vec() {
            let paths = SnapshotKind::ALL
                .map(|kind| (kind, snapshot_path(&self.snapshot_dir, run, kind)));

            if paths.iter().all(|(_, path)| path.exists()) {
                warn!("Local OCDB snapshots already there for run {run}, they won't be redone");
            } else {
                if let Err(err) = self.tools.make_snapshot(&self.settings.local_dir, run) {
                    error!("{err:#}");
                }
                let missing: Vec<_> = paths.iter().filter(|(_, path)| !path.exists()).collect();
                if !missing.is_empty() {
                    for (kind, path) in missing {
                        error!("Could not create {} OCDB snapshot {}", kind.as_str(), path.display());
                    }
                    failed.push(run);
                    continue;
                }
            }

            for (kind, path) in paths {
                self.add_snapshot(run, kind, path);
            }
        }

        match failed.is_empty() {
            true => Ok(()),
            false => Err(SubmitterError::Snapshots(failed)),
        }
    }
}

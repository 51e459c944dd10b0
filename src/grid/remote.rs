use log::{debug, error, info};

use crate::error::SubmitterError;
use crate::grid::client::GridClient;

/// Split a grid path into its parent directory and base name
pub fn split_path(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(0) => ("/", &path[1..]),
        Some(i) => (&path[..i], &path[i + 1..]),
        None => (".", path),
    }
}

/// Whether a directory exists, by looking for `<basename>/` in the listing of its parent
pub fn remote_directory_exists(grid: &dyn GridClient, dir: &str) -> bool {
    let stripped = dir.trim().trim_end_matches('/');
    if stripped.is_empty() {
        return grid.list("/", true).is_some();
    }
    let (parent, base) = split_path(stripped);
    let wanted = format!("{base}/");

    match grid.list(parent, true) {
        Some(listing) => listing
            .records()
            .iter()
            .any(|record| record.get("name").is_some_and(|name| *name == wanted)),
        None => false,
    }
}

/// Whether a file exists: its listing must have a first entry with a non-empty name
pub fn remote_file_exists(grid: &dyn GridClient, lfn: &str) -> bool {
    grid.list(lfn, false)
        .and_then(|listing| listing.key(0, "name").map(|name| !name.is_empty()))
        .unwrap_or(false)
}

/// Return `dir` if it exists, creating it first when `create` is set
pub fn get_remote_dir(
    grid: &dyn GridClient,
    dir: &str,
    create: bool,
) -> Result<String, SubmitterError> {
    if !remote_directory_exists(grid, dir) {
        if !create {
            error!("Remote directory {dir} does not exist");
            return Err(SubmitterError::MissingRemoteDir(dir.to_string()));
        }
        info!("Remote directory {dir} does not exist, trying to create it");
        grid.mkdir(dir)?;
    }
    Ok(dir.to_string())
}

/// Last merging stage already performed in `dir` (the highest `Stage_<n>/`), 0 if none
pub fn last_stage(grid: &dyn GridClient, dir: &str) -> u32 {
    let stage = grid
        .list(dir, true)
        .map(|listing| {
            listing
                .records()
                .iter()
                .filter_map(|record| record.get("name"))
                .filter_map(|name| {
                    name.strip_prefix("Stage_")?.strip_suffix('/')?.parse::<u32>().ok()
                })
                .max()
                .unwrap_or(0)
        })
        .unwrap_or(0);
    debug!("Last merging stage in {dir} is {stage}");
    stage
}

//! Job description language (JDL) files
//!
//! JDL files aren't copied from the template directory, they're generated from the
//! configuration and written to the local directory with the other files to upload.

/// Format `key = value;` entries
pub mod output;

/// Simulation + reconstruction + AOD filtering jobs, one master job per run
pub mod run;

/// Intermediate and final AOD merging jobs
pub mod merge;

use std::fs;
use std::path::Path;

use chrono::Utc;
use log::info;
use serde::Serialize;
use tinytemplate::TinyTemplate;

use crate::error::SubmitterError;

pub const RUN_JDL: &str = "run.jdl";
pub const MERGE_JDL: &str = "AOD_merge.jdl";
pub const FINAL_MERGE_JDL: &str = "AOD_merge_final.jdl";

pub fn merge_jdl_name(final_stage: bool) -> &'static str {
    match final_stage {
        true => FINAL_MERGE_JDL,
        false => MERGE_JDL,
    }
}

pub fn is_jdl(name: &str) -> bool {
    name.to_lowercase().contains(".jdl")
}

pub fn is_merge_jdl(name: &str) -> bool {
    is_jdl(name) && name.to_lowercase().contains("merge")
}

/// The final merging JDL is told apart by its name
pub fn is_final_merge_jdl(name: &str) -> bool {
    is_merge_jdl(name) && name.to_lowercase().contains("final")
}

/// Rendering context for the comment header
#[derive(Serialize)]
struct HeaderContext<'a> {
    kind: &'a str,
    version: &'a str,
    time_now: String,
    notes: &'a [&'a str],
}

/// Render the comment header of a generated JDL using TinyTemplate
fn render_header(kind: &str, notes: &[&str]) -> anyhow::Result<String> {
    /// included header template
    static HEADER: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/templates/jdl_header.txt"));
    let mut tt = TinyTemplate::new();
    tt.set_default_formatter(&tinytemplate::format_unescaped);
    tt.add_template("header", HEADER)?;

    let context = HeaderContext {
        kind,
        version: env!("CARGO_PKG_VERSION"),
        time_now: Utc::now().to_rfc3339(),
        notes,
    };
    Ok(tt.render("header", &context)?)
}

/// Write a generated JDL, refusing to replace an existing file unless `overwrite` is set
pub fn write_jdl(path: &Path, content: &str, overwrite: bool) -> Result<(), SubmitterError> {
    if !overwrite && path.exists() {
        return Err(SubmitterError::LocalFileExists(path.to_path_buf()));
    }
    info!("Writing jdl to {}", path.display());
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_names() {
        assert!(is_jdl("run.JDL"));
        assert!(!is_merge_jdl(RUN_JDL));
        assert!(is_merge_jdl(MERGE_JDL));
        assert!(!is_final_merge_jdl(MERGE_JDL));
        assert!(is_final_merge_jdl(FINAL_MERGE_JDL));
        assert!(!is_final_merge_jdl("validation_merge.sh"));
    }

    #[test]
    fn test_header_lists_notes() -> anyhow::Result<()> {
        let header = render_header("merging", &["$1 = run number", "$2 = merging stage"])?;
        let lines: Vec<&str> = header.lines().collect();
        assert!(lines[0].starts_with("# Generated merging jdl"));
        assert_eq!(&lines[1..], &["# $1 = run number", "# $2 = merging stage"]);
        Ok(())
    }

    #[test]
    fn test_write_jdl_respects_overwrite() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(RUN_JDL);
        write_jdl(&path, "TTL = 1;\n", false)?;
        assert!(matches!(
            write_jdl(&path, "TTL = 2;\n", false),
            Err(SubmitterError::LocalFileExists(_))
        ));
        write_jdl(&path, "TTL = 2;\n", true)?;
        assert_eq!(fs::read_to_string(&path)?, "TTL = 2;\n");
        Ok(())
    }
}

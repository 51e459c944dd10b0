use crate::config::settings::{CompactMode, Packages};
use crate::jdl::output::JdlWriter;
use crate::jdl::render_header;

/// Everything the run JDL is generated from
///
/// The job arguments are `$1` = run number, `$2` = number of chunks, `$3` = events per chunk.
pub struct RunJdl<'a> {
    pub remote_dir: &'a str,
    pub packages: &'a Packages,
    /// Files to ship with each job, relative to the remote directory
    pub input_files: &'a [String],
    pub use_ocdb_snapshots: bool,
    pub compact_mode: CompactMode,
}

impl RunJdl<'_> {
    pub fn render(&self) -> anyhow::Result<String> {
        let header = render_header(
            "simulation",
            &["$1 = run number", "$2 = number of chunks", "$3 = events per chunk"],
        )?;
        let remote = self.remote_dir;
        let mut jdl = JdlWriter::with_header(&header);

        jdl.output("Packages", &self.packages.as_list())
            .output_one("Jobtag", "comment: AliMuonAccEffSubmitter RUN $1")
            .output_one("split", "production:1-$2")
            .output_one("Price", "1")
            .output_one("OutputDir", &format!("{remote}/$1/#alien_counter_03i#"))
            .output_one("Executable", "/alice/bin/aliroot_new");

        let mut files: Vec<String> = self
            .input_files
            .iter()
            .map(|file| format!("LF:{remote}/{file}"))
            .collect();
        if self.use_ocdb_snapshots {
            files.push(format!("LF:{remote}/OCDB/$1/OCDB_sim.root"));
            files.push(format!("LF:{remote}/OCDB/$1/OCDB_rec.root"));
        }
        jdl.output("InputFile", files.as_slice());

        let logs = "log_archive.zip:stderr,stdout,aod.log,checkaod.log,checkesd.log,rec.log,sim.log@disk=1";
        let roots = match self.compact_mode {
            CompactMode::Full => "root_archive.zip:galice*.root,Kinematics*.root,TrackRefs*.root,AliESDs.root,AliAOD.root,AliAOD.Muons.root,Merged.QA.Data.root,Run*.root@disk=2",
            CompactMode::MuonAods => "root_archive.zip:galice*.root,AliAOD.Muons.root@disk=2",
        };

        jdl.output("OutputArchive", &[logs, roots])
            .output_one("splitarguments", "simrun.C --run $1 --chunk #alien_counter# --event $3")
            .output_one("Workdirectorysize", "5000MB")
            .output("JDLVariables", &["Packages", "OutputDir"])
            .output_one("Validationcommand", &format!("{remote}/validation.sh"))
            .output_one("TTL", "72000");

        Ok(jdl.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(compact_mode: CompactMode, use_ocdb_snapshots: bool) -> String {
        let packages = Packages::default();
        let files = vec!["sim.C".to_string(), "rec.C".to_string()];
        RunJdl {
            remote_dir: "/alice/sim",
            packages: &packages,
            input_files: &files,
            use_ocdb_snapshots,
            compact_mode,
        }
        .render()
        .unwrap()
    }

    #[test]
    fn test_run_jdl_entries() {
        let jdl = render(CompactMode::MuonAods, true);
        assert!(jdl.starts_with("# Generated simulation jdl"));
        assert!(jdl.contains("split = \"production:1-$2\";\n"));
        assert!(jdl.contains("Price = 1;\n"));
        assert!(jdl.contains("TTL = 72000;\n"));
        assert!(jdl.contains("OutputDir = \"/alice/sim/$1/#alien_counter_03i#\";\n"));
        assert!(jdl.contains(
            "InputFile = {\n\t\"LF:/alice/sim/sim.C\",\n\t\"LF:/alice/sim/rec.C\",\n\t\"LF:/alice/sim/OCDB/$1/OCDB_sim.root\",\n\t\"LF:/alice/sim/OCDB/$1/OCDB_rec.root\"\n};\n"
        ));
        assert!(jdl.contains("\t\"root_archive.zip:galice*.root,AliAOD.Muons.root@disk=2\"\n"));
        assert!(jdl.contains("Validationcommand = \"/alice/sim/validation.sh\";\n"));
    }

    #[test]
    fn test_run_jdl_without_snapshots_keeps_everything() {
        let jdl = render(CompactMode::Full, false);
        assert!(!jdl.contains("OCDB_sim.root"));
        assert!(jdl.contains("Kinematics*.root"));
    }
}

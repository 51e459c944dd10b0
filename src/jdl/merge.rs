use crate::config::settings::Packages;
use crate::jdl::output::JdlWriter;
use crate::jdl::render_header;

/// Everything the merging JDLs are generated from
///
/// The job arguments are `$1` = run number and, for intermediate stages, `$2` = merging stage.
/// `Stage_<n>.xml` collections are made by finding `*root_archive.zip` in stage `n-1`.
pub struct MergeJdl<'a> {
    pub remote_dir: &'a str,
    pub packages: &'a Packages,
    pub split_max_input_file_number: u32,
    pub final_stage: bool,
}

impl MergeJdl<'_> {
    pub fn render(&self) -> anyhow::Result<String> {
        let header = render_header(
            "merging",
            &[
                "$1 = run number",
                "$2 = merging stage",
                "Stage_<n>.xml made via: find <OutputDir> *Stage<n-1>/*root_archive.zip",
            ],
        )?;
        let remote = self.remote_dir;
        let mut jdl = JdlWriter::with_header(&header);

        jdl.output("Packages", &self.packages.as_list())
            .output_one("Executable", "AOD_merge.sh")
            .output_one("Price", "1");

        match self.final_stage {
            true => jdl.output_one("Jobtag", "comment: AliMuonAccEffSubmitter final merging"),
            false => jdl.output_one("Jobtag", "comment: AliMuonAccEffSubmitter merging stage $2"),
        };

        jdl.output_one("Workdirectorysize", "5000MB")
            .output_one("Validationcommand", &format!("{remote}/validation_merge.sh"))
            .output_one("TTL", "7200")
            .output(
                "OutputArchive",
                &[
                    "log_archive.zip:stderr,stdout@disk=1",
                    "root_archive.zip:AliAOD.root,AliAOD.Muons.root,AnalysisResults.root@disk=3",
                ],
            );

        // for AOD_merge.sh, 1 is an intermediate merging stage and 2 the final merging
        let argument = if self.final_stage { "2" } else { "1" };
        jdl.output_one("Arguments", argument);

        if self.final_stage {
            jdl.output(
                "InputFile",
                &[format!("LF:{remote}/AODtrain.C"), format!("LF:{remote}/$1/wn.xml")],
            )
            .output_one("OutputDir", &format!("{remote}/$1"));
        } else {
            jdl.output_one("InputFile", &format!("LF:{remote}/AODtrain.C"))
                .output_one("OutputDir", &format!("{remote}/$1/Stage_$2/#alien_counter_03i#"))
                .output_one("InputDataCollection", &format!("{remote}/$1/Stage_$2.xml,nodownload"))
                .output_one("split", "se")
                .output_one(
                    "SplitMaxInputFileNumber",
                    &self.split_max_input_file_number.to_string(),
                )
                .output_one("InputDataListFormat", "xml-single")
                .output_one("InputDataList", "wn.xml");
        }

        Ok(jdl.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(final_stage: bool) -> String {
        let packages = Packages::default();
        MergeJdl {
            remote_dir: "/alice/sim",
            packages: &packages,
            split_max_input_file_number: 20,
            final_stage,
        }
        .render()
        .unwrap()
    }

    #[test]
    fn test_intermediate_merge_jdl() {
        let jdl = render(false);
        assert!(jdl.contains("Jobtag = \"comment: AliMuonAccEffSubmitter merging stage $2\";\n"));
        assert!(jdl.contains("Arguments = 1;\n"));
        assert!(jdl.contains("SplitMaxInputFileNumber = 20;\n"));
        assert!(jdl.contains("InputDataCollection = \"/alice/sim/$1/Stage_$2.xml,nodownload\";\n"));
        assert!(jdl.contains("TTL = 7200;\n"));
    }

    #[test]
    fn test_final_merge_jdl() {
        let jdl = render(true);
        assert!(jdl.contains("Arguments = 2;\n"));
        assert!(jdl.contains("OutputDir = \"/alice/sim/$1\";\n"));
        assert!(jdl.contains(
            "InputFile = {\n\t\"LF:/alice/sim/AODtrain.C\",\n\t\"LF:/alice/sim/$1/wn.xml\"\n};\n"
        ));
        assert!(!jdl.contains("split = "));
    }
}

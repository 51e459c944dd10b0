//! External physics tools: macro compilation and OCDB snapshot production

use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::config::settings::ToolchainSettings;
use crate::runs::RunNumber;

/// The ROOT/AliRoot operations the submitter relies on
pub trait Toolchain {
    /// Whether a macro compiles
    fn compile_macro(&self, path: &Path) -> Result<bool>;

    /// Run `simrun.C` in `work_dir` in snapshot mode, producing `OCDB/<run>/OCDB_{sim,rec}.root`
    fn make_snapshot(&self, work_dir: &Path, run: RunNumber) -> Result<()>;
}

/// Runs `root` and `aliroot` from the path
pub struct AliRoot {
    settings: ToolchainSettings,
}

impl AliRoot {
    pub fn new(settings: &ToolchainSettings) -> Self {
        AliRoot { settings: settings.clone() }
    }

    fn compile_statement(&self, path: &Path) -> String {
        let includes: Vec<String> = self
            .settings
            .include_dirs
            .iter()
            .map(|dir| format!("gSystem->AddIncludePath(\"-I{dir}\");"))
            .collect();
        format!(
            "{} if (gROOT->LoadMacro(\"{}++\")) gSystem->Exit(1);",
            includes.join(" "),
            path.display()
        )
    }
}

impl Toolchain for AliRoot {
    fn compile_macro(&self, path: &Path) -> Result<bool> {
        let statement = self.compile_statement(path);
        let mut root = Command::new(&self.settings.root);
        let cmd = root.args(["-b", "-q", "-l", "-e", &statement]);
        info!("Compiling macro {}", path.display());
        info!("{:?}", &cmd);
        let status = cmd
            .status()
            .with_context(|| format!("Failed to execute {}", self.settings.root))?;
        if !status.success() {
            warn!("Macro {} can not be compiled", path.display());
        }
        Ok(status.success())
    }

    fn make_snapshot(&self, work_dir: &Path, run: RunNumber) -> Result<()> {
        let run_arg = run.to_string();
        let mut aliroot = Command::new(&self.settings.aliroot);
        let cmd = aliroot
            .current_dir(work_dir)
            .args(["-b", "-q", "-x", "simrun.C", "--run", &run_arg, "--snapshot"]);
        info!("Making OCDB snapshots for run {run}");
        info!("{:?}", &cmd);
        let status = cmd
            .status()
            .with_context(|| format!("Failed to execute {}", self.settings.aliroot))?;
        if !status.success() {
            warn!("Snapshot production for run {run} exited with {status}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_statement() {
        let settings = ToolchainSettings {
            include_dirs: vec!["$ALICE_ROOT/include".to_string()],
            ..ToolchainSettings::default()
        };
        let statement = AliRoot::new(&settings).compile_statement(Path::new("/tmp/x/GenParamCustom.C"));
        assert_eq!(
            statement,
            "gSystem->AddIncludePath(\"-I$ALICE_ROOT/include\"); if (gROOT->LoadMacro(\"/tmp/x/GenParamCustom.C++\")) gSystem->Exit(1);"
        );
    }
}

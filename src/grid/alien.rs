use std::path::Path;
use std::process::{Command, Output};

use log::{debug, info, warn};
use serde_json::Value;
use url::Url;

use crate::error::GridError;
use crate::grid::client::{GridClient, GridRecord, GridResult};

/// Grid client running the alien command line tool (`alien.py` by default)
///
/// Commands are run with `-json` so replies can be read as records. Any command exiting with a
/// non-zero status counts as giving no result.
pub struct AlienCli {
    program: String,
    connected: bool,
}

impl AlienCli {
    pub fn new(program: &str) -> Self {
        AlienCli { program: program.to_string(), connected: false }
    }

    fn run(&self, args: &[&str]) -> Result<Output, GridError> {
        let mut alien = Command::new(&self.program);
        let cmd = alien.args(args);
        debug!("{:?}", &cmd);
        cmd.output().map_err(|err| GridError::Spawn(self.program.clone(), err))
    }

    /// Run a command that must exit successfully
    fn run_checked(&self, args: &[&str]) -> Result<Output, GridError> {
        if !self.connected {
            return Err(GridError::NotConnected);
        }
        let output = self.run(args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(GridError::Command(args.join(" "), stderr));
        }
        Ok(output)
    }

    /// Run `<command> -json <args>` and read its records
    fn query(&self, command: &str, args: &[&str]) -> Option<GridResult> {
        let mut full = vec![command, "-json"];
        full.extend_from_slice(args);
        match self.run_checked(&full) {
            Ok(output) => parse_results(&String::from_utf8_lossy(&output.stdout)),
            Err(err) => {
                debug!("{err}");
                None
            }
        }
    }
}

/// Read the `results` array of a JSON reply. Non-string values are kept as JSON text.
pub fn parse_results(text: &str) -> Option<GridResult> {
    let json: Value = serde_json::from_str(text).ok()?;
    let results = json.get("results")?.as_array()?;
    let records: GridResult = results
        .iter()
        .filter_map(Value::as_object)
        .map(|object| {
            object
                .iter()
                .map(|(key, value)| {
                    let value = match value {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (key.clone(), value)
                })
                .collect::<GridRecord>()
        })
        .collect();
    Some(records)
}

impl GridClient for AlienCli {
    fn connect(&mut self) -> Result<(), GridError> {
        info!("Connecting to the grid with {}", self.program);
        let output = self.run(&["whoami"])?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!("Cannot connect to the grid: {stderr}");
            return Err(GridError::Command("whoami".to_string(), stderr));
        }
        self.connected = true;
        Ok(())
    }

    fn list(&self, path: &str, classify: bool) -> Option<GridResult> {
        match classify {
            true => self.query("ls", &["-F", path]),
            false => self.query("ls", &[path]),
        }
    }

    fn mkdir(&self, path: &str) -> Result<(), GridError> {
        info!("Creating remote directory {path}");
        self.run_checked(&["mkdir", "-p", path]).map(|_| ())
    }

    fn copy(&self, local: &Path, remote: &str) -> Result<(), GridError> {
        let url = Url::parse(&format!("alien://{remote}"))
            .map_err(|err| GridError::Url(remote.to_string(), err))?;
        let source = format!("file:{}", local.display());
        info!("cp {} {}", source, url);
        self.run_checked(&["cp", &source, url.as_str()]).map(|_| ())
    }

    fn remove(&self, path: &str) -> Result<(), GridError> {
        info!("Removing remote file {path}");
        self.run_checked(&["rm", path]).map(|_| ())
    }

    fn find(&self, dir: &str, pattern: &str, collection: &str) -> Option<String> {
        match self.run_checked(&["find", "-x", collection, dir, pattern]) {
            Ok(output) => Some(String::from_utf8_lossy(&output.stdout).into_owned()),
            Err(err) => {
                warn!("{err}");
                None
            }
        }
    }

    fn submit(&self, jdl: &str, args: &[String]) -> Option<GridResult> {
        let mut full: Vec<&str> = vec![jdl];
        full.extend(args.iter().map(String::as_str));
        self.query("submit", &full)
    }

    fn query_job(&self, job_id: &str) -> Option<GridResult> {
        self.query("ps", &["-j", job_id])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_results() {
        let reply = r#"{"results": [{"name": "run.jdl", "size": 1024}, {"name": "sim.C"}], "metadata": {"exitcode": "0"}}"#;
        let result = parse_results(reply).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result.key(0, "name"), Some("run.jdl"));
        assert_eq!(result.key(0, "size"), Some("1024"));
        assert_eq!(result.key(1, "name"), Some("sim.C"));
    }

    #[test]
    fn test_parse_results_rejects_other_replies() {
        assert_eq!(parse_results("not json"), None);
        assert_eq!(parse_results(r#"{"metadata": {}}"#), None);
    }

    #[test]
    fn test_not_connected() {
        let alien = AlienCli::new("alien.py");
        assert!(matches!(alien.mkdir("/alice/sim"), Err(GridError::NotConnected)));
        assert_eq!(alien.list("/alice/sim", true), None);
    }
}

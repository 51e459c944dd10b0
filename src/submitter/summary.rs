use serde::Serialize;
use tinytemplate::TinyTemplate;

use crate::submitter::Submitter;

/// included summary template
static SUMMARY: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/templates/summary.txt"));

#[derive(Serialize)]
struct Variable<'a> {
    name: &'a str,
    value: &'a str,
}

#[derive(Serialize)]
struct SummaryContext<'a> {
    invalid: bool,
    banner: String,
    template_dir: String,
    local_dir: String,
    remote_dir: &'a str,
    show_snapshot_dir: bool,
    snapshot_dir: String,
    ocdb_path: &'a str,
    events: String,
    max_events_per_chunk: u64,
    has_runs: bool,
    plural: bool,
    run_count: usize,
    runs: String,
    vars: Vec<Variable<'a>>,
    files: Vec<String>,
}

impl Submitter {
    /// Describe the configuration: directories, event counts, runs, variables, files to upload
    pub fn summary(&self) -> anyhow::Result<String> {
        let mut tt = TinyTemplate::new();
        tt.set_default_formatter(&tinytemplate::format_unescaped);
        tt.add_template("summary", SUMMARY)?;

        let runs: Vec<String> = self.runs.runs().iter().map(|run| run.to_string()).collect();
        let context = SummaryContext {
            invalid: !self.valid,
            banner: "*".repeat(80),
            template_dir: self.settings.template_dir.display().to_string(),
            local_dir: self.settings.local_dir.display().to_string(),
            remote_dir: &self.remote_dir,
            show_snapshot_dir: self.snapshot_dir != self.settings.local_dir,
            snapshot_dir: self.snapshot_dir.display().to_string(),
            ocdb_path: &self.settings.ocdb_path,
            events: self.settings.events.to_string(),
            max_events_per_chunk: self.settings.max_events_per_chunk,
            has_runs: !runs.is_empty(),
            plural: runs.len() > 1,
            run_count: runs.len(),
            runs: runs.join(" "),
            vars: self.vars.iter().map(|(name, value)| Variable { name, value }).collect(),
            files: self
                .local_files
                .iter()
                .map(|file| file.local_path(&self.settings.local_dir).display().to_string())
                .collect(),
        };
        Ok(tt.render("summary", &context)?)
    }
}

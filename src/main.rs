use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};

use acceff::config::settings::Settings;
use acceff::db::open::open_db;
use acceff::grid::alien::AlienCli;
use acceff::mode::Mode;
use acceff::runs::scalers::ScalerTable;
use acceff::submitter::merge::SPLIT_LEVEL;
use acceff::submitter::Submitter;
use acceff::tools::AliRoot;

/// Submit acceptance x efficiency simulations to the Grid
#[derive(Parser, Debug)]
#[command(name = "acceff")]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON configuration file
    #[arg(short, long, default_value = "acceff.json")]
    config: PathBuf,

    /// Submission database, `acceff.db` in the local directory by default
    #[arg(long)]
    db: Option<PathBuf>,

    /// Don't ask for confirmation
    #[arg(short, long)]
    yes: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default configuration to edit
    New,
    /// Print the configuration and the files to upload
    Print,
    /// Run one step of the production, or all of them
    Run {
        #[arg(value_enum)]
        mode: Mode,
    },
    /// Submit AOD merging jobs
    Merge {
        /// Intermediate merging stage, 0 for the final merging
        #[arg(long, default_value_t = 0)]
        stage: u32,
        #[arg(long)]
        dry_run: bool,
    },
    /// Remove generated files
    Clean {
        /// Also remove the OCDB snapshots
        #[arg(long)]
        snapshots: bool,
        /// Remove the uploaded files instead of the local ones
        #[arg(long)]
        remote: bool,
    },
    /// Check the local and remote files are all there
    Check,
    /// Refresh and list the state of submitted jobs
    Status,
}

fn main() -> Result<()> {
    env_logger::init();
    info!("terve! starting up :)");

    let args = Args::parse();

    match args.command {
        Command::New => write_default_config(&args.config)?,
        Command::Print => print!("{}", load_submitter(&args)?.summary()?),
        Command::Run { mode } => load_submitter(&args)?.run(mode)?,
        Command::Merge { stage, dry_run } => {
            let submitter = load_submitter(&args)?;
            let yes = args.yes;
            let mut confirm = |files: usize| yes || ask_to_continue(files);
            let report = submitter.merge(stage, dry_run, &mut confirm)?;
            info!(
                "{} merging jobs, {} runs skipped, {} failed",
                report.submitted.len(),
                report.skipped.len(),
                report.failed.len()
            );
            if !report.failed.is_empty() {
                bail!("merging failed for runs {:?}", report.failed);
            }
        }
        Command::Clean { snapshots, remote } => {
            let submitter = load_submitter(&args)?;
            let removed = match remote {
                true => submitter.clean_remote()?,
                false => submitter.clean_local(snapshots)?,
            };
            info!("Removed {removed} files");
        }
        Command::Check => {
            let submitter = load_submitter(&args)?;
            let missing_local = submitter.check_local();
            let missing_remote = submitter.check_remote()?;
            if !missing_local.is_empty() || !missing_remote.is_empty() {
                bail!(
                    "{} local and {} remote files are missing",
                    missing_local.len(),
                    missing_remote.len()
                );
            }
            info!("All files are there");
        }
        Command::Status => {
            let submitter = load_submitter(&args)?;
            submitter.refresh_job_states()?;
            for job in submitter.jobs()? {
                println!(
                    "{}\t{}\t{}\t{}",
                    job.run,
                    job.job_id.as_deref().unwrap_or("-"),
                    job.state,
                    job.arguments
                );
            }
        }
    }
    Ok(())
}

fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    Settings::default().save(path)?;
    info!("Wrote default configuration to {}", path.display());
    Ok(())
}

/// Load the configuration and build a submitter recording its jobs in the database
fn load_submitter(args: &Args) -> Result<Submitter> {
    let settings = Settings::load(&args.config)?;
    let db_path = args.db.clone().unwrap_or_else(|| settings.local_dir.join("acceff.db"));

    let scalers = match &settings.scalers {
        Some(path) => ScalerTable::from_file(path)?,
        None => ScalerTable::default(),
    };
    let grid = AlienCli::new(&settings.grid.program);
    let tools = AliRoot::new(&settings.toolchain);

    let submitter = Submitter::new(settings, Box::new(grid), Box::new(tools), Box::new(scalers))?;
    if !submitter.is_valid() {
        warn!("Submitter is not valid, only printing the configuration will work");
    }
    let conn = open_db(&db_path)
        .with_context(|| format!("Can't open database {}", db_path.display()))?;
    Ok(submitter.with_db(conn))
}

/// Ask on the terminal whether to merge a stage with only a few files
fn ask_to_continue(files: usize) -> bool {
    print!("Number of files to merge ({files}) <= split level ({SPLIT_LEVEL}). Continue? [Y/n] ");
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut reply = String::new();
    match io::stdin().lock().read_line(&mut reply) {
        Ok(_) => !reply.trim().to_lowercase().starts_with('n'),
        Err(_) => false,
    }
}

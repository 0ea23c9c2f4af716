/// Multi-folder driver.
///
/// Folders are processed one after another. A folder that cannot be opened
/// or whose run fails is logged and left out of the totals; the remaining
/// folders still run.
use crate::args::Args;
use crate::folders;
use crate::logging;
use crate::settings::Settings;
use maildedup_core::{DedupOptions, MaildirDedup, RunStats};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

pub const USAGE: &str = "\
usage: maildedup <maildir folder> [<more folders>]

or create a settings.toml file with

folders = [...]
";

/// What happened across all folders of one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Sum of the stats of every folder that completed.
    pub totals: RunStats,
    /// Folders that completed a run.
    pub processed: Vec<PathBuf>,
    /// Folders skipped because they have no `maildir` subtree.
    pub skipped: Vec<PathBuf>,
    /// Folders whose engine could not be built or whose run failed.
    pub failed: Vec<PathBuf>,
}

/// Run the engine over every folder in order and aggregate the results.
pub fn run_folders(folders: &[PathBuf], options: DedupOptions) -> Summary {
    let mut summary = Summary::default();
    for folder in folders {
        match run_one(folder, options) {
            Ok(Some(stats)) => {
                summary.totals += stats;
                summary.processed.push(folder.clone());
            }
            Ok(None) => summary.skipped.push(folder.clone()),
            Err(e) => {
                error!("{}: {e}", folder.display());
                summary.failed.push(folder.clone());
            }
        }
    }
    summary
}

fn run_one(folder: &Path, options: DedupOptions) -> maildedup_core::Result<Option<RunStats>> {
    MaildirDedup::new(folder, options)?.run()
}

/// Entry point behind the binary: settings, logging, discovery, runs.
pub fn run(args: Args) -> anyhow::Result<ExitCode> {
    let settings = Settings::load(&args.config)?;
    let sink = args.log.or(settings.log).unwrap_or_default();
    logging::init(sink, args.verbose)?;

    let patterns = folders::discover(&args.folders, &settings);
    if patterns.is_empty() {
        print!("{USAGE}");
        return Ok(ExitCode::FAILURE);
    }

    let folders = folders::expand(&patterns);
    let summary = run_folders(&folders, DedupOptions::default());
    info!(
        processed = summary.processed.len(),
        skipped = summary.skipped.len(),
        failed = summary.failed.len(),
        "All folders done: {}",
        summary.totals
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(ExitCode::SUCCESS)
}

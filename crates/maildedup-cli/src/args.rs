/// Command-line arguments.
use clap::Parser;
use maildedup_core::logging::LogSink;
use std::path::PathBuf;

/// Default settings file, looked up relative to the working directory.
pub const DEFAULT_CONFIG: &str = "settings.toml";

#[derive(Debug, Clone, Parser)]
#[command(
    name = "maildedup",
    version,
    about = "Deduplicate immutable maildir messages with hard links",
    after_help = "If no FOLDER is given, the `folders` list of the settings file is used."
)]
pub struct Args {
    /// Mail folders to process; each must contain a `maildir` subdirectory.
    /// Glob patterns are expanded.
    #[arg(value_name = "FOLDER")]
    pub folders: Vec<String>,

    /// Settings file providing `folders` and `log` defaults.
    #[arg(
        short,
        long,
        value_name = "PATH",
        env = "MAILDEDUP_CONFIG",
        default_value = DEFAULT_CONFIG
    )]
    pub config: PathBuf,

    /// Log sink: `syslog` or `stream` (stderr). Overrides the settings file.
    #[arg(long, value_name = "SINK")]
    pub log: Option<LogSink>,

    /// Print the aggregated statistics as JSON on stdout.
    #[arg(long)]
    pub json: bool,

    /// Log per-directory skip decisions.
    #[arg(short, long)]
    pub verbose: bool,
}

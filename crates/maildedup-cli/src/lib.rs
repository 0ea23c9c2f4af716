/// maildedup CLI — turns arguments and a settings file into engine runs.
///
/// This crate is glue only. The dedup logic lives in `maildedup-core`.
pub mod app;
pub mod args;
pub mod folders;
pub mod logging;
pub mod settings;

pub use app::{run, run_folders, Summary};
pub use args::Args;

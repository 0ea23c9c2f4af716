//! maildedup — reclaims maildir storage by hard-linking identical messages.
//!
//! Thin binary entry point. All logic lives in the `maildedup-core`
//! and `maildedup-cli` crates.

use clap::Parser;
use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    let args = maildedup_cli::Args::parse();
    maildedup_cli::run(args)
}

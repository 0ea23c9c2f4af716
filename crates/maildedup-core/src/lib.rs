/// maildedup Core — hashing, content store, and incremental dedup engine.
///
/// This crate contains all business logic with zero CLI dependencies.
/// Front ends (the bundled CLI, tests, cron wrappers) feed it a list of
/// root mail folders and read back the per-folder statistics.
///
/// # Modules
///
/// - [`hasher`] — Streaming SHA-512 content fingerprints.
/// - [`store`] — Sharded content-addressed store of canonical hard links.
/// - [`engine`] — Per-file register / relink / already-linked decision.
/// - [`scanner`] — Incremental walk over `cur` and `new` message directories.
/// - [`watermark`] — Persisted "last run" timestamp and safety margin.
/// - [`coordinator`] — Per-folder run sequencing (`MaildirDedup`).
/// - [`stats`] — Outcome counters returned by every level.
/// - [`logging`] — Log sink selection passed in by the front end.
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod hasher;
pub mod logging;
pub mod scanner;
pub mod stats;
pub mod store;
pub mod watermark;

pub use coordinator::{DedupOptions, MaildirDedup};
pub use error::{DedupError, Result};
pub use stats::{Outcome, RunStats};

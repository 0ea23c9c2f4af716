/// Incremental scanner — walks `cur` and `new` message directories.
///
/// Layout consumed:
///
/// ```text
/// <folder>/maildir/
///   <mailbox>/
///     cur/   scanned
///     new/   scanned
///     tmp/   never touched: deliveries there may still be in progress
/// ```
///
/// All `cur` directories across all mailboxes are processed first, then all
/// `new` directories. Within each pass mailboxes and files are visited in
/// sorted name order so statistics are reproducible. Hidden entries (names
/// starting with `.`) are skipped at every level.
///
/// A message directory whose own mtime is before the watermark cannot have
/// gained or renamed entries since the last run, so it is skipped without
/// being listed.
use crate::engine::DedupEngine;
use crate::error::{DedupError, Result};
use crate::hasher::ContentHasher;
use crate::stats::RunStats;
use jwalk::{Parallelism, WalkDir};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, trace};

/// Message subdirectories scanned in each mailbox, in pass order.
pub const MESSAGE_DIRS: [&str; 2] = ["cur", "new"];

pub struct Scanner<'a, H: ContentHasher> {
    engine: DedupEngine<'a, H>,
}

impl<'a, H: ContentHasher> Scanner<'a, H> {
    pub fn new(engine: DedupEngine<'a, H>) -> Self {
        Self { engine }
    }

    /// Scan every message directory under `maildir` against `watermark`.
    pub fn scan(&self, maildir: &Path, watermark: SystemTime) -> Result<RunStats> {
        let mut stats = RunStats::default();
        for dir in message_dirs(maildir)? {
            stats += self.scan_dir(&dir, watermark)?;
        }
        Ok(stats)
    }

    /// Scan one `cur` or `new` directory.
    pub fn scan_dir(&self, dir: &Path, watermark: SystemTime) -> Result<RunStats> {
        let mut stats = RunStats::default();

        let modified = fs::metadata(dir)
            .and_then(|m| m.modified())
            .map_err(|e| DedupError::io(dir, e))?;
        if modified < watermark {
            debug!("Skipping {}: no modifications since watermark", dir.display());
            stats.dirs_skipped += 1;
            return Ok(stats);
        }

        for file in list_entries(dir, EntryKind::File)? {
            let outcome = self.engine.process(&file, watermark)?;
            trace!(path = %file.display(), %outcome);
            stats.record(outcome);
        }
        Ok(stats)
    }
}

/// Every `<maildir>/<mailbox>/cur`, then every `<maildir>/<mailbox>/new`.
pub fn message_dirs(maildir: &Path) -> Result<Vec<PathBuf>> {
    let mailboxes = list_entries(maildir, EntryKind::Dir)?;
    let dirs = MESSAGE_DIRS
        .iter()
        .flat_map(|sub| mailboxes.iter().map(move |mb| mb.join(sub)))
        .filter(|dir| dir.is_dir())
        .collect();
    Ok(dirs)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    File,
    Dir,
}

/// Immediate, non-hidden children of `dir` of the given kind, sorted by name.
///
/// A symlink to a directory counts as a directory, so mailboxes linked into
/// `maildir/` are scanned. Symlinked message files are never returned.
fn list_entries(dir: &Path, kind: EntryKind) -> Result<Vec<PathBuf>> {
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort(true)
        .skip_hidden(true)
        .follow_links(false)
        .parallelism(Parallelism::Serial);

    let mut out = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|source| DedupError::Walk {
            path: dir.to_path_buf(),
            source,
        })?;
        let ft = entry.file_type();
        let path = entry.path();
        let wanted = match kind {
            EntryKind::File => ft.is_file(),
            EntryKind::Dir => ft.is_dir() || (ft.is_symlink() && path.is_dir()),
        };
        if wanted {
            out.push(path);
        }
    }
    Ok(out)
}

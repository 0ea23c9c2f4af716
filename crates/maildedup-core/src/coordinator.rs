/// Run coordinator — one full dedup pass over one mail folder.
///
/// Sequence for [`MaildirDedup::run`]:
///
/// 1. Check `<folder>/maildir` exists; if not, log and return `Ok(None)`.
/// 2. Open (create if needed) the content store at `<folder>/dedup`.
/// 3. Read the watermark, minus the safety margin (epoch if absent/corrupt).
/// 4. Scan all `cur` then all `new` directories.
/// 5. Persist the current time as the new watermark.
///
/// The watermark is only written after the scan succeeds. A run that fails
/// part-way leaves the old watermark in place, so the next run re-covers the
/// same window; reprocessing already-linked files just yields `already`.
use crate::engine::DedupEngine;
use crate::error::{DedupError, Result};
use crate::hasher::{ContentHasher, Sha512Hasher, CHUNK_SIZE};
use crate::scanner::Scanner;
use crate::stats::RunStats;
use crate::store::ContentStore;
use crate::watermark::{self, SAFETY_MARGIN};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};
use tracing::{error, info, info_span, Span};

/// Name of the message tree under a mail folder.
pub const MAILDIR_DIR: &str = "maildir";
/// Name of the content store root under a mail folder.
pub const STORE_DIR: &str = "dedup";

/// Per-folder tunables.
#[derive(Debug, Clone, Copy)]
pub struct DedupOptions {
    /// Subtracted from the stored watermark before use.
    pub safety_margin: Duration,
    /// Read size for hashing.
    pub chunk_size: usize,
}

impl Default for DedupOptions {
    fn default() -> Self {
        Self {
            safety_margin: SAFETY_MARGIN,
            chunk_size: CHUNK_SIZE,
        }
    }
}

/// The dedup engine for one mail folder.
pub struct MaildirDedup<H: ContentHasher = Sha512Hasher> {
    folder: PathBuf,
    options: DedupOptions,
    hasher: H,
    span: Span,
    stats: Option<RunStats>,
}

impl MaildirDedup<Sha512Hasher> {
    /// Engine for `folder` with the SHA-512 hasher.
    ///
    /// Fails with [`DedupError::NoSuchFolder`] if `folder` does not exist.
    pub fn new(folder: impl Into<PathBuf>, options: DedupOptions) -> Result<Self> {
        let hasher = Sha512Hasher::with_chunk_size(options.chunk_size);
        Self::with_hasher(folder, options, hasher)
    }
}

impl<H: ContentHasher> MaildirDedup<H> {
    /// Engine for `folder` using a caller-supplied hasher.
    pub fn with_hasher(folder: impl Into<PathBuf>, options: DedupOptions, hasher: H) -> Result<Self> {
        let folder = folder.into();
        let span = info_span!("maildedup", folder = %folder.display());
        if !folder.exists() {
            span.in_scope(|| error!("No such folder"));
            return Err(DedupError::NoSuchFolder(folder));
        }
        Ok(Self {
            folder,
            options,
            hasher,
            span,
            stats: None,
        })
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn maildir(&self) -> PathBuf {
        self.folder.join(MAILDIR_DIR)
    }

    pub fn store_root(&self) -> PathBuf {
        self.folder.join(STORE_DIR)
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Statistics of the last successful run, if any.
    pub fn stats(&self) -> Option<&RunStats> {
        self.stats.as_ref()
    }

    /// `true` once a run has completed and persisted its watermark.
    pub fn is_finished(&self) -> bool {
        self.stats.is_some()
    }

    /// Run one dedup pass. `Ok(None)` means the folder has no `maildir`
    /// subtree and was skipped.
    pub fn run(&mut self) -> Result<Option<RunStats>> {
        let span = self.span.clone();
        let _guard = span.enter();
        info!("Starting");
        let start = Instant::now();

        let maildir = self.maildir();
        if !maildir.is_dir() {
            error!("No such directory: {}", maildir.display());
            return Ok(None);
        }

        let store = ContentStore::open(self.store_root())?;
        let watermark = watermark::read_watermark(store.root(), self.options.safety_margin);

        let scanner = Scanner::new(DedupEngine::new(&store, &self.hasher));
        let stats = scanner.scan(&maildir, watermark)?;

        watermark::write_watermark(store.root(), SystemTime::now())?;
        self.stats = Some(stats);

        info!(
            elapsed = ?start.elapsed(),
            %stats,
            "Finished. {} files deduplicated.",
            stats.dedup
        );
        Ok(Some(stats))
    }
}

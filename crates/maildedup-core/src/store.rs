/// Content-addressed store of canonical message entries.
///
/// Layout under the store root (`<folder>/dedup`):
///
/// ```text
/// <root>/
///   a/b/c/abc…  (full 128-char SHA-512 hex digest)
/// ```
///
/// Every canonical entry is a hard link to a message file, so the store
/// costs directory entries, not data. Entries are created on first sight of
/// a fingerprint and are never removed by this crate.
///
/// All mutating operations tolerate an external actor (a concurrent run, or
/// the mail system delivering into the same tree) having done the same work
/// first: shard creation treats an existing directory as success, and
/// [`ContentStore::register`] reports a lost race instead of failing.
use crate::error::{DedupError, Result};
use crate::hasher::Fingerprint;
use std::fs;
use std::io;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

/// Identity of the inode behind a path: `(device, inode number)`.
///
/// Two paths with equal `InodeId` are the same hard-link set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InodeId {
    pub dev: u64,
    pub ino: u64,
}

impl InodeId {
    pub fn of(meta: &fs::Metadata) -> Self {
        Self {
            dev: meta.dev(),
            ino: meta.ino(),
        }
    }

    /// `lstat` the path and return its identity.
    pub fn of_path(path: &Path) -> Result<Self> {
        fs::symlink_metadata(path)
            .map(|m| Self::of(&m))
            .map_err(|e| DedupError::io(path, e))
    }
}

/// Prefix of the temporary link used while atomically replacing a message.
const RELINK_PREFIX: &str = ".maildedup-relink";

#[derive(Debug, Clone)]
pub struct ContentStore {
    root: PathBuf,
}

impl ContentStore {
    /// A handle on an existing store root. Nothing is created.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Open the store at `root`, creating the root directory if absent.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::new(root);
        create_dir_idempotent(&store.root, false)?;
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<h0>/<h1>/<h2>` for the given fingerprint.
    pub fn shard_dir(&self, fp: &Fingerprint) -> PathBuf {
        self.root.join(fp.shard())
    }

    /// `<root>/<h0>/<h1>/<h2>/<digest>` — where the canonical entry lives.
    pub fn entry_path(&self, fp: &Fingerprint) -> PathBuf {
        self.shard_dir(fp).join(fp.as_str())
    }

    /// Create the shard directory tree for `fp`. Existing directories are fine.
    pub fn ensure_shard(&self, fp: &Fingerprint) -> Result<()> {
        create_dir_idempotent(&self.shard_dir(fp), true)
    }

    /// The inode of the canonical entry for `fp`, or `None` if there is none yet.
    pub fn lookup(&self, fp: &Fingerprint) -> Result<Option<InodeId>> {
        let entry = self.entry_path(fp);
        match fs::symlink_metadata(&entry) {
            Ok(meta) => Ok(Some(InodeId::of(&meta))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DedupError::io(entry, e)),
        }
    }

    /// `true` if a canonical entry exists for `fp`.
    pub fn exists(&self, fp: &Fingerprint) -> Result<bool> {
        Ok(self.lookup(fp)?.is_some())
    }

    /// Make `path` the canonical entry for `fp` by hard-linking it into the store.
    ///
    /// Returns `Ok(false)` without touching anything if an entry appeared
    /// for `fp` in the meantime; the caller should then treat the file as a
    /// candidate for [`ContentStore::relink`].
    pub fn register(&self, path: &Path, fp: &Fingerprint) -> Result<bool> {
        let entry = self.entry_path(fp);
        match fs::hard_link(path, &entry) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(DedupError::io(entry, e)),
        }
    }

    /// Replace `path` with a hard link to the canonical entry for `fp`.
    ///
    /// The new link is made next to `path` under a hidden temporary name and
    /// renamed over it, so the message stays reachable under its own name
    /// throughout. The temporary name does not depend on the message name,
    /// so names already at the filesystem's length limit relink too.
    pub fn relink(&self, path: &Path, fp: &Fingerprint) -> Result<()> {
        let entry = self.entry_path(fp);
        let staging = staging_path(path);

        // Left over from an interrupted run.
        match fs::remove_file(&staging) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(DedupError::io(&staging, e)),
        }

        fs::hard_link(&entry, &staging).map_err(|e| DedupError::io(&staging, e))?;
        if let Err(e) = fs::rename(&staging, path) {
            let _ = fs::remove_file(&staging);
            return Err(DedupError::io(path, e));
        }
        Ok(())
    }
}

/// `<dir>/.maildedup-relink.<pid>` — hidden so scanners and mail clients skip it.
///
/// One run relinks one file at a time, so the pid alone keeps concurrent
/// runs on the same directory apart.
fn staging_path(path: &Path) -> PathBuf {
    path.with_file_name(format!("{RELINK_PREFIX}.{}", std::process::id()))
}

fn create_dir_idempotent(dir: &Path, recursive: bool) -> Result<()> {
    let res = if recursive {
        fs::create_dir_all(dir)
    } else {
        fs::create_dir(dir)
    };
    match res {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        Err(e) => Err(DedupError::io(dir, e)),
    }
}

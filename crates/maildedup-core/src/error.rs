/// Error taxonomy for the dedup engine.
///
/// Only genuinely fatal conditions are represented here. A mail folder
/// without a `maildir` subtree, a missing or corrupt watermark file, and an
/// already-existing shard directory are all handled where they occur and
/// never surface as errors.
use std::io;
use std::path::{Path, PathBuf};

/// Convenience alias used throughout the core crate.
pub type Result<T> = std::result::Result<T, DedupError>;

#[derive(Debug, thiserror::Error)]
pub enum DedupError {
    /// The root mail folder handed to [`crate::MaildirDedup::new`] does not exist.
    #[error("no such folder: {}", .0.display())]
    NoSuchFolder(PathBuf),

    /// An I/O failure while hashing, linking, or persisting the watermark.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A directory listing failed part-way through.
    #[error("failed to list {}: {source}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: jwalk::Error,
    },
}

impl DedupError {
    /// Attach `path` to a raw `io::Error`.
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

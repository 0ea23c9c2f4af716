/// Dedup decision engine — what to do with one message file.
///
/// For a file whose mtime is not before the floor:
///
/// | canonical entry for its fingerprint | action                  | outcome   |
/// |-------------------------------------|-------------------------|-----------|
/// | none                                | register file as entry  | `Dedup`   |
/// | same inode as the file              | nothing                 | `Already` |
/// | different inode                     | relink file onto entry  | `New`     |
///
/// "Same inode" is compared by `(dev, ino)`, never by path: a file reached
/// through any name in the hard-link set is already deduplicated.
use crate::error::{DedupError, Result};
use crate::hasher::{ContentHasher, Fingerprint};
use crate::stats::Outcome;
use crate::store::{ContentStore, InodeId};
use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;
use tracing::trace;

pub struct DedupEngine<'a, H: ContentHasher> {
    store: &'a ContentStore,
    hasher: &'a H,
}

impl<'a, H: ContentHasher> DedupEngine<'a, H> {
    pub fn new(store: &'a ContentStore, hasher: &'a H) -> Self {
        Self { store, hasher }
    }

    pub fn store(&self) -> &ContentStore {
        self.store
    }

    /// Decide and apply the outcome for `path`.
    ///
    /// Files modified strictly before `mtime_floor` are neither hashed nor
    /// touched. Any I/O failure propagates unchanged.
    pub fn process(&self, path: &Path, mtime_floor: SystemTime) -> Result<Outcome> {
        let meta = fs::symlink_metadata(path).map_err(|e| DedupError::io(path, e))?;
        let modified = meta.modified().map_err(|e| DedupError::io(path, e))?;
        if modified < mtime_floor {
            trace!(path = %path.display(), "mtime before watermark");
            return Ok(Outcome::MtimeSkipped);
        }
        let inode = InodeId::of(&meta);

        let fp = self.hasher.fingerprint(path)?;
        self.store.ensure_shard(&fp)?;

        let canonical = match self.store.lookup(&fp)? {
            Some(canonical) => canonical,
            None => {
                if self.store.register(path, &fp)? {
                    trace!(path = %path.display(), %fp, "registered canonical entry");
                    return Ok(Outcome::Dedup);
                }
                self.canonical_after_lost_race(&fp)?
            }
        };

        self.settle(path, inode, canonical, &fp)
    }

    /// Another actor registered `fp` between our lookup and our link; read
    /// back the entry it made.
    fn canonical_after_lost_race(&self, fp: &Fingerprint) -> Result<InodeId> {
        match self.store.lookup(fp)? {
            Some(canonical) => Ok(canonical),
            None => Err(DedupError::io(
                self.store.entry_path(fp),
                io::Error::new(
                    io::ErrorKind::NotFound,
                    "canonical entry vanished after failed registration",
                ),
            )),
        }
    }

    /// `path` (with inode `inode`) against an existing canonical entry.
    fn settle(
        &self,
        path: &Path,
        inode: InodeId,
        canonical: InodeId,
        fp: &Fingerprint,
    ) -> Result<Outcome> {
        if canonical == inode {
            return Ok(Outcome::Already);
        }
        self.store.relink(path, fp)?;
        trace!(path = %path.display(), %fp, "relinked to canonical entry");
        Ok(Outcome::New)
    }
}

/// Run statistics — outcome counters returned by each level of the engine.
///
/// Every level (file, directory, folder, invocation) returns its own
/// `RunStats` value and the caller merges it upward, so no counter is ever
/// shared by reference across calls.
use serde::Serialize;
use std::fmt;
use std::ops::{Add, AddAssign};

/// What the decision engine did with a single message file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// A previously distinct copy was collapsed onto the existing canonical entry.
    New,
    /// The file became the canonical entry for its fingerprint.
    Dedup,
    /// The file already shares the canonical entry's inode; nothing to do.
    Already,
    /// The file's mtime is before the watermark; it was neither hashed nor touched.
    MtimeSkipped,
}

impl Outcome {
    /// Stable lowercase key, matching the JSON field names of [`RunStats`].
    pub fn key(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Dedup => "dedup",
            Self::Already => "already",
            Self::MtimeSkipped => "mtime_skipped",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Counters accumulated over one directory, one folder, or a whole invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub new: u64,
    pub dedup: u64,
    pub already: u64,
    pub mtime_skipped: u64,
    /// Message directories skipped wholesale because their own mtime is
    /// before the watermark. Their files are not counted individually.
    pub dirs_skipped: u64,
}

impl RunStats {
    /// Stats holding a single file outcome.
    pub fn from_outcome(outcome: Outcome) -> Self {
        let mut stats = Self::default();
        stats.record(outcome);
        stats
    }

    /// Count one file outcome.
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::New => self.new += 1,
            Outcome::Dedup => self.dedup += 1,
            Outcome::Already => self.already += 1,
            Outcome::MtimeSkipped => self.mtime_skipped += 1,
        }
    }

    /// Sum another set of counters into this one, key by key.
    pub fn merge(&mut self, other: &RunStats) {
        self.new += other.new;
        self.dedup += other.dedup;
        self.already += other.already;
        self.mtime_skipped += other.mtime_skipped;
        self.dirs_skipped += other.dirs_skipped;
    }

    /// Number of files that were examined at all (hashed or mtime-skipped).
    pub fn files_seen(&self) -> u64 {
        self.new + self.dedup + self.already + self.mtime_skipped
    }
}

impl Add for RunStats {
    type Output = RunStats;

    fn add(mut self, rhs: RunStats) -> RunStats {
        self.merge(&rhs);
        self
    }
}

impl AddAssign for RunStats {
    fn add_assign(&mut self, rhs: RunStats) {
        self.merge(&rhs);
    }
}

impl std::iter::Sum for RunStats {
    fn sum<I: Iterator<Item = RunStats>>(iter: I) -> Self {
        iter.fold(RunStats::default(), Add::add)
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "new={} dedup={} already={} mtime_skipped={} dirs_skipped={}",
            self.new, self.dedup, self.already, self.mtime_skipped, self.dirs_skipped
        )
    }
}

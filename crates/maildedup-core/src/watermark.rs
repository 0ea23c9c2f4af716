/// Watermark persistence — the "last successful run" timestamp.
///
/// Stored as `<store_root>/last_timestamp`, a plain-text decimal number of
/// seconds since the Unix epoch (fractional part allowed). On read, a fixed
/// safety margin is subtracted so files stamped right at the boundary of the
/// previous run, or by a slightly skewed clock, get one more look.
use crate::error::{DedupError, Result};
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::debug;

/// File name of the watermark inside the store root.
pub const WATERMARK_FILE: &str = "last_timestamp";

/// Subtracted from the stored watermark before use.
///
/// Kept at one hour; exposed through [`crate::DedupOptions`] as a tunable.
pub const SAFETY_MARGIN: Duration = Duration::from_secs(60 * 60);

pub fn watermark_path(store_root: &Path) -> PathBuf {
    store_root.join(WATERMARK_FILE)
}

/// The stored watermark minus `margin`, or the epoch if the file is missing,
/// unreadable, or does not hold a valid timestamp.
pub fn read_watermark(store_root: &Path, margin: Duration) -> SystemTime {
    let path = watermark_path(store_root);
    let stored = match fs::read_to_string(&path) {
        Ok(text) => parse_timestamp(&text),
        Err(e) => {
            debug!("No usable watermark at {}: {e}", path.display());
            None
        }
    };
    match stored {
        Some(at) => {
            let effective = at
                .checked_sub(margin)
                .filter(|t| *t >= UNIX_EPOCH)
                .unwrap_or(UNIX_EPOCH);
            debug!(
                "Watermark {} (effective {})",
                display_time(at),
                display_time(effective)
            );
            effective
        }
        None => UNIX_EPOCH,
    }
}

/// Persist `at` as the new watermark.
pub fn write_watermark(store_root: &Path, at: SystemTime) -> Result<()> {
    let path = watermark_path(store_root);
    fs::write(&path, format_timestamp(at)).map_err(|e| DedupError::io(&path, e))
}

/// Parse a decimal Unix timestamp. Rejects negative, non-finite, and
/// non-numeric input.
pub fn parse_timestamp(text: &str) -> Option<SystemTime> {
    let secs: f64 = text.trim().parse().ok()?;
    if !secs.is_finite() || secs < 0.0 {
        return None;
    }
    let offset = Duration::try_from_secs_f64(secs).ok()?;
    UNIX_EPOCH.checked_add(offset)
}

/// Seconds since the epoch with microsecond precision, e.g. `1700000000.250000`.
pub fn format_timestamp(at: SystemTime) -> String {
    let secs = at
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0);
    format!("{secs:.6}")
}

fn display_time(at: SystemTime) -> String {
    DateTime::<Local>::from(at).format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_means_epoch() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(read_watermark(tmp.path(), SAFETY_MARGIN), UNIX_EPOCH);
    }

    #[test]
    fn corrupt_file_means_epoch() {
        let tmp = TempDir::new().unwrap();
        fs::write(watermark_path(tmp.path()), "not a number").unwrap();
        assert_eq!(read_watermark(tmp.path(), SAFETY_MARGIN), UNIX_EPOCH);

        fs::write(watermark_path(tmp.path()), "").unwrap();
        assert_eq!(read_watermark(tmp.path(), SAFETY_MARGIN), UNIX_EPOCH);

        fs::write(watermark_path(tmp.path()), "-5").unwrap();
        assert_eq!(read_watermark(tmp.path(), SAFETY_MARGIN), UNIX_EPOCH);
    }

    #[test]
    fn margin_is_subtracted_on_read() {
        let tmp = TempDir::new().unwrap();
        fs::write(watermark_path(tmp.path()), "1700003600.5\n").unwrap();
        let wm = read_watermark(tmp.path(), SAFETY_MARGIN);
        assert_eq!(wm, UNIX_EPOCH + Duration::from_secs_f64(1_700_000_000.5));
    }

    /// A stored value smaller than the margin clamps to the epoch.
    #[test]
    fn margin_never_goes_below_epoch() {
        let tmp = TempDir::new().unwrap();
        fs::write(watermark_path(tmp.path()), "10").unwrap();
        assert_eq!(read_watermark(tmp.path(), SAFETY_MARGIN), UNIX_EPOCH);
    }

    #[test]
    fn written_value_reads_back_within_microseconds() {
        let tmp = TempDir::new().unwrap();
        let now = SystemTime::now();
        write_watermark(tmp.path(), now).unwrap();

        let back = read_watermark(tmp.path(), Duration::ZERO);
        let diff = match back.duration_since(now) {
            Ok(d) => d,
            Err(e) => e.duration(),
        };
        assert!(diff <= Duration::from_micros(2), "drifted by {diff:?}");
    }

    #[test]
    fn format_is_plain_decimal() {
        let at = UNIX_EPOCH + Duration::from_millis(1_700_000_000_250);
        assert_eq!(format_timestamp(at), "1700000000.250000");
        assert_eq!(parse_timestamp("1700000000.25"), Some(at));
    }
}

/// Log output of a folder run, captured through a real `tracing` subscriber.
///
/// The run's observable contract includes its log lines: a folder without a
/// `maildir` subtree is reported at `ERROR`, and a completed run states how
/// many files were deduplicated.
use maildedup_core::{DedupOptions, MaildirDedup};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tracing::Level;

// ── Helpers ──────────────────────────────────────────────────────────────────

/// In-memory log sink shared between the subscriber and the test.
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Construct and run the engine for `folder` with logging captured.
fn run_logged(folder: &Path) -> String {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_max_level(Level::INFO)
        .with_ansi(false)
        .without_time()
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        MaildirDedup::new(folder, DedupOptions::default())
            .unwrap()
            .run()
            .unwrap();
    });
    captured.text()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn missing_maildir_is_logged_as_error() {
    let tmp = TempDir::new().unwrap();

    let log = run_logged(tmp.path());

    let line = log
        .lines()
        .find(|l| l.contains("No such directory"))
        .unwrap_or_else(|| panic!("no error line in:\n{log}"));
    assert!(line.contains("ERROR"), "not logged at ERROR: {line}");
    assert!(line.contains("maildir"), "path missing: {line}");
    assert!(!log.contains("Finished."), "skipped folder must not finish:\n{log}");
}

#[test]
fn finished_line_reports_dedup_count() {
    let tmp = TempDir::new().unwrap();
    let cur = tmp.path().join("maildir/INBOX/cur");
    fs::create_dir_all(&cur).unwrap();
    fs::write(cur.join("1"), "one").unwrap();
    fs::write(cur.join("2"), "one").unwrap();
    fs::write(cur.join("3"), "two").unwrap();

    let log = run_logged(tmp.path());

    assert!(log.contains("Starting"), "missing start notice:\n{log}");
    assert!(
        log.contains("Finished. 2 files deduplicated."),
        "missing finish notice:\n{log}"
    );
    let folder = tmp.path().display().to_string();
    assert!(log.contains(&folder), "folder span missing:\n{log}");
}

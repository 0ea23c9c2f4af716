/// Folder discovery — which mail folders a run covers.
///
/// Command-line folders win; otherwise the settings file's list is used.
/// Every entry is a glob pattern expanded here, before the engine sees it.
use crate::settings::Settings;
use std::path::PathBuf;
use tracing::{debug, warn};

/// The folder patterns for this invocation.
pub fn discover(cli: &[String], settings: &Settings) -> Vec<String> {
    if cli.is_empty() {
        settings.folders.clone()
    } else {
        cli.to_vec()
    }
}

/// Expand each pattern with `glob`, keeping pattern order and the matcher's
/// (alphabetical) order within a pattern.
///
/// A pattern that matches nothing contributes nothing. An invalid pattern
/// or an unreadable match is logged and skipped.
pub fn expand(patterns: &[String]) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for pattern in patterns {
        let paths = match glob::glob(pattern) {
            Ok(paths) => paths,
            Err(e) => {
                warn!("Invalid folder pattern '{pattern}': {e}");
                continue;
            }
        };
        let before = out.len();
        for entry in paths {
            match entry {
                Ok(path) => out.push(path),
                Err(e) => warn!("Skipping unreadable match of '{pattern}': {e}"),
            }
        }
        if out.len() == before {
            debug!("Pattern '{pattern}' matched no folders");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn cli_folders_take_precedence() {
        let settings = Settings {
            folders: strings(&["/from/settings"]),
            log: None,
        };
        assert_eq!(discover(&strings(&["/from/cli"]), &settings), strings(&["/from/cli"]));
        assert_eq!(discover(&[], &settings), strings(&["/from/settings"]));
    }

    #[test]
    fn expands_globs_in_order() {
        let tmp = TempDir::new().unwrap();
        for name in ["bob", "alice", "carol"] {
            fs::create_dir(tmp.path().join(name)).unwrap();
        }
        let base = tmp.path().display().to_string();
        let patterns = vec![format!("{base}/carol"), format!("{base}/[ab]*")];

        let expanded = expand(&patterns);
        assert_eq!(
            expanded,
            vec![
                tmp.path().join("carol"),
                tmp.path().join("alice"),
                tmp.path().join("bob"),
            ]
        );
    }

    #[test]
    fn unmatched_and_invalid_patterns_are_dropped() {
        let tmp = TempDir::new().unwrap();
        let base = tmp.path().display().to_string();
        let patterns = vec![format!("{base}/nobody"), "[".to_string()];
        assert!(expand(&patterns).is_empty());
    }
}

/// Settings file — the fallback source of folders and the log sink.
///
/// ```toml
/// folders = ["/srv/mail/alice", "/srv/mail/bob*"]
/// log = "stream"
/// ```
use anyhow::Context;
use maildedup_core::logging::LogSink;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Folder patterns used when none are given on the command line.
    pub folders: Vec<String>,
    /// Log sink; `syslog` when unset.
    pub log: Option<LogSink>,
}

impl Settings {
    /// Load settings from `path`. A missing file yields the defaults; an
    /// unreadable or malformed one is an error.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("reading settings {}", path.display()))
            }
        };
        Self::parse(&text).with_context(|| format!("parsing settings {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

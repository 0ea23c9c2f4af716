/// Log sink selection.
///
/// The core only ever emits `tracing` events; which sink receives them is a
/// value chosen by the front end and handed to its subscriber setup, so no
/// part of the engine reaches for process-wide logger state.
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Where log records go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSink {
    /// The local syslog daemon via `/dev/log`. Suits cron jobs.
    #[default]
    Syslog,
    /// Standard error. Suits interactive runs and tests.
    Stream,
}

impl LogSink {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Syslog => "syslog",
            Self::Stream => "stream",
        }
    }
}

impl fmt::Display for LogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogSink {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "syslog" => Ok(Self::Syslog),
            "stream" | "stderr" => Ok(Self::Stream),
            other => Err(format!(
                "unknown log sink '{other}' (expected 'syslog' or 'stream')"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_syslog() {
        assert_eq!(LogSink::default(), LogSink::Syslog);
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("Syslog".parse::<LogSink>(), Ok(LogSink::Syslog));
        assert_eq!("stream".parse::<LogSink>(), Ok(LogSink::Stream));
        assert_eq!("STDERR".parse::<LogSink>(), Ok(LogSink::Stream));
        assert!("journald".parse::<LogSink>().is_err());
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for sink in [LogSink::Syslog, LogSink::Stream] {
            assert_eq!(sink.to_string().parse::<LogSink>(), Ok(sink));
        }
    }
}

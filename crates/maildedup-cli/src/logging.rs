/// Subscriber installation for the chosen [`LogSink`].
///
/// `Stream` logs to stderr. `Syslog` sends one RFC 3164 datagram per event
/// to the local syslog socket; if that socket is unavailable (containers,
/// macOS without `/dev/log`) logging falls back to stderr.
use anyhow::anyhow;
use maildedup_core::logging::LogSink;
use std::io::{self, Write};
use std::os::unix::net::UnixDatagram;
use std::path::Path;
use std::sync::Arc;
use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Local syslog socket.
pub const SYSLOG_SOCKET: &str = "/dev/log";

/// Program name put in front of every syslog record.
pub const SYSLOG_IDENT: &str = "maildedup";

/// syslog facility `user`.
const FACILITY_USER: u8 = 1;

/// Install the global subscriber. Honours `RUST_LOG`; otherwise logs at
/// `info`, or `debug` when `verbose`.
pub fn init(sink: LogSink, verbose: bool) -> anyhow::Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let syslog = match sink {
        LogSink::Syslog => match SyslogWriter::connect(SYSLOG_SOCKET) {
            Ok(writer) => Some(writer),
            Err(e) => {
                eprintln!("maildedup: cannot open {SYSLOG_SOCKET} ({e}); logging to stderr");
                None
            }
        },
        LogSink::Stream => None,
    };

    let installed = match syslog {
        Some(writer) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false)
            .without_time()
            .with_target(false)
            .try_init(),
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .with_target(false)
            .try_init(),
    };
    installed.map_err(|e| anyhow!("failed to install log subscriber: {e}"))
}

/// `MakeWriter` that turns each formatted event into one syslog datagram.
#[derive(Clone)]
pub struct SyslogWriter {
    socket: Arc<UnixDatagram>,
    ident: &'static str,
}

impl SyslogWriter {
    pub fn connect(socket: impl AsRef<Path>) -> io::Result<Self> {
        let sock = UnixDatagram::unbound()?;
        sock.connect(socket)?;
        Ok(Self::from_socket(sock))
    }

    /// Wrap an already connected datagram socket.
    pub fn from_socket(socket: UnixDatagram) -> Self {
        Self {
            socket: Arc::new(socket),
            ident: SYSLOG_IDENT,
        }
    }

    fn record(&self, severity: u8) -> SyslogRecord {
        SyslogRecord {
            socket: Arc::clone(&self.socket),
            ident: self.ident,
            severity,
            buf: Vec::with_capacity(256),
        }
    }
}

impl<'a> MakeWriter<'a> for SyslogWriter {
    type Writer = SyslogRecord;

    fn make_writer(&'a self) -> Self::Writer {
        self.record(severity(&Level::INFO))
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        self.record(severity(meta.level()))
    }
}

/// Buffers one formatted event; the datagram is sent when dropped.
pub struct SyslogRecord {
    socket: Arc<UnixDatagram>,
    ident: &'static str,
    severity: u8,
    buf: Vec<u8>,
}

impl SyslogRecord {
    /// `<PRI>ident: message` with the trailing newline stripped.
    fn datagram(&self) -> Vec<u8> {
        let pri = FACILITY_USER * 8 + self.severity;
        let msg = self.buf.strip_suffix(b"\n").unwrap_or(&self.buf);
        let mut out = format!("<{pri}>{}: ", self.ident).into_bytes();
        out.extend_from_slice(msg);
        out
    }
}

impl Write for SyslogRecord {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for SyslogRecord {
    fn drop(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        // Nowhere left to report a failed log write.
        let _ = self.socket.send(&self.datagram());
    }
}

/// syslog severity for a tracing level.
fn severity(level: &Level) -> u8 {
    match *level {
        Level::ERROR => 3,
        Level::WARN => 4,
        Level::INFO => 6,
        Level::DEBUG | Level::TRACE => 7,
    }
}

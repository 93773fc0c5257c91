//! Tracing output routed to the game's log.
//!
//! The game hands the plugin a `log(type, message)` function at init. Every
//! formatted tracing event becomes one call, with the level mapped to the
//! game's message types. The subscriber is returned as a [`Dispatch`] so the
//! plugin can enter it per callback instead of installing a global default
//! that would outlive an unload.

use std::ffi::CString;
use std::io;

use tracing::{Dispatch, Level, Metadata};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

use crate::sdk::{
    SCS_LOG_TYPE_ERROR, SCS_LOG_TYPE_MESSAGE, SCS_LOG_TYPE_WARNING, scs_log_t, scs_log_type_t,
};

/// Environment variable holding the log filter directives
pub const LOG_ENV: &str = "ETS2_TRACKER_LOG";

const DEFAULT_FILTER: &str = "info";

/// Prefix that identifies the plugin's lines in the game log
const LINE_PREFIX: &str = "[ets2-tracker] ";

/// `MakeWriter` over the host's log function
#[derive(Clone, Copy)]
pub struct HostLog {
    log: scs_log_t,
}

impl HostLog {
    pub fn new(log: scs_log_t) -> Self {
        Self { log }
    }
}

/// Buffers one formatted event and hands it to the host when dropped
pub struct HostLogWriter {
    log: scs_log_t,
    kind: scs_log_type_t,
    buf: Vec<u8>,
}

impl HostLogWriter {
    fn emit(&mut self) {
        let Some(log) = self.log else {
            self.buf.clear();
            return;
        };

        while self.buf.last().is_some_and(|b| matches!(b, b'\n' | b'\r')) {
            self.buf.pop();
        }
        if self.buf.is_empty() {
            return;
        }

        let mut line = Vec::with_capacity(LINE_PREFIX.len() + self.buf.len());
        line.extend_from_slice(LINE_PREFIX.as_bytes());
        line.extend(self.buf.drain(..).filter(|&b| b != 0));

        if let Ok(message) = CString::new(line) {
            // SAFETY: the host keeps `log` valid between init and shutdown,
            // which bounds the lifetime of the dispatcher owning this writer
            unsafe { log(self.kind, message.as_ptr()) };
        }
    }
}

impl io::Write for HostLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.emit();
        Ok(())
    }
}

impl Drop for HostLogWriter {
    fn drop(&mut self) {
        self.emit();
    }
}

fn log_type_for(level: &Level) -> scs_log_type_t {
    match *level {
        Level::ERROR => SCS_LOG_TYPE_ERROR,
        Level::WARN => SCS_LOG_TYPE_WARNING,
        _ => SCS_LOG_TYPE_MESSAGE,
    }
}

impl<'a> MakeWriter<'a> for HostLog {
    type Writer = HostLogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        HostLogWriter {
            log: self.log,
            kind: SCS_LOG_TYPE_MESSAGE,
            buf: Vec::new(),
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        HostLogWriter {
            log: self.log,
            kind: log_type_for(meta.level()),
            buf: Vec::new(),
        }
    }
}

/// Build the plugin's subscriber, writing to the host log
pub fn host_dispatch(log: scs_log_t) -> Dispatch {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(HostLog::new(log))
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .with_level(false)
        .finish();

    Dispatch::new(subscriber)
}

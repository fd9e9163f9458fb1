//! The run log: a human-readable, timestamped record of one export.
//!
//! Events are passed explicitly as `&mut dyn EventLog`; there is no process-wide log handle.
//! [`RunLog`] writes every event as one line, prefixed with a local `%Y-%m-%d %H:%M:%S`
//! timestamp, to an optional log file and to stdout. The file is flushed after every line.
//! [`MemoryLog`] keeps events in memory for tests and embedding.
//!
//! This is separate from the `log` facade diagnostics the crate emits at `debug` level; those
//! go wherever the binary's `env_logger` sends them.

use std::{fs::File, io::Write, path::Path};

use chrono::{DateTime, Local};
use strum::{Display, EnumString};

use crate::Result;

/// Timestamp format for each line of the run log
pub const LINE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Severity tag of a run log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum Level {
    /// Progress information
    #[strum(serialize = "[INFO]")]
    Info,
    /// The export finished
    #[strum(serialize = "[SUCCESS]")]
    Success,
    /// A fatal run condition
    #[strum(serialize = "[ERROR]")]
    Error,
}

/// Receiver of run log events.
pub trait EventLog {
    /// Record one event.
    ///
    /// # Errors
    /// Returns an error if the event cannot be persisted.
    fn record(&mut self, level: Level, message: &str) -> Result<()>;

    /// Shortcut for [`Level::Info`].
    ///
    /// # Errors
    /// See [`EventLog::record`].
    fn info(&mut self, message: &str) -> Result<()> {
        self.record(Level::Info, message)
    }
}

/// Format one run log line.
#[must_use]
pub fn format_line(timestamp: &DateTime<Local>, level: Level, message: &str) -> String {
    format!("{} {level} {message}", timestamp.format(LINE_TIMESTAMP_FORMAT))
}

/// Run log backed by a file and mirrored to stdout.
pub struct RunLog {
    file: Option<File>,
}

impl RunLog {
    /// Create (or truncate) the log file at `path`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Io`] if the file cannot be created.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        log::debug!("run log opened at {}", path.display());
        Ok(RunLog { file: Some(file) })
    }

    /// A run log that only writes to stdout.
    #[must_use]
    pub fn console() -> Self {
        RunLog { file: None }
    }
}

impl EventLog for RunLog {
    fn record(&mut self, level: Level, message: &str) -> Result<()> {
        let line = format_line(&Local::now(), level, message);

        println!("{line}");
        if let Some(file) = self.file.as_mut() {
            writeln!(file, "{line}")?;
            file.flush()?;
        }

        Ok(())
    }
}

/// Run log that keeps `(level, message)` pairs in memory.
#[derive(Debug, Default)]
pub struct MemoryLog {
    events: Vec<(Level, String)>,
}

impl MemoryLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        MemoryLog::default()
    }

    /// Every recorded event, oldest first.
    #[must_use]
    pub fn events(&self) -> &[(Level, String)] {
        &self.events
    }

    /// Messages only, oldest first.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.events.iter().map(|(_, message)| message.as_str())
    }
}

impl EventLog for MemoryLog {
    fn record(&mut self, level: Level, message: &str) -> Result<()> {
        self.events.push((level, message.to_string()));
        Ok(())
    }
}

use std::path::PathBuf;

use thiserror::Error;

macro_rules! unexpected_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Unexpected($msg.to_string())
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Unexpected(format!($fmt, $($arg)*))
    };
}

/// The error type for every fallible operation in this crate.
///
/// Two of the variants are *fatal run conditions*: [`Error::InvalidFormat`] and
/// [`Error::Unexpected`]. Once a run has started, every failure is folded into one
/// of these two and recorded in the active event log before it is returned to the
/// caller. The remaining variants can only happen before a run starts, so nothing
/// has been logged for them yet.
///
/// # Examples
///
/// ```rust,no_run
/// use asminspect::{Error, ExportConfig, Exporter};
///
/// let exporter = Exporter::new(ExportConfig::new("Assembly-CSharp.dll"));
/// match exporter.run(&mut std::io::stdout()) {
///     Ok(outcome) => println!("{outcome:?}"),
///     Err(Error::FileNotFound(path)) => eprintln!("missing: {}", path.display()),
///     Err(e) if e.is_fatal() => { /* already in the run log */ }
///     Err(e) => eprintln!("{e}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The input path does not exist.
    ///
    /// Reported by the pre-flight check, before any log or metadata handle is opened.
    #[error("File '{}' not found.", .0.display())]
    FileNotFound(PathBuf),

    /// The input is not a well-formed .NET assembly.
    #[error("Invalid assembly format.")]
    InvalidFormat,

    /// Any other failure while reading metadata or writing the report.
    #[error("Unexpected error: {0}")]
    Unexpected(String),

    /// I/O failure outside of a run, e.g. while creating the run log.
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns true for the two conditions that terminate a run once it has started.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::InvalidFormat | Error::Unexpected(_))
    }

    /// Folds any error into one of the fatal run conditions.
    ///
    /// Used once a run is underway: from that point an I/O failure is just another
    /// unexpected error.
    #[must_use]
    pub fn into_fatal(self) -> Self {
        match self {
            Error::Io(err) => Error::Unexpected(err.to_string()),
            Error::FileNotFound(path) => {
                unexpected_error!("file '{}' disappeared during the run", path.display())
            }
            fatal => fatal,
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        unexpected_error!(err)
    }
}

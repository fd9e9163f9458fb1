//! Run configuration and the file locations derived from it.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::Result;

/// Suffix appended to the assembly's file stem to name the XML report
pub const EXPORT_SUFFIX: &str = "_Export.xml";

/// Timestamp format embedded in run log file names
pub const LOG_FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Prefix of a command line option
const OPTION_PREFIX: &str = "--";

/// What a run does with namespaces.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NamespaceFilter {
    /// Export every exported type
    #[default]
    All,
    /// Export only types in this namespace
    Only(String),
    /// Do not export; list the exported namespaces instead
    Discover,
}

impl NamespaceFilter {
    /// Interpret the value of a `--namespace` option.
    ///
    /// `None` means the option was absent. `Some("")`, or a value that is itself a `--`
    /// option, means it was given without a namespace.
    #[must_use]
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            None => NamespaceFilter::All,
            Some(name) if name.is_empty() || name.starts_with(OPTION_PREFIX) => {
                NamespaceFilter::Discover
            }
            Some(name) => NamespaceFilter::Only(name.to_string()),
        }
    }

    /// The namespace constraint for report building, if any.
    #[must_use]
    pub fn constraint(&self) -> Option<&str> {
        match self {
            NamespaceFilter::Only(name) => Some(name),
            NamespaceFilter::All | NamespaceFilter::Discover => None,
        }
    }

    /// True for namespace discovery mode.
    #[must_use]
    pub fn is_discovery(&self) -> bool {
        matches!(self, NamespaceFilter::Discover)
    }
}

/// Everything one run needs to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    /// The assembly to inspect
    pub assembly_path: PathBuf,
    /// Namespace handling
    pub namespace: NamespaceFilter,
    /// Where run logs go; the executable's directory when unset
    pub log_dir: Option<PathBuf>,
}

impl ExportConfig {
    /// Configuration exporting every type of `assembly_path`.
    pub fn new(assembly_path: impl Into<PathBuf>) -> Self {
        ExportConfig {
            assembly_path: assembly_path.into(),
            namespace: NamespaceFilter::All,
            log_dir: None,
        }
    }

    /// Set the namespace handling.
    #[must_use]
    pub fn with_namespace(mut self, namespace: NamespaceFilter) -> Self {
        self.namespace = namespace;
        self
    }

    /// Set the run log directory.
    #[must_use]
    pub fn with_log_dir(mut self, log_dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(log_dir.into());
        self
    }

    /// File name of the assembly without its extension.
    #[must_use]
    pub fn assembly_stem(&self) -> String {
        self.assembly_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// `<assembly dir>/<stem>_Export.xml`
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        let dir = self.assembly_path.parent().unwrap_or_else(|| Path::new(""));
        dir.join(format!("{}{EXPORT_SUFFIX}", self.assembly_stem()))
    }

    /// `<log dir>/<stem>_<yyyyMMdd_HHmmss>.log`
    ///
    /// # Errors
    /// Returns [`crate::Error::Io`] if no log directory is configured and the location of the
    /// running executable cannot be determined.
    pub fn log_path(&self, started: &DateTime<Local>) -> Result<PathBuf> {
        let dir = match &self.log_dir {
            Some(dir) => dir.clone(),
            None => process_base_dir()?,
        };

        Ok(dir.join(format!(
            "{}_{}.log",
            self.assembly_stem(),
            started.format(LOG_FILE_TIMESTAMP_FORMAT)
        )))
    }
}

/// Directory containing the running executable.
///
/// # Errors
/// Returns [`crate::Error::Io`] if the executable path cannot be resolved.
pub fn process_base_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe()?;
    Ok(exe
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(".")))
}

//! One complete run: pre-flight, namespace discovery or report export, and error reporting.
//!
//! # Run sequence
//!
//! 1. The assembly path must be an existing file; otherwise [`Error::FileNotFound`] is
//!    returned before any resource is opened.
//! 2. In discovery mode the assembly is opened, its exported namespaces are printed and the
//!    run ends. No report and no log file are written; events go to the console only.
//! 3. Otherwise the run log is created, the assembly is opened, the report is built and the
//!    XML document is written next to the assembly.
//!
//! Any failure after step 1 is folded into [`Error::InvalidFormat`] or [`Error::Unexpected`],
//! recorded as an `[ERROR]` event and returned. The log file and the metadata source are owned
//! by the run and closed on every path.

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use chrono::Local;

use crate::{
    config::ExportConfig,
    filter::ExportFilter,
    metadata::{loader::CilAssemblySource, MetadataSource},
    namespaces::{discover_namespaces, write_namespace_listing},
    report::{xml::write_xml, ReportBuilder},
    runlog::{EventLog, Level, RunLog},
    Error, Result,
};

/// How a successful run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The report was written.
    Exported {
        /// The XML document
        output: PathBuf,
        /// The run log
        log: PathBuf,
    },
    /// Discovery mode listed these namespaces.
    Namespaces(Vec<String>),
}

/// Runs exports for one configuration.
#[derive(Debug, Clone)]
pub struct Exporter {
    config: ExportConfig,
}

impl Exporter {
    /// Create an exporter.
    #[must_use]
    pub fn new(config: ExportConfig) -> Self {
        Exporter { config }
    }

    /// Run against the assembly on disk, read through `dotscope`.
    ///
    /// `out` receives the namespace listing in discovery mode.
    ///
    /// # Errors
    /// See [`Exporter::run_with`].
    pub fn run(&self, out: &mut dyn Write) -> Result<Outcome> {
        self.run_with(CilAssemblySource::open, out)
    }

    /// Run with a custom metadata reader.
    ///
    /// `open` is called at most once, with the configured assembly path, after the pre-flight
    /// check has passed.
    ///
    /// # Errors
    /// - [`Error::FileNotFound`] if the assembly path is not an existing file
    /// - [`Error::Io`] if the run log cannot be created
    /// - [`Error::InvalidFormat`] or [`Error::Unexpected`] for failures during the run; these
    ///   have already been recorded in the run log when returned
    pub fn run_with<S, F>(&self, open: F, out: &mut dyn Write) -> Result<Outcome>
    where
        S: MetadataSource,
        F: FnOnce(&Path) -> Result<S>,
    {
        let path = &self.config.assembly_path;
        if !path.is_file() {
            return Err(Error::FileNotFound(path.clone()));
        }

        if self.config.namespace.is_discovery() {
            let mut log = RunLog::console();
            let result = discover(path, open, out);
            return report_failure(result.map(Outcome::Namespaces), &mut log);
        }

        let log_path = self.config.log_path(&Local::now())?;
        let mut log = RunLog::create(&log_path)?;

        let result = self.export(open, &mut log).and_then(|output| {
            log.record(
                Level::Success,
                &format!("Export complete. XML saved to '{}'", output.display()),
            )?;
            log.info(&format!("Log file saved as '{}'", log_path.display()))?;
            Ok(Outcome::Exported {
                output,
                log: log_path.clone(),
            })
        });

        report_failure(result, &mut log)
    }

    fn export<S, F>(&self, open: F, log: &mut dyn EventLog) -> Result<PathBuf>
    where
        S: MetadataSource,
        F: FnOnce(&Path) -> Result<S>,
    {
        let path = &self.config.assembly_path;
        log.info(&format!("Reading assembly: {}", path.display()))?;
        let source = open(path)?;

        let filter = ExportFilter::new(self.config.namespace.constraint());
        let report = ReportBuilder::new(filter, log).build(&source)?;

        let output = self.config.output_path();
        write_xml(&report, &output)?;
        Ok(output)
    }
}

fn discover<S, F>(path: &Path, open: F, out: &mut dyn Write) -> Result<Vec<String>>
where
    S: MetadataSource,
    F: FnOnce(&Path) -> Result<S>,
{
    let source = open(path)?;
    let namespaces = discover_namespaces(&source)?;
    write_namespace_listing(out, &namespaces)?;
    Ok(namespaces)
}

/// Record a failed run as a fatal `[ERROR]` event and hand the error back.
fn report_failure(result: Result<Outcome>, log: &mut dyn EventLog) -> Result<Outcome> {
    result.map_err(|err| {
        let fatal = err.into_fatal();
        if let Err(log_err) = log.record(Level::Error, &fatal.to_string()) {
            log::warn!("could not record failure in the run log: {log_err}");
        }
        fatal
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::{
        config::NamespaceFilter,
        metadata::{AssemblyMetadata, ModuleMetadata, TypeMetadata, Visibility},
    };

    fn game() -> AssemblyMetadata {
        AssemblyMetadata::new("Game").with_module(
            ModuleMetadata::new("Game.dll")
                .with_type(TypeMetadata::new("Game", "Player", Visibility::Public))
                .with_type(TypeMetadata::new("Game.UI", "Menu", Visibility::Public)),
        )
    }

    struct Fixture {
        dir: tempfile::TempDir,
        assembly: PathBuf,
        logs: PathBuf,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let assembly = dir.path().join("Game.dll");
        fs::write(&assembly, b"MZ").unwrap();
        let logs = dir.path().join("logs");
        fs::create_dir(&logs).unwrap();
        Fixture {
            dir,
            assembly,
            logs,
        }
    }

    #[test]
    fn missing_file_opens_nothing() {
        let fixture = fixture();
        let config = ExportConfig::new(fixture.dir.path().join("Missing.dll"))
            .with_log_dir(&fixture.logs);

        let mut opened = false;
        let result = Exporter::new(config).run_with(
            |_| {
                opened = true;
                Ok(game())
            },
            &mut Vec::new(),
        );

        assert!(matches!(result, Err(Error::FileNotFound(_))));
        assert!(!opened);
        assert_eq!(fs::read_dir(&fixture.logs).unwrap().count(), 0);
    }

    #[test]
    fn directory_is_not_an_assembly() {
        let fixture = fixture();
        let config = ExportConfig::new(fixture.dir.path()).with_log_dir(&fixture.logs);

        let result = Exporter::new(config).run_with(|_| Ok(game()), &mut Vec::new());

        assert!(matches!(result, Err(Error::FileNotFound(_))));
        assert_eq!(fs::read_dir(&fixture.logs).unwrap().count(), 0);
    }

    #[test]
    fn export_writes_report_and_log() {
        let fixture = fixture();
        let config = ExportConfig::new(&fixture.assembly).with_log_dir(&fixture.logs);

        let outcome = Exporter::new(config)
            .run_with(|_| Ok(game()), &mut Vec::new())
            .unwrap();

        let Outcome::Exported { output, log } = outcome else {
            panic!("expected an export");
        };
        assert_eq!(output, fixture.dir.path().join("Game_Export.xml"));
        assert!(log.starts_with(&fixture.logs));

        let xml = fs::read_to_string(&output).unwrap();
        assert!(xml.contains("FullName=\"Game.Player\""));
        assert!(xml.contains("FullName=\"Game.UI.Menu\""));

        let log_text = fs::read_to_string(&log).unwrap();
        let lines: Vec<_> = log_text.lines().collect();
        assert!(lines[0].contains("[INFO] Reading assembly: "));
        assert!(lines[1].ends_with("[INFO] Processing module: Game.dll"));
        assert!(lines[lines.len() - 2].contains("[SUCCESS] Export complete. XML saved to '"));
        assert!(lines[lines.len() - 1].contains("[INFO] Log file saved as '"));
    }

    #[test]
    fn discovery_writes_no_files() {
        let fixture = fixture();
        let config = ExportConfig::new(&fixture.assembly)
            .with_namespace(NamespaceFilter::Discover)
            .with_log_dir(&fixture.logs);

        let mut out = Vec::new();
        let outcome = Exporter::new(config)
            .run_with(|_| Ok(game()), &mut out)
            .unwrap();

        assert_eq!(
            outcome,
            Outcome::Namespaces(vec!["Game".to_string(), "Game.UI".to_string()])
        );
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Available namespaces:\n- Game\n- Game.UI\n"
        );
        assert_eq!(fs::read_dir(&fixture.logs).unwrap().count(), 0);
        assert!(!fixture.dir.path().join("Game_Export.xml").exists());
    }

    #[test]
    fn invalid_format_is_logged_and_no_report_is_written() {
        let fixture = fixture();
        let config = ExportConfig::new(&fixture.assembly).with_log_dir(&fixture.logs);

        let result = Exporter::new(config).run_with(
            |_| -> Result<AssemblyMetadata> { Err(Error::InvalidFormat) },
            &mut Vec::new(),
        );

        assert!(matches!(result, Err(Error::InvalidFormat)));
        assert!(!fixture.dir.path().join("Game_Export.xml").exists());

        let log_file = fs::read_dir(&fixture.logs)
            .unwrap()
            .next()
            .unwrap()
            .unwrap()
            .path();
        let log_text = fs::read_to_string(log_file).unwrap();
        assert!(log_text
            .lines()
            .last()
            .unwrap()
            .ends_with("[ERROR] Invalid assembly format."));
    }

    #[test]
    fn unexpected_errors_carry_their_message() {
        let fixture = fixture();
        let config = ExportConfig::new(&fixture.assembly).with_log_dir(&fixture.logs);

        let result = Exporter::new(config).run_with(
            |_| -> Result<AssemblyMetadata> { Err(std::io::Error::other("mmap failed").into()) },
            &mut Vec::new(),
        );

        let err = result.unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(err.to_string(), "Unexpected error: mmap failed");
    }
}

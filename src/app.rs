use std::path::PathBuf;

use clap::Parser;

use asminspect::{ExportConfig, NamespaceFilter};

/// Printed when no assembly path is given.
pub const USAGE: &str = "Usage: asminspect <path-to-assembly> [--namespace <namespaceName>]";

/// asminspect - export the public surface of a .NET assembly to XML
#[derive(Debug, Parser)]
#[command(name = "asminspect", version, about, long_about = None)]
pub struct Cli {
    /// Path to the .NET assembly file.
    #[arg(value_name = "FILE")]
    pub path: Option<PathBuf>,

    /// Export only this namespace. Without a value, or when followed by another `--` option,
    /// list the available namespaces instead.
    #[arg(
        long,
        value_name = "NAME",
        num_args = 0..=1,
        default_missing_value = "",
        allow_hyphen_values = true
    )]
    pub namespace: Option<String>,

    /// Directory for the run log (default: the directory of this executable).
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Enable verbose (debug-level) logging output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Translate the arguments into a run configuration. `None` if no assembly was given.
    pub fn export_config(&self) -> Option<ExportConfig> {
        let path = self.path.as_ref()?;
        let mut config = ExportConfig::new(path)
            .with_namespace(NamespaceFilter::from_arg(self.namespace.as_deref()));
        if let Some(dir) = &self.log_dir {
            config = config.with_log_dir(dir);
        }
        Some(config)
    }
}

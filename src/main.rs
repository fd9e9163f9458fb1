mod app;

use std::process::ExitCode;

use clap::Parser;

use asminspect::Exporter;

use crate::app::{Cli, USAGE};

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Diagnostics on stderr; --verbose enables debug; RUST_LOG overrides
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_module("asminspect", level)
        .filter_module("dotscope", level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();

    let Some(config) = cli.export_config() else {
        println!("{USAGE}");
        return Ok(ExitCode::SUCCESS);
    };

    let exporter = Exporter::new(config);
    match exporter.run(&mut std::io::stdout()) {
        Ok(outcome) => {
            log::debug!("run finished: {outcome:?}");
            Ok(ExitCode::SUCCESS)
        }
        // Fatal run errors are already in the run log
        Err(err) if err.is_fatal() => Ok(ExitCode::FAILURE),
        Err(err) => {
            println!("[ERROR] {err}");
            Ok(ExitCode::FAILURE)
        }
    }
}

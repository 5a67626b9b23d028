//! VPM listing builder CLI entrypoint.
//!
//! Builds `index.json` for a VPM package listing from a listing source
//! document. Progress is logged to stderr; the exit code is non-zero when the
//! build fails.

use camino::Utf8PathBuf;
use clap::Parser;
use std::error::Error as _;
use std::io::Write;
use vpm_listing_builder::cli::Cli;
use vpm_listing_builder::config::{BuildConfig, HostEnvironment};
use vpm_listing_builder::error::{BuilderError, Result};
use vpm_listing_builder::pipeline::run;

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);
    let mut stderr = std::io::stderr();
    let run_result = run_cli(&cli);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn init_logging(cli: &Cli) {
    let level = cli.build_args().log_level();
    if env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .format_target(false)
        .try_init()
        .is_err()
    {
        // A logger is already installed; keep it.
    }
}

fn run_cli(cli: &Cli) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let root = Utf8PathBuf::try_from(cwd).map_err(|e| BuilderError::Io(e.into_io_error()))?;
    let host = HostEnvironment::from_env();
    let config = BuildConfig::resolve(cli.build_args(), &host, &root);
    log::debug!("Resolved build configuration: {config:?}");

    let report = run(&config)?;
    log::info!(
        "Wrote {} package(s) to {}",
        report.package_count,
        report.listing_path
    );
    Ok(())
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, error_chain(&err));
            1
        }
    }
}

/// Render `err` followed by each of its causes.
fn error_chain(err: &BuilderError) -> String {
    let mut message = err.to_string();
    let mut cause = err.source();
    while let Some(inner) = cause {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        cause = inner.source();
    }
    message
}

fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

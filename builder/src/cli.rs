//! CLI argument definitions for the listing builder.
//!
//! This module defines the command-line interface using clap. It is kept
//! apart from the entrypoint so the binary stays focused on orchestration.

use crate::github::DEFAULT_API_URL;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use log::LevelFilter;

/// Default name of the listing source document.
pub const DEFAULT_SOURCE_FILENAME: &str = "source.json";

/// Build a VPM package listing from release archives.
#[derive(Parser, Debug)]
#[command(name = "vpm-listing-builder")]
#[command(version, about)]
#[command(long_about = concat!(
    "Build a VPM package listing from release archives.\n\n",
    "Reads a listing source document, collects candidate archive URLs from its ",
    "explicit package releases and from the releases of its GitHub repositories, ",
    "skips archives already present in the published listing, validates the rest, ",
    "and writes index.json into the publish directory.",
))]
#[command(after_help = concat!(
    "ENVIRONMENT:\n",
    "  GITHUB_ACTIONS            \"true\" marks a server build\n",
    "  GITHUB_TOKEN              Bearer token for GitHub requests in server builds\n",
    "  GITHUB_REPOSITORY_OWNER   Owner used to locate the published listing\n",
    "  GITHUB_REPOSITORY         owner/name used to locate the published listing\n",
    "  RUST_LOG                  Overrides the log filter\n\n",
    "EXAMPLES:\n",
    "  Build from ../package-index/source.json into ./docs:\n",
    "    $ vpm-listing-builder\n\n",
    "  Build from an explicit source folder:\n",
    "    $ vpm-listing-builder --source-folder ./listing --list-publish-directory ./site\n",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Build arguments (used when no subcommand is given).
    #[command(flatten)]
    pub build: BuildArgs,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build the repository listing (default when no subcommand given).
    BuildRepoListing(BuildArgs),

    /// Alias of build-repo-listing kept for existing workflows.
    BuildMultiPackageListing(BuildArgs),
}

/// Arguments for a listing build.
#[derive(Parser, Debug, Clone)]
pub struct BuildArgs {
    /// Directory to save the listing into [default: ./docs].
    #[arg(long, value_name = "DIR")]
    pub list_publish_directory: Option<Utf8PathBuf>,

    /// File name of the listing source document.
    #[arg(long, value_name = "FILE", default_value = DEFAULT_SOURCE_FILENAME)]
    pub source_filename: String,

    /// Folder holding the listing source [default: .. in server builds,
    /// ../package-index otherwise].
    #[arg(long, value_name = "DIR")]
    pub source_folder: Option<Utf8PathBuf>,

    /// URL of the published listing, typically
    /// `https://{owner}.github.io/{repo}/index.json` [default: computed from
    /// the GitHub environment in server builds].
    #[arg(long, value_name = "URL")]
    pub current_listing_url: Option<String>,

    /// Root of the GitHub REST API.
    #[arg(long, value_name = "URL", default_value = DEFAULT_API_URL)]
    pub github_api_url: String,

    /// Increase log verbosity (repeatable: -v, -vv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Only log warnings and errors.
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}

impl Cli {
    /// Arguments of the build to run, whichever form invoked it.
    #[must_use]
    pub fn build_args(&self) -> &BuildArgs {
        match &self.command {
            Some(Command::BuildRepoListing(args) | Command::BuildMultiPackageListing(args)) => {
                args
            }
            None => &self.build,
        }
    }
}

impl BuildArgs {
    /// Log filter selected by `-q` and `-v`.
    #[must_use]
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Warn;
        }
        match self.verbosity {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Crawl every configured root, extract, check integrity and report.
    Run(RunArgs),
    /// Check referential integrity across the catalog files under a directory.
    Integrity(IntegrityArgs),
    /// Read a checksum manifest and print the resolved entries.
    Manifest(ManifestArgs),
    /// Print the JSON Schema of the extracted metadata record.
    Schema,
}

/// Arguments for `harvest run`.
#[derive(Clone, Debug, Args)]
pub struct RunArgs {
    /// Append extracted records to this file as JSON lines
    #[arg(long)]
    pub records: Option<PathBuf>,

    /// Write the report here instead of stdout
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Repeat the cycle every SECS seconds until interrupted
    #[arg(long, value_name = "SECS")]
    pub daemon: Option<u64>,
}

/// Arguments for `harvest integrity`.
#[derive(Clone, Debug, Args)]
pub struct IntegrityArgs {
    /// Directory holding catalog files
    pub dir: PathBuf,

    /// Write the report here instead of stdout
    #[arg(long)]
    pub report: Option<PathBuf>,
}

/// Arguments for `harvest manifest`.
#[derive(Clone, Debug, Args)]
pub struct ManifestArgs {
    /// Manifest file
    pub file: PathBuf,

    /// Base directory for relative paths (defaults to the manifest's directory)
    #[arg(long)]
    pub base: Option<PathBuf>,
}

use std::path::PathBuf;

use clap::Parser;

pub mod global;
pub mod root_commands;

pub use global::GlobalFlags;
pub use root_commands::Commands;

/// Top-level CLI parser for the `harvest` binary.
#[derive(Debug, Parser)]
#[command(
    name = "harvest",
    version,
    about = "Crawl archive labels, extract metadata, check integrity and report"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to ./harvest.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            config: self.config.clone(),
            quiet: self.quiet,
            verbose: self.verbose,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use clap::{CommandFactory, Parser};

    use super::{Cli, Commands};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from(["harvest", "--config", "h.toml", "--verbose", "schema"])
            .expect("cli should parse");

        assert_eq!(cli.config.as_deref(), Some(Path::new("h.toml")));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Schema));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["harvest", "integrity", "catalog", "--config", "h.toml", "-q"])
            .expect("cli should parse");

        assert!(cli.quiet);
        assert_eq!(cli.global_flags().config.as_deref(), Some(Path::new("h.toml")));
        match cli.command {
            Commands::Integrity(args) => assert_eq!(args.dir, Path::new("catalog")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn run_accepts_outputs_and_daemon_interval() {
        let cli = Cli::try_parse_from([
            "harvest",
            "run",
            "--records",
            "records.jsonl",
            "--report",
            "report.txt",
            "--daemon",
            "60",
        ])
        .expect("cli should parse");

        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.records.as_deref(), Some(Path::new("records.jsonl")));
                assert_eq!(args.report.as_deref(), Some(Path::new("report.txt")));
                assert_eq!(args.daemon, Some(60));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn manifest_requires_a_file() {
        assert!(Cli::try_parse_from(["harvest", "manifest"]).is_err());
    }
}

//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Explore and recover historical URLs through the Wayback Machine.
///
/// Without a subcommand, waybackscan starts its interactive menu shell.
#[derive(Parser, Debug)]
#[command(name = "waybackscan")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan a single domain and exit
    Scan {
        /// Domain to scan (e.g., example.com)
        domain: String,

        /// File extensions to keep, comma-separated (default: the extensions file)
        #[arg(short, long, value_delimiter = ',')]
        extensions: Vec<String>,

        /// Skip Wayback snapshot verification for this run
        #[arg(long)]
        no_snapshots: bool,

        /// Download archived files for this run
        #[arg(long)]
        download: bool,
    },

    /// Scan every domain listed in a file and write a batch summary report
    Batch {
        /// Path to a file with one domain per line
        file: PathBuf,

        /// File extensions to keep, comma-separated (default: the extensions file)
        #[arg(short, long, value_delimiter = ',')]
        extensions: Vec<String>,

        /// Skip Wayback snapshot verification for this run
        #[arg(long)]
        no_snapshots: bool,

        /// Download archived files for this run
        #[arg(long)]
        download: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_no_args_selects_shell() {
        let args = Args::try_parse_from(["waybackscan"]).unwrap();
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        assert!(args.command.is_none());
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["waybackscan", "-v"]).unwrap();
        assert_eq!(args.verbose, 1);

        let args = Args::try_parse_from(["waybackscan", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);

        let args = Args::try_parse_from(["waybackscan", "--verbose", "--verbose"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_quiet_flag_sets_quiet() {
        let args = Args::try_parse_from(["waybackscan", "-q"]).unwrap();
        assert!(args.quiet);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        // --help causes early exit, so we check it returns an error with Help kind
        let result = Args::try_parse_from(["waybackscan", "--help"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_version_flag_shows_version() {
        let result = Args::try_parse_from(["waybackscan", "--version"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let result = Args::try_parse_from(["waybackscan", "--invalid-flag"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_cli_scan_requires_domain() {
        let result = Args::try_parse_from(["waybackscan", "scan"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_cli_scan_parses_domain() {
        let args = Args::try_parse_from(["waybackscan", "scan", "example.com"]).unwrap();
        match args.command {
            Some(Command::Scan {
                domain,
                extensions,
                no_snapshots,
                download,
            }) => {
                assert_eq!(domain, "example.com");
                assert!(extensions.is_empty());
                assert!(!no_snapshots);
                assert!(!download);
            }
            other => panic!("expected scan subcommand, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_scan_extensions_are_comma_split() {
        let args =
            Args::try_parse_from(["waybackscan", "scan", "example.com", "-e", "pdf,doc,xls"])
                .unwrap();
        match args.command {
            Some(Command::Scan { extensions, .. }) => {
                assert_eq!(extensions, vec!["pdf", "doc", "xls"]);
            }
            other => panic!("expected scan subcommand, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_scan_toggle_flags() {
        let args = Args::try_parse_from([
            "waybackscan",
            "scan",
            "example.com",
            "--no-snapshots",
            "--download",
        ])
        .unwrap();
        match args.command {
            Some(Command::Scan {
                no_snapshots,
                download,
                ..
            }) => {
                assert!(no_snapshots);
                assert!(download);
            }
            other => panic!("expected scan subcommand, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_batch_parses_file_path() {
        let args = Args::try_parse_from(["waybackscan", "batch", "domains.txt"]).unwrap();
        match args.command {
            Some(Command::Batch { file, .. }) => {
                assert_eq!(file, PathBuf::from("domains.txt"));
            }
            other => panic!("expected batch subcommand, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_batch_requires_file() {
        let result = Args::try_parse_from(["waybackscan", "batch"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}

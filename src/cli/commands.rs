//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// SOQL record extraction CLI
#[derive(Parser, Debug)]
#[command(name = "soql-extract")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short = 'C', long, global = true, default_value = "soql-extract.yaml")]
    pub config: PathBuf,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and report the connection status
    Check,

    /// Run a query, following pagination
    Query {
        /// SOQL query
        soql: String,

        /// Fetch everything in one call instead of page by page
        #[arg(long)]
        no_paginate: bool,

        /// Write records to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Count the records a query matches
    Count {
        /// SOQL query
        soql: String,
    },

    /// Run a query in LIMIT/OFFSET batches
    Batches {
        /// SOQL query
        soql: String,

        /// Records per batch (defaults to extract.batch_size)
        #[arg(long)]
        batch_size: Option<usize>,

        /// Write records to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one record per line)
    Json,
    /// Human-readable output
    Pretty,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_batches() {
        let cli = Cli::parse_from([
            "soql-extract",
            "-C",
            "prod.yaml",
            "batches",
            "SELECT Id FROM Account",
            "--batch-size",
            "500",
            "-o",
            "accounts.jsonl",
        ]);

        assert_eq!(cli.config, PathBuf::from("prod.yaml"));
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Batches {
                soql,
                batch_size,
                output,
            } => {
                assert_eq!(soql, "SELECT Id FROM Account");
                assert_eq!(batch_size, Some(500));
                assert_eq!(output, Some(PathBuf::from("accounts.jsonl")));
            }
            other => panic!("Expected Batches, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_query_defaults() {
        let cli = Cli::parse_from([
            "soql-extract",
            "query",
            "SELECT Id FROM Case",
            "-f",
            "pretty",
            "-v",
        ]);

        assert_eq!(cli.config, PathBuf::from("soql-extract.yaml"));
        assert_eq!(cli.format, OutputFormat::Pretty);
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Query {
                no_paginate: false,
                output: None,
                ..
            }
        ));
    }
}

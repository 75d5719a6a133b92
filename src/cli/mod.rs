//! CLI module
//!
//! Command-line interface for running extractions.
//!
//! # Commands
//!
//! - `check` - Log in and report the connection status
//! - `query` - Run a query with cursor pagination (or a full pull)
//! - `count` - Count the records a query matches
//! - `batches` - Run a query in `LIMIT`/`OFFSET` batches

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::{RecordSink, Runner};

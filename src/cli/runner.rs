//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::Config;
use crate::engine::{batch_observer, BatchEvent, ExtractionEngine, Extraction, Strategy};
use crate::error::{Error, Result, ResultExt};
use crate::query::preview;
use crate::session::SalesforceProvider;
use crate::types::Record;
use serde_json::{json, Value};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::{info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let config = Config::from_file(&self.cli.config)?;

        match &self.cli.command {
            Commands::Check => self.check(&config).await,
            Commands::Query {
                soql,
                no_paginate,
                output,
            } => {
                let strategy = if *no_paginate {
                    Strategy::FullPull
                } else {
                    Strategy::Cursor
                };
                self.extract(&config, soql, strategy, output.as_deref())
                    .await
            }
            Commands::Count { soql } => self.count(&config, soql).await,
            Commands::Batches {
                soql,
                batch_size,
                output,
            } => {
                let batch_size = batch_size.unwrap_or(config.extract.batch_size);
                self.extract(
                    &config,
                    soql,
                    Strategy::Offset { batch_size },
                    output.as_deref(),
                )
                .await
            }
        }
    }

    /// Build an engine for a config
    pub fn engine(config: &Config) -> ExtractionEngine<SalesforceProvider> {
        let provider = SalesforceProvider::new(config.credential_store(), &config.secret_id)
            .with_settings(config.salesforce.clone())
            .with_http_config(config.http_client_config());
        ExtractionEngine::new(provider).with_config(config.extract_config())
    }

    /// Log in and report status
    async fn check(&self, config: &Config) -> Result<()> {
        let mut engine = Self::engine(config);

        match engine.connect().await {
            Ok(()) => {
                let instance = engine
                    .session()
                    .map(|s| s.instance_url().to_string())
                    .unwrap_or_default();
                self.output_message(&json!({
                    "type": "CONNECTION_STATUS",
                    "connectionStatus": {
                        "status": "SUCCEEDED",
                        "message": format!("Connected to {instance}")
                    }
                }));
                engine.close().await
            }
            Err(e) => {
                self.output_message(&json!({
                    "type": "CONNECTION_STATUS",
                    "connectionStatus": {
                        "status": "FAILED",
                        "message": format!("Connection failed: {e}")
                    }
                }));
                Err(e)
            }
        }
    }

    /// Count records matching a query
    async fn count(&self, config: &Config, soql: &str) -> Result<()> {
        let mut engine = Self::engine(config);
        let result = engine.query_count(soql).await;
        let closed = engine.close().await;

        let count = result?;
        self.output_message(&json!({
            "type": "COUNT",
            "query": preview(soql),
            "count": count
        }));
        closed
    }

    /// Run an extraction, streaming batches to the sink
    async fn extract(
        &self,
        config: &Config,
        soql: &str,
        strategy: Strategy,
        output: Option<&Path>,
    ) -> Result<()> {
        let mut sink = RecordSink::open(output, self.cli.format)?;
        let mut engine = Self::engine(config);

        let result = {
            let mut observer = batch_observer(|event: &BatchEvent<'_>| {
                sink.write_records(event.records)?;
                Ok(())
            });
            engine.extract(soql, strategy, Some(&mut observer)).await
        };

        // Full pulls deliver no batches; their records are written here
        if let (Strategy::FullPull, Ok(extraction)) = (strategy, &result) {
            sink.write_records(&extraction.records)?;
        }

        let observer_failures = engine.stats().observer_failures;
        let duration_ms = engine.stats().duration_ms;
        let closed = engine.close().await;
        sink.finish()?;

        let extraction = result?;
        Self::summary(&extraction, duration_ms, observer_failures);
        closed?;

        if observer_failures > 0 {
            return Err(Error::Other(format!(
                "{observer_failures} batches could not be written"
            )));
        }
        match extraction.error {
            Some(e) => Err(Error::extraction(e)),
            None => Ok(()),
        }
    }

    /// Write the run summary to stderr
    fn summary(extraction: &Extraction, duration_ms: u64, observer_failures: usize) {
        let summary = json!({
            "type": "SUMMARY",
            "records": extraction.len(),
            "batches": extraction.batches,
            "total_count": extraction.total_count,
            "completed": extraction.completed,
            "error": extraction.error.as_ref().map(ToString::to_string),
            "observer_failures": observer_failures,
            "duration_ms": duration_ms
        });
        eprintln!("{summary}");
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Destination for extracted records
pub struct RecordSink {
    out: Box<dyn Write + Send>,
    format: OutputFormat,
    written: usize,
}

impl RecordSink {
    /// Open a file, or stdout when no path is given
    pub fn open(path: Option<&Path>, format: OutputFormat) -> Result<Self> {
        let out: Box<dyn Write + Send> = match path {
            Some(path) => {
                let file = File::create(path).map_err(|e| {
                    Error::config(format!(
                        "Failed to create output file '{}': {e}",
                        path.display()
                    ))
                })?;
                info!("Writing records to {}", path.display());
                Box::new(BufWriter::new(file))
            }
            None => Box::new(BufWriter::new(io::stdout())),
        };
        Ok(Self::new(out, format))
    }

    /// Wrap any writer
    pub fn new(out: Box<dyn Write + Send>, format: OutputFormat) -> Self {
        Self {
            out,
            format,
            written: 0,
        }
    }

    /// Write records, one JSON document each
    pub fn write_records(&mut self, records: &[Record]) -> Result<()> {
        for record in records {
            let line = match self.format {
                OutputFormat::Json => serde_json::to_string(record)?,
                OutputFormat::Pretty => serde_json::to_string_pretty(record)?,
            };
            writeln!(self.out, "{line}").context("Failed to write record")?;
            self.written += 1;
        }
        Ok(())
    }

    /// Records written so far
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush buffered output
    pub fn finish(mut self) -> Result<()> {
        self.out.flush().context("Failed to flush output").map_err(|e| {
            warn!("{e}");
            e
        })
    }
}

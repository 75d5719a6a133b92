//! Extraction engine module
//!
//! Drives a [`SessionProvider`] through one of three extraction strategies.
//!
//! # Overview
//!
//! The engine module provides:
//! - `ExtractionEngine` - Owns a session and runs extractions against it
//! - `Strategy` - Full pull, cursor pagination or offset batching
//! - `Extraction` - Records plus completion status of one call
//! - `BatchObserver` - Per-batch notification outside the control path
//!
//! # Example
//!
//! ```rust,ignore
//! use soql_extract::engine::{batch_observer, ExtractionEngine, Strategy};
//!
//! let mut engine = ExtractionEngine::new(provider);
//! let mut observer = batch_observer(|event| {
//!     println!("batch {} of {}", event.number, event.total.value());
//!     Ok(())
//! });
//! let extraction = engine
//!     .extract("SELECT Id FROM Account", Strategy::Offset { batch_size: 2000 }, Some(&mut observer))
//!     .await?;
//! engine.close().await?;
//! ```

mod observer;
mod types;

pub use observer::{batch_observer, BatchEvent, BatchObserver, BatchTotal, FnObserver};
pub use types::{ExtractConfig, ExtractStats, Extraction, Strategy, DEFAULT_BATCH_SIZE};

use crate::error::{Error, Result};
use crate::query::{preview, SoqlQuery};
use crate::session::SessionProvider;
use crate::types::{strip_attributes, Record};
use observer::notify;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Extraction engine bound to one session provider.
///
/// The engine holds at most one session. It is acquired by
/// [`connect`](Self::connect) or on the first extraction, reused by every
/// later call, and released by [`close`](Self::close).
pub struct ExtractionEngine<P: SessionProvider> {
    /// Session provider
    provider: P,
    /// Current session
    session: Option<P::Session>,
    /// Extraction configuration
    config: ExtractConfig,
    /// Statistics
    stats: ExtractStats,
}

impl<P: SessionProvider> ExtractionEngine<P> {
    /// Create a new engine
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            session: None,
            config: ExtractConfig::default(),
            stats: ExtractStats::default(),
        }
    }

    /// Set extraction configuration
    #[must_use]
    pub fn with_config(mut self, config: ExtractConfig) -> Self {
        self.config = config;
        self
    }

    /// Get the configuration
    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Get the session provider
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Whether a session is held
    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// The current session, if one is held
    pub fn session(&self) -> Option<&P::Session> {
        self.session.as_ref()
    }

    /// Get statistics
    pub fn stats(&self) -> &ExtractStats {
        &self.stats
    }

    /// Reset statistics
    pub fn reset_stats(&mut self) {
        self.stats = ExtractStats::default();
    }

    /// Acquire a session if none is held
    pub async fn connect(&mut self) -> Result<()> {
        if self.session.is_some() {
            return Ok(());
        }

        match self.provider.connect().await {
            Ok(session) => {
                self.session = Some(session);
                Ok(())
            }
            Err(e) => {
                error!("Connect failed: {e}");
                Err(e)
            }
        }
    }

    /// Release the session, if any, and consume the engine
    pub async fn close(mut self) -> Result<()> {
        match self.session.take() {
            Some(session) => {
                debug!("Releasing session");
                self.provider.release(session).await.map_err(|e| {
                    warn!("Session release failed: {e}");
                    e
                })
            }
            None => Ok(()),
        }
    }

    /// Run a query, as a full pull or with cursor pagination.
    ///
    /// The observer is only notified when paginating.
    pub async fn query(
        &mut self,
        query: &str,
        paginate: bool,
        observer: Option<&mut dyn BatchObserver>,
    ) -> Result<Extraction> {
        let strategy = if paginate {
            Strategy::Cursor
        } else {
            Strategy::FullPull
        };
        self.extract(query, strategy, observer).await
    }

    /// Run a query in `LIMIT`/`OFFSET` batches
    pub async fn query_in_batches(
        &mut self,
        query: &str,
        batch_size: usize,
        observer: Option<&mut dyn BatchObserver>,
    ) -> Result<Extraction> {
        self.extract(query, Strategy::Offset { batch_size }, observer)
            .await
    }

    /// Run an extraction with the given strategy
    pub async fn extract(
        &mut self,
        query: &str,
        strategy: Strategy,
        observer: Option<&mut dyn BatchObserver>,
    ) -> Result<Extraction> {
        let start = Instant::now();
        info!("Executing query: {}", preview(query));

        let result = match strategy {
            Strategy::FullPull => {
                if observer.is_some() {
                    debug!("Full pulls deliver no batches; the observer will not be called");
                }
                self.full_pull(query).await
            }
            Strategy::Cursor => self.cursor(query, observer).await,
            Strategy::Offset { batch_size } => self.offset(query, batch_size, observer).await,
        };

        #[allow(clippy::cast_possible_truncation)]
        self.stats.set_duration(start.elapsed().as_millis() as u64);

        match result {
            Ok(extraction) => {
                if extraction.completed {
                    info!(
                        "Extraction completed: {} records in {} batches",
                        extraction.len(),
                        extraction.batches
                    );
                } else {
                    warn!(
                        "Extraction stopped early: {} of {} records",
                        extraction.len(),
                        extraction.total_count
                    );
                }
                Ok(extraction)
            }
            Err(e) => {
                error!("Query failed: {e}");
                Err(e)
            }
        }
    }

    /// Count the records a query matches
    pub async fn query_count(&mut self, query: &str) -> Result<u64> {
        let count_query = SoqlQuery::parse(query)
            .map_err(|e| {
                error!("Count query failed: {e}");
                e
            })?
            .count_query();
        info!("Count query: {count_query}");

        self.connect().await?;
        let (provider, session, stats) = self.connected()?;

        let page = provider.execute(session, &count_query).await.map_err(|e| {
            error!("Count query failed: {e}");
            e
        })?;
        stats.add_page();

        info!("Total records: {}", page.total_count);
        Ok(page.total_count)
    }

    /// Single call, provider resolves all pages
    async fn full_pull(&mut self, query: &str) -> Result<Extraction> {
        info!("Fetching all records...");
        self.connect().await.map_err(Error::extraction)?;
        let (provider, session, stats) = self.connected()?;

        let page = provider
            .execute_all(session, query)
            .await
            .map_err(Error::extraction)?;
        stats.add_page();
        info!("Total records found: {}", page.total_count);

        let mut extraction = Extraction::new(page.total_count);
        let records = stripped(page.records);
        stats.add_records(records.len());
        stats.add_batch();

        extraction.records = records;
        extraction.batches = 1;
        info!("Successfully retrieved {} records", extraction.len());
        Ok(extraction.complete())
    }

    /// First page, then follow continuation tokens
    async fn cursor(
        &mut self,
        query: &str,
        mut observer: Option<&mut dyn BatchObserver>,
    ) -> Result<Extraction> {
        info!("Using pagination to fetch records...");
        let fail_fast = self.config.fail_fast;
        self.connect().await.map_err(Error::extraction)?;
        let (provider, session, stats) = self.connected()?;

        let mut page = provider
            .execute(session, query)
            .await
            .map_err(Error::extraction)?;
        stats.add_page();

        let total = page.total_count;
        info!("Total records found: {total}");
        let mut extraction = Extraction::new(total);

        loop {
            let first = extraction.len();
            extraction
                .records
                .extend(stripped(std::mem::take(&mut page.records)));
            let number = extraction.batches + 1;
            extraction.batches = number;
            let fetched = extraction.len() - first;
            stats.add_records(fetched);
            stats.add_batch();
            info!(
                "Batch {number}: {fetched} records (total so far: {})",
                extraction.len()
            );

            let event = BatchEvent {
                records: &extraction.records[first..],
                number,
                total: BatchTotal::Records(total),
            };
            if !notify(&mut observer, &event) {
                stats.add_observer_failure();
            }

            let next = match page.next_token() {
                Ok(None) => break,
                Ok(Some(token)) => provider.continue_query(session, token).await,
                Err(e) => Err(e),
            };

            match next {
                Ok(next) => {
                    stats.add_page();
                    page = next;
                }
                Err(e) => {
                    error!("Error fetching next page: {e}");
                    if fail_fast {
                        return Err(Error::extraction(e));
                    }
                    return Ok(extraction.stopped_by(e));
                }
            }
        }

        Ok(extraction.complete())
    }

    /// Count, then fixed-size `LIMIT`/`OFFSET` batches
    async fn offset(
        &mut self,
        query: &str,
        batch_size: usize,
        mut observer: Option<&mut dyn BatchObserver>,
    ) -> Result<Extraction> {
        if batch_size == 0 {
            return Err(Error::config("batch size must be greater than zero"));
        }

        let parsed = SoqlQuery::parse(query).map_err(Error::extraction)?;
        let total = self
            .query_count(query)
            .await
            .map_err(Error::extraction)?;

        if total == 0 {
            info!("No records found");
            return Ok(Extraction::empty());
        }

        let size = batch_size as u64;
        let total_batches = total.div_ceil(size);
        info!("Fetching {total} records in {total_batches} batches (batch size: {batch_size})");

        let fail_fast = self.config.fail_fast;
        let (provider, session, stats) = self.connected()?;
        let mut extraction = Extraction::new(total);

        for batch_index in 0..total_batches {
            let offset = batch_index * size;
            let number = batch_index + 1;
            let batch_query = parsed.with_limit_offset(size, offset);
            info!("Batch {number}/{total_batches}: offset {offset}");
            debug!("Batch query: {}", preview(&batch_query));

            let page = match provider.execute_all(session, &batch_query).await {
                Ok(page) => page,
                Err(e) => {
                    error!("Batch {number}/{total_batches} failed: {e}");
                    if fail_fast || batch_index == 0 {
                        return Err(Error::extraction(e));
                    }
                    return Ok(extraction.stopped_by(e));
                }
            };
            stats.add_page();

            let first = extraction.len();
            extraction.records.extend(stripped(page.records));
            let fetched = extraction.len() - first;
            extraction.batches += 1;
            stats.add_records(fetched);
            stats.add_batch();
            info!(
                "Batch {number}: {fetched} records (total so far: {})",
                extraction.len()
            );

            #[allow(clippy::cast_possible_truncation)]
            let event = BatchEvent {
                records: &extraction.records[first..],
                number: number as usize,
                total: BatchTotal::Batches(total_batches),
            };
            if !notify(&mut observer, &event) {
                stats.add_observer_failure();
            }

            if fetched < batch_size {
                debug!("Short batch, no more records");
                break;
            }
        }

        Ok(extraction.complete())
    }

    /// Split borrows of provider, session and stats
    fn connected(&mut self) -> Result<(&P, &P::Session, &mut ExtractStats)> {
        match self.session.as_ref() {
            Some(session) => Ok((&self.provider, session, &mut self.stats)),
            None => Err(Error::auth("no session established")),
        }
    }
}

impl<P: SessionProvider> Drop for ExtractionEngine<P> {
    fn drop(&mut self) {
        if self.session.is_some() {
            warn!("Extraction engine dropped while holding a session; session was not released");
        }
    }
}

impl<P: SessionProvider> std::fmt::Debug for ExtractionEngine<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionEngine")
            .field("connected", &self.session.is_some())
            .field("config", &self.config)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

fn stripped(mut records: Vec<Record>) -> Vec<Record> {
    records.iter_mut().for_each(strip_attributes);
    records
}

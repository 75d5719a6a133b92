//! Engine types
//!
//! Strategy selection, configuration, outcome and statistics types for the
//! extraction engine.

use crate::error::Error;
use crate::types::Record;

/// Default number of records per batch for offset batching
pub const DEFAULT_BATCH_SIZE: usize = 2000;

/// How records are pulled from the remote source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// One call; the provider resolves every page before returning
    FullPull,
    /// First page, then follow continuation tokens page by page
    Cursor,
    /// Count first, then fixed-size `LIMIT`/`OFFSET` batches
    Offset {
        /// Records per batch
        batch_size: usize,
    },
}

impl Default for Strategy {
    fn default() -> Self {
        Self::Cursor
    }
}

/// Result of one extraction call.
///
/// A partial result (`completed == false`) carries the records fetched
/// before the failure and the failure itself.
#[derive(Debug)]
pub struct Extraction {
    /// Extracted records, attributes stripped, in server order
    pub records: Vec<Record>,
    /// Whether every page/batch was fetched
    pub completed: bool,
    /// Failure that ended a partial extraction
    pub error: Option<Error>,
    /// Number of batches delivered
    pub batches: usize,
    /// Total the remote reported (record count)
    pub total_count: u64,
}

impl Extraction {
    pub(crate) fn new(total_count: u64) -> Self {
        Self {
            records: Vec::new(),
            completed: false,
            error: None,
            batches: 0,
            total_count,
        }
    }

    /// An empty, completed extraction
    pub fn empty() -> Self {
        Self {
            completed: true,
            ..Self::new(0)
        }
    }

    pub(crate) fn complete(mut self) -> Self {
        self.completed = true;
        self
    }

    pub(crate) fn stopped_by(mut self, error: Error) -> Self {
        self.completed = false;
        self.error = Some(error);
        self
    }

    /// Number of records extracted
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no records were extracted
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether the extraction ended early because of an error
    pub fn is_partial(&self) -> bool {
        !self.completed
    }

    /// Take the records, discarding completion information
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Take the records if the extraction completed, otherwise the error
    pub fn into_result(self) -> crate::error::Result<Vec<Record>> {
        match self.error {
            Some(error) => Err(Error::extraction(error)),
            None => Ok(self.records),
        }
    }
}

/// Configuration for extraction calls
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Batch size used when none is given
    pub batch_size: usize,
    /// Abort with an error instead of returning partial results when a page
    /// or batch after the first fails
    pub fail_fast: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            fail_fast: false,
        }
    }
}

impl ExtractConfig {
    /// Create a new extract config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set default batch size
    #[must_use]
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Set fail fast mode
    #[must_use]
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }
}

/// Statistics accumulated by an engine
#[derive(Debug, Clone, Default)]
pub struct ExtractStats {
    /// Total records extracted
    pub records_extracted: usize,
    /// Total pages fetched from the provider
    pub pages_fetched: usize,
    /// Total batches delivered
    pub batches: usize,
    /// Observer calls that failed or panicked
    pub observer_failures: usize,
    /// Duration of the last extraction in milliseconds
    pub duration_ms: u64,
}

impl ExtractStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Add records
    pub fn add_records(&mut self, count: usize) {
        self.records_extracted += count;
    }

    /// Add a page
    pub fn add_page(&mut self) {
        self.pages_fetched += 1;
    }

    /// Add a batch
    pub fn add_batch(&mut self) {
        self.batches += 1;
    }

    /// Add an observer failure
    pub fn add_observer_failure(&mut self) {
        self.observer_failures += 1;
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}

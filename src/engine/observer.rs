//! Batch observers
//!
//! Observers are notified after each batch is accumulated. They sit outside
//! the control path: whatever an observer does, including returning an error
//! or panicking, the extraction carries on.

use crate::types::Record;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::warn;

/// What the `total` of a batch event counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchTotal {
    /// Total records the query matches (cursor pagination; the number of
    /// batches is not known up front)
    Records(u64),
    /// Total batches planned (offset batching)
    Batches(u64),
}

impl BatchTotal {
    /// The raw total
    pub fn value(self) -> u64 {
        match self {
            Self::Records(n) | Self::Batches(n) => n,
        }
    }
}

/// One delivered batch
#[derive(Debug, Clone, Copy)]
pub struct BatchEvent<'a> {
    /// Records of this batch, attributes stripped
    pub records: &'a [Record],
    /// 1-based batch number
    pub number: usize,
    /// Expected total
    pub total: BatchTotal,
}

/// Receives batches as they are extracted
pub trait BatchObserver: Send {
    /// Called once per batch, in order
    fn on_batch(&mut self, event: &BatchEvent<'_>) -> anyhow::Result<()>;
}

/// Observer backed by a closure, see [`batch_observer`]
pub struct FnObserver<F>(F);

impl<F> BatchObserver for FnObserver<F>
where
    F: FnMut(&BatchEvent<'_>) -> anyhow::Result<()> + Send,
{
    fn on_batch(&mut self, event: &BatchEvent<'_>) -> anyhow::Result<()> {
        (self.0)(event)
    }
}

impl<F> std::fmt::Debug for FnObserver<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnObserver").finish_non_exhaustive()
    }
}

/// Wrap a closure as a [`BatchObserver`]
///
/// ```rust
/// use soql_extract::engine::{batch_observer, BatchEvent};
///
/// let mut seen = 0;
/// let mut observer = batch_observer(|event: &BatchEvent<'_>| {
///     seen += event.records.len();
///     Ok(())
/// });
/// # let _ = &mut observer;
/// ```
pub fn batch_observer<F>(f: F) -> FnObserver<F>
where
    F: FnMut(&BatchEvent<'_>) -> anyhow::Result<()> + Send,
{
    FnObserver(f)
}

/// Deliver an event, isolating observer failures.
///
/// Returns `false` when the observer failed or panicked.
pub(crate) fn notify(
    observer: &mut Option<&mut dyn BatchObserver>,
    event: &BatchEvent<'_>,
) -> bool {
    let Some(observer) = observer.as_deref_mut() else {
        return true;
    };

    match catch_unwind(AssertUnwindSafe(|| observer.on_batch(event))) {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            warn!("Batch callback failed for batch {}: {e:#}", event.number);
            false
        }
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            warn!("Batch callback panicked for batch {}: {message}", event.number);
            false
        }
    }
}

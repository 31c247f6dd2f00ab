//! Dedup-and-batch pipeline
//!
//! A pipeline accumulates records, drops duplicates by natural key, and
//! flushes batches to its sink once a size threshold is reached or on
//! close. One search-term pipeline is shared by all of that term's
//! concurrent page tasks, so the interior state sits behind a mutex and
//! `add`/`flush` serialize internally. Detail crawls each get a fresh
//! pipeline scoped to one listing's reviews.

use crate::output::{DelimitedSink, OutputResult};
use crate::records::Record;
use std::collections::HashSet;
use std::sync::Mutex;

/// Default number of accumulated records that triggers a flush
pub const DEFAULT_BATCH_THRESHOLD: usize = 50;

struct Inner<R> {
    batch: Vec<R>,
    seen: HashSet<String>,
}

/// Accumulates, deduplicates, and batch-flushes records to one sink
///
/// Invariants:
/// - a natural key is stored at most once over the pipeline's lifetime,
///   even under concurrent `add` calls; the second occurrence is dropped
///   and logged
/// - the seen-key set only grows and is never cleared, so duplicates are
///   caught across flushes
/// - the in-memory batch is cleared exactly when the sink append
///   succeeds; on a failed flush the batch is retained and the error
///   propagates, so a later flush or close retries the same records
pub struct Pipeline<R: Record> {
    inner: Mutex<Inner<R>>,
    sink: DelimitedSink,
    threshold: usize,
}

impl<R: Record> Pipeline<R> {
    /// Creates a pipeline flushing to `sink` every `threshold` records
    pub fn new(sink: DelimitedSink, threshold: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                batch: Vec::new(),
                seen: HashSet::new(),
            }),
            sink,
            threshold: threshold.max(1),
        }
    }

    /// Adds a record, dropping it if its key was already seen
    ///
    /// Reaching the batch threshold triggers a flush; a flush failure
    /// propagates while the batch (and the seen-set) stay intact.
    pub fn add(&self, record: R) -> OutputResult<()> {
        let mut inner = self.inner.lock().expect("pipeline lock poisoned");

        if !inner.seen.insert(record.key().to_string()) {
            tracing::warn!("Dropping duplicate record: {}", record.key());
            return Ok(());
        }

        inner.batch.push(record);

        if inner.batch.len() >= self.threshold {
            self.flush_inner(&mut inner)?;
        }

        Ok(())
    }

    /// Flushes the current batch to the sink; a no-op when empty
    pub fn flush(&self) -> OutputResult<()> {
        let mut inner = self.inner.lock().expect("pipeline lock poisoned");
        self.flush_inner(&mut inner)
    }

    /// Flushes any remaining records; idempotent
    pub fn close(&self) -> OutputResult<()> {
        self.flush()
    }

    /// Number of records currently held in memory
    pub fn pending(&self) -> usize {
        self.inner.lock().expect("pipeline lock poisoned").batch.len()
    }

    /// The sink destination this pipeline writes to
    pub fn sink(&self) -> &DelimitedSink {
        &self.sink
    }

    fn flush_inner(&self, inner: &mut Inner<R>) -> OutputResult<()> {
        if inner.batch.is_empty() {
            return Ok(());
        }

        self.sink.append(&inner.batch)?;
        tracing::debug!(
            "Flushed {} records to {}",
            inner.batch.len(),
            self.sink.path().display()
        );
        inner.batch.clear();

        Ok(())
    }
}

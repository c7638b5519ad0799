// State module - per-run result store
// Ordered, append-only log of results plus start-time bookkeeping

pub mod result;
pub mod summary;

pub use result::{MAX_MESSAGE_CHARS, ResultEntity, TestStatus, truncate_message};
pub use summary::RunSummary;

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use crate::time::{Clock, SystemClock};

#[derive(Debug, Default)]
struct StoreInner {
    starts: HashMap<String, DateTime<Utc>>,
    results: Vec<ResultEntity>,
}

/// Results collected during one run.
///
/// Every mutation goes through a single mutex, so adapters may be driven
/// from parallel workers. Results keep the order in which they were appended.
/// Create a fresh store for every run.
pub struct ResultStore {
    inner: Mutex<StoreInner>,
    clock: Arc<dyn Clock>,
}

impl Default for ResultStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ResultStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("ResultStore")
            .field("pending", &inner.starts.len())
            .field("results", &inner.results.len())
            .finish()
    }
}

impl ResultStore {
    /// Create an empty store on the system clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(StoreInner::default()),
            clock,
        }
    }

    /// Current time according to the store's clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Record "now" as the start of `test_id`. Last write wins.
    pub fn record_start(&self, test_id: &str) {
        let now = self.now();
        self.record_start_at(test_id, now);
    }

    /// Record an explicit start for `test_id`. Last write wins.
    pub fn record_start_at(&self, test_id: &str, at: DateTime<Utc>) {
        let previous = self.lock().starts.insert(test_id.to_string(), at);
        if previous.is_some() {
            debug!("Start of {} recorded again, keeping latest", test_id);
        }
    }

    /// Remove and return the recorded start of `test_id`
    pub fn take_start(&self, test_id: &str) -> Option<DateTime<Utc>> {
        self.lock().starts.remove(test_id)
    }

    /// Ids that were started but have not finished, sorted
    pub fn pending(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.lock().starts.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Add a result to the end of the log
    pub fn append(&self, result: ResultEntity) {
        self.lock().results.push(result);
    }

    /// Take every result in append order, leaving the store empty
    pub fn drain(&self) -> Vec<ResultEntity> {
        std::mem::take(&mut self.lock().results)
    }

    pub fn len(&self) -> usize {
        self.lock().results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().results.is_empty()
    }

    /// Counts over what has been appended so far
    pub fn summary(&self) -> RunSummary {
        RunSummary::from_results(&self.lock().results)
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        // Critical sections are a single insert, remove or push
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// Engine adapters - translate native engine callbacks into store mutations

pub mod behave;
pub mod pytest;

pub use behave::{BehaveAdapter, BehaveStatus, Feature, FeatureSource, Scenario, ScenarioStarted, Step};
pub use pytest::{Phase, PytestAdapter, PytestOutcome, TestReport, TestStarted};

use tracing::warn;

use crate::engine::EngineKind;
use crate::state::{ResultEntity, ResultStore, TestStatus};

/// Message attached to tests that were started but never reported back
pub const UNFINISHED_MESSAGE: &str = "Test started but never finished";

/// Observe a test lifecycle and append normalized results.
///
/// Callbacks take `&self` so one adapter can be shared by parallel workers;
/// the store's lock serializes every mutation.
pub trait Adapter: Send + Sync {
    /// Native "test started" event
    type Start;
    /// Native completion event
    type Finish;

    fn engine(&self) -> EngineKind;

    fn on_start(&self, event: Self::Start);

    fn on_finish(&self, event: Self::Finish);

    /// Flush anything still buffered into the store. Safe to call twice.
    fn finalize(&self);
}

/// A host engine's outcome value with a total mapping onto [`TestStatus`]
pub trait NativeOutcome {
    fn classify(&self) -> TestStatus;

    /// Raw value when the engine reported something unrecognized
    fn unrecognized(&self) -> Option<&str>;
}

/// Failure text for an outcome the adapter did not recognize
pub(crate) fn unrecognized_message(engine: EngineKind, raw: &str) -> String {
    format!("Unrecognized {} outcome '{}'", engine, raw)
}

/// Name used when the engine gave a test no identity
pub(crate) const UNNAMED: &str = "<unnamed>";

/// Report every id still started in `store` as a failure, ordered by id
pub(crate) fn flush_unfinished(store: &ResultStore) {
    for test_id in store.pending() {
        let Some(start) = store.take_start(&test_id) else {
            continue;
        };
        warn!("{} started but never reported a result", test_id);
        let name = if test_id.trim().is_empty() {
            UNNAMED.to_string()
        } else {
            test_id
        };
        let end = store.now();
        store.append(ResultEntity::fail(name, UNFINISHED_MESSAGE, start, end));
    }
}

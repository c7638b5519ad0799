// Hook-based adapter for pytest
//
// pytest calls back once when a test item starts and once per phase report
// (setup, call, teardown). The call report carries the verdict; a setup report
// that did not pass (skip marker, fixture error) is the only report a test gets.

use chrono::{DateTime, Utc};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{Adapter, NativeOutcome, UNNAMED, flush_unfinished, unrecognized_message};
use crate::engine::EngineKind;
use crate::error::ObservationError;
use crate::state::{ResultEntity, ResultStore, TestStatus};

/// `report.outcome` as pytest emits it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PytestOutcome {
    Passed,
    Failed,
    Skipped,
    Unknown(String),
}

impl FromStr for PytestOutcome {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "passed" => Self::Passed,
            "failed" => Self::Failed,
            "skipped" => Self::Skipped,
            other => Self::Unknown(other.to_string()),
        })
    }
}

impl NativeOutcome for PytestOutcome {
    fn classify(&self) -> TestStatus {
        match self {
            Self::Passed => TestStatus::Pass,
            Self::Skipped => TestStatus::Skip,
            Self::Failed | Self::Unknown(_) => TestStatus::Fail,
        }
    }

    fn unrecognized(&self) -> Option<&str> {
        match self {
            Self::Unknown(raw) => Some(raw),
            _ => None,
        }
    }
}

/// `report.when`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Setup,
    Call,
    Teardown,
    Unknown(String),
}

impl FromStr for Phase {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "setup" => Self::Setup,
            "call" => Self::Call,
            "teardown" => Self::Teardown,
            other => Self::Unknown(other.to_string()),
        })
    }
}

/// `pytest_runtest_protocol`: a test item is about to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestStarted {
    pub nodeid: String,
    /// Engine-provided start time; "now" when absent
    pub at: Option<DateTime<Utc>>,
}

impl TestStarted {
    pub fn now(nodeid: impl Into<String>) -> Self {
        Self {
            nodeid: nodeid.into(),
            at: None,
        }
    }
}

/// `pytest_runtest_logreport`: one phase of a test finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestReport {
    pub nodeid: String,
    pub when: Phase,
    pub outcome: PytestOutcome,
    /// Failure representation, already rendered to text
    pub longrepr: Option<String>,
    /// Engine-provided end time; "now" when absent
    pub stop: Option<DateTime<Utc>>,
}

impl TestReport {
    pub fn call(nodeid: impl Into<String>, outcome: PytestOutcome) -> Self {
        Self {
            nodeid: nodeid.into(),
            when: Phase::Call,
            outcome,
            longrepr: None,
            stop: None,
        }
    }

    pub fn with_longrepr(mut self, longrepr: impl Into<String>) -> Self {
        self.longrepr = Some(longrepr.into());
        self
    }

    /// Whether this phase decides the test's result
    fn is_final(&self) -> bool {
        match &self.when {
            Phase::Call => true,
            Phase::Setup => self.outcome != PytestOutcome::Passed,
            Phase::Teardown | Phase::Unknown(_) => false,
        }
    }
}

/// Adapter fed by pytest's per-test hooks
pub struct PytestAdapter {
    store: Arc<ResultStore>,
}

impl PytestAdapter {
    pub fn new(store: Arc<ResultStore>) -> Self {
        Self { store }
    }

    fn node_name(nodeid: &str) -> Result<&str, ObservationError> {
        if nodeid.trim().is_empty() {
            Err(ObservationError::MissingField {
                field: "nodeid",
                context: "pytest report".to_string(),
            })
        } else {
            Ok(nodeid)
        }
    }
}

impl Adapter for PytestAdapter {
    type Start = TestStarted;
    type Finish = TestReport;

    fn engine(&self) -> EngineKind {
        EngineKind::Pytest
    }

    fn on_start(&self, event: TestStarted) {
        match event.at {
            Some(at) => self.store.record_start_at(&event.nodeid, at),
            None => self.store.record_start(&event.nodeid),
        }
    }

    fn on_finish(&self, report: TestReport) {
        if let Phase::Unknown(phase) = &report.when {
            warn!("Ignoring pytest report for {} in unknown phase '{}'", report.nodeid, phase);
            return;
        }
        if !report.is_final() {
            return;
        }

        let now = self.store.now();
        let name = match Self::node_name(&report.nodeid) {
            Ok(name) => name.to_string(),
            Err(e) => {
                warn!("{}", e);
                UNNAMED.to_string()
            }
        };
        let start = self.store.take_start(&report.nodeid).unwrap_or_else(|| {
            warn!("No start recorded for {}, using current time", name);
            now
        });
        let end = report.stop.unwrap_or(now);

        let status = report.outcome.classify();
        let message = match status {
            TestStatus::Fail => report.longrepr.or_else(|| {
                report
                    .outcome
                    .unrecognized()
                    .map(|raw| unrecognized_message(self.engine(), raw))
            }),
            TestStatus::Pass | TestStatus::Skip => None,
        };

        debug!("Collected {} ({})", name, status);
        self.store
            .append(ResultEntity::new(name, status, start, end, message, None));
    }

    fn finalize(&self) {
        flush_unfinished(&self.store);
    }
}

// Formatter-based adapter for behave
//
// behave hands a formatter whole structural units (a feature and its
// scenarios) instead of raw per-test events. Units are buffered for the
// whole run and flattened once, in order, when the formatter closes.

use chrono::TimeDelta;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use super::{Adapter, NativeOutcome, UNNAMED, flush_unfinished, unrecognized_message};
use crate::engine::EngineKind;
use crate::error::ObservationError;
use crate::state::{ResultEntity, ResultStore, TestStatus};
use crate::time::seconds_to_delta;

/// behave's `Status` values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BehaveStatus {
    Passed,
    Failed,
    Skipped,
    Untested,
    Undefined,
    Pending,
    Executing,
    Error,
    HookError,
    Unknown(String),
}

impl FromStr for BehaveStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "passed" => Self::Passed,
            "failed" => Self::Failed,
            "skipped" => Self::Skipped,
            "untested" => Self::Untested,
            "undefined" => Self::Undefined,
            "pending" | "pending_warn" => Self::Pending,
            "executing" => Self::Executing,
            "error" => Self::Error,
            "hook_error" => Self::HookError,
            other => Self::Unknown(other.to_string()),
        })
    }
}

impl NativeOutcome for BehaveStatus {
    fn classify(&self) -> TestStatus {
        match self {
            Self::Passed => TestStatus::Pass,
            Self::Skipped | Self::Untested => TestStatus::Skip,
            Self::Failed
            | Self::Undefined
            | Self::Pending
            | Self::Executing
            | Self::Error
            | Self::HookError
            | Self::Unknown(_) => TestStatus::Fail,
        }
    }

    fn unrecognized(&self) -> Option<&str> {
        match self {
            Self::Unknown(raw) => Some(raw),
            _ => None,
        }
    }
}

/// One executed step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Step {
    pub name: String,
    pub status: Option<BehaveStatus>,
    /// Seconds
    pub duration: Option<f64>,
    pub error_message: Option<String>,
}

/// A scenario as the formatter sees it once its feature is done
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scenario {
    pub name: Option<String>,
    pub status: Option<BehaveStatus>,
    pub tags: Vec<String>,
    pub steps: Vec<Step>,
    pub error_message: Option<String>,
}

impl Scenario {
    /// Reported status, or one derived from the steps when absent
    pub fn resolve_status(&self) -> Result<BehaveStatus, ObservationError> {
        if let Some(status) = &self.status {
            return Ok(status.clone());
        }

        let statuses: Vec<&BehaveStatus> =
            self.steps.iter().filter_map(|s| s.status.as_ref()).collect();
        if statuses.is_empty() {
            return Err(ObservationError::MissingField {
                field: "status",
                context: format!(
                    "scenario '{}'",
                    self.name.as_deref().unwrap_or(UNNAMED)
                ),
            });
        }

        if let Some(bad) = statuses.iter().find(|s| s.classify() == TestStatus::Fail) {
            return Ok((*bad).clone());
        }
        if statuses.iter().all(|s| **s == BehaveStatus::Passed) {
            return Ok(BehaveStatus::Passed);
        }
        Ok(BehaveStatus::Skipped)
    }

    /// Total of step durations, `None` when no step reported one
    pub fn duration(&self) -> Result<Option<TimeDelta>, ObservationError> {
        let mut durations = self.steps.iter().filter_map(|s| s.duration).peekable();
        if durations.peek().is_none() {
            return Ok(None);
        }
        durations
            .map(seconds_to_delta)
            .try_fold(TimeDelta::zero(), |acc, d| acc.checked_add(&d))
            .map(Some)
            .ok_or_else(|| ObservationError::Malformed {
                context: format!("scenario '{}'", self.name.as_deref().unwrap_or(UNNAMED)),
                reason: "step durations overflow".to_string(),
            })
    }

    /// First failing step's message, else the scenario-level one
    pub fn failure_message(&self) -> Option<String> {
        self.steps
            .iter()
            .filter(|s| {
                s.status
                    .as_ref()
                    .is_some_and(|st| st.classify() == TestStatus::Fail)
            })
            .find_map(|s| s.error_message.clone())
            .or_else(|| self.error_message.clone())
    }
}

/// A feature and its scenarios
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feature {
    pub name: Option<String>,
    pub scenarios: Vec<Scenario>,
}

/// `formatter.scenario(scenario)`: a scenario is about to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioStarted {
    pub feature: String,
    pub scenario: String,
}

/// Late access to the host's structural data
pub trait FeatureSource {
    fn features(&self) -> Result<Vec<Feature>, ObservationError>;
}

/// `"<feature> :: <scenario>"`
pub fn test_name(feature: &str, scenario: &str) -> String {
    format!("{} :: {}", feature, scenario)
}

/// Adapter driven by behave's formatter protocol
pub struct BehaveAdapter {
    store: Arc<ResultStore>,
    buffered: Mutex<Vec<Feature>>,
}

impl BehaveAdapter {
    pub fn new(store: Arc<ResultStore>) -> Self {
        Self {
            store,
            buffered: Mutex::new(Vec::new()),
        }
    }

    /// Number of features waiting for `finalize`
    pub fn buffered(&self) -> usize {
        self.lock_buffer().len()
    }

    /// Buffer every feature `source` can provide.
    ///
    /// A source that cannot be read is logged and contributes nothing.
    pub fn absorb(&self, source: &dyn FeatureSource) -> usize {
        match source.features() {
            Ok(features) => {
                let count = features.len();
                self.lock_buffer().extend(features);
                count
            }
            Err(e) => {
                warn!("Could not read behave features: {}", e);
                0
            }
        }
    }

    /// Absorb `source`, then flatten everything buffered
    pub fn finalize_from(&self, source: &dyn FeatureSource) {
        self.absorb(source);
        self.finalize();
    }

    fn lock_buffer(&self) -> std::sync::MutexGuard<'_, Vec<Feature>> {
        self.buffered.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn flatten(&self, feature: &Feature) {
        let feature_name = feature.name.as_deref().unwrap_or_else(|| {
            warn!("Feature without a name, reporting its scenarios as {}", UNNAMED);
            UNNAMED
        });

        for scenario in &feature.scenarios {
            let scenario_name = scenario.name.as_deref().unwrap_or(UNNAMED);
            let name = test_name(feature_name, scenario_name);
            let now = self.store.now();
            let start = self.store.take_start(&name).unwrap_or(now);
            let end = match scenario.duration() {
                Ok(Some(duration)) => start.checked_add_signed(duration).unwrap_or_else(|| {
                    warn!("End of {} is out of range, using current time", name);
                    now
                }),
                Ok(None) => now,
                Err(e) => {
                    warn!("{}; using current time", e);
                    now
                }
            };

            let (status, observation) = match scenario.resolve_status() {
                Ok(status) => (status, None),
                Err(e) => {
                    warn!("{}; reporting as failed", e);
                    (BehaveStatus::Failed, Some(e.to_string()))
                }
            };
            let verdict = status.classify();
            let message = match verdict {
                TestStatus::Fail => scenario.failure_message().or(observation).or_else(|| {
                    status
                        .unrecognized()
                        .map(|raw| unrecognized_message(self.engine(), raw))
                }),
                TestStatus::Pass | TestStatus::Skip => None,
            };
            let tags = (!scenario.tags.is_empty()).then(|| scenario.tags.clone());

            debug!("Collected {} ({})", name, verdict);
            self.store
                .append(ResultEntity::new(name, verdict, start, end, message, tags));
        }
    }
}

impl Adapter for BehaveAdapter {
    type Start = ScenarioStarted;
    type Finish = Feature;

    fn engine(&self) -> EngineKind {
        EngineKind::Behave
    }

    fn on_start(&self, event: ScenarioStarted) {
        self.store
            .record_start(&test_name(&event.feature, &event.scenario));
    }

    fn on_finish(&self, feature: Feature) {
        self.lock_buffer().push(feature);
    }

    fn finalize(&self) {
        let features = std::mem::take(&mut *self.lock_buffer());
        if !features.is_empty() {
            let before = self.store.len();
            for feature in &features {
                self.flatten(feature);
            }
            info!(
                "Flattened {} feature(s) into {} result(s)",
                features.len(),
                self.store.len() - before
            );
        }

        // Scenarios whose feature never reached the formatter
        flush_unfinished(&self.store);
    }
}

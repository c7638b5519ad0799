// behave `--format json` replay

use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;

use crate::adapters::{Feature, FeatureSource, Scenario, Step};
use crate::error::ObservationError;

#[derive(Debug, Deserialize)]
struct JsonFeature {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    elements: Vec<JsonElement>,
}

#[derive(Debug, Deserialize)]
struct JsonElement {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    keyword: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    steps: Vec<JsonStep>,
    #[serde(default)]
    error_message: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct JsonStep {
    #[serde(default)]
    keyword: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    result: Option<JsonStepResult>,
}

#[derive(Debug, Deserialize)]
struct JsonStepResult {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    error_message: Option<Value>,
}

/// behave emits error messages either as one string or as a list of lines
fn message_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(lines) => Some(
            lines
                .iter()
                .map(|l| l.as_str().map(str::to_string).unwrap_or_else(|| l.to_string()))
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        other => Some(other.to_string()),
    }
}

fn is_background(element: &JsonElement) -> bool {
    let named_background = |s: &Option<String>| {
        s.as_deref()
            .is_some_and(|k| k.eq_ignore_ascii_case("background"))
    };
    named_background(&element.kind) || named_background(&element.keyword)
}

impl From<JsonStep> for Step {
    fn from(step: JsonStep) -> Self {
        let (status, duration, error_message) = match step.result {
            Some(result) => (
                result.status.map(|s| s.parse().unwrap_or_else(|never| match never {})),
                result.duration,
                result.error_message.as_ref().and_then(message_text),
            ),
            None => (None, None, None),
        };
        let name = match step.keyword {
            Some(keyword) => format!("{} {}", keyword.trim(), step.name),
            None => step.name,
        };
        Self {
            name,
            status,
            duration,
            error_message,
        }
    }
}

impl From<JsonElement> for Scenario {
    fn from(element: JsonElement) -> Self {
        Self {
            name: element.name,
            status: element
                .status
                .map(|s| s.parse().unwrap_or_else(|never| match never {})),
            tags: element.tags,
            steps: element.steps.into_iter().map(Step::from).collect(),
            error_message: element.error_message.as_ref().and_then(message_text),
        }
    }
}

/// Parse a behave JSON document into features, dropping background elements
pub fn parse_features(content: &str) -> Result<Vec<Feature>, ObservationError> {
    let features: Vec<JsonFeature> =
        serde_json::from_str(content).map_err(|e| ObservationError::Malformed {
            context: "behave JSON document".to_string(),
            reason: e.to_string(),
        })?;

    Ok(features
        .into_iter()
        .map(|feature| Feature {
            name: feature.name,
            scenarios: feature
                .elements
                .into_iter()
                .filter(|e| !is_background(e))
                .map(Scenario::from)
                .collect(),
        })
        .collect())
}

/// A behave JSON file read when the adapter finalizes
#[derive(Debug, Clone)]
pub struct BehaveJsonSource {
    path: PathBuf,
}

impl BehaveJsonSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FeatureSource for BehaveJsonSource {
    fn features(&self) -> Result<Vec<Feature>, ObservationError> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            ObservationError::Unavailable(format!("{}: {}", self.path.display(), e))
        })?;
        // behave writes nothing at all when no feature ran
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        parse_features(&content)
    }
}

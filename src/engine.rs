// Engine selection - the closed set of supported test engines

use serde::Serialize;
use std::str::FromStr;

use crate::error::UnknownEngineError;

/// Test engines whose results can be reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    Pytest,
    Behave,
    Robot,
}

/// How results reach the report for a given engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    /// Per-test start/finish hooks
    Hooks,
    /// Feature/scenario units buffered until the run closes
    Formatter,
    /// The engine writes output.xml itself
    Native,
}

impl EngineKind {
    pub const ALL: [EngineKind; 3] = [Self::Pytest, Self::Behave, Self::Robot];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Pytest => "pytest",
            Self::Behave => "behave",
            Self::Robot => "robot",
        }
    }

    pub fn collection(&self) -> Collection {
        match self {
            Self::Pytest => Collection::Hooks,
            Self::Behave => Collection::Formatter,
            Self::Robot => Collection::Native,
        }
    }

    /// Suite name used when none is configured
    pub fn default_suite_name(&self) -> &'static str {
        match self {
            Self::Pytest => "Pytest Suite",
            Self::Behave => "Behave Suite",
            Self::Robot => "Robot Suite",
        }
    }

    pub fn available() -> Vec<&'static str> {
        Self::ALL.iter().map(|e| e.name()).collect()
    }
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EngineKind {
    type Err = UnknownEngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|engine| engine.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownEngineError {
                name: s.to_string(),
                available: Self::available(),
            })
    }
}

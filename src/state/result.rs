// Canonical, engine-agnostic test result

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

/// Upper bound on failure message length, in characters
pub const MAX_MESSAGE_CHARS: usize = 2000;

/// Test status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestStatus {
    Pass,
    Fail,
    Skip,
}

impl TestStatus {
    /// Token used in the XML report
    pub fn as_token(&self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::Skip => "SKIP",
        }
    }
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_token())
    }
}

/// One executed test case. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultEntity {
    name: String,
    status: TestStatus,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    message: Option<String>,
    tags: Option<Vec<String>>,
}

impl ResultEntity {
    /// Build a result, normalizing it on the way in.
    ///
    /// `end` is clamped so it never precedes `start`. The message is dropped
    /// unless the status is `Fail`, and truncated to [`MAX_MESSAGE_CHARS`].
    pub fn new(
        name: impl Into<String>,
        status: TestStatus,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        message: Option<String>,
        tags: Option<Vec<String>>,
    ) -> Self {
        let message = match status {
            TestStatus::Fail => message.map(|m| truncate_message(&m)),
            TestStatus::Pass | TestStatus::Skip => None,
        };

        Self {
            name: name.into(),
            status,
            start,
            end: end.max(start),
            message,
            tags,
        }
    }

    /// Create a pass result
    pub fn pass(name: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::new(name, TestStatus::Pass, start, end, None, None)
    }

    /// Create a fail result
    pub fn fail(
        name: impl Into<String>,
        message: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self::new(name, TestStatus::Fail, start, end, Some(message.into()), None)
    }

    /// Create a skip result
    pub fn skip(name: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::new(name, TestStatus::Skip, start, end, None, None)
    }

    /// Same result with tags attached
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> TestStatus {
        self.status
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn tags(&self) -> Option<&[String]> {
        self.tags.as_deref()
    }

    /// `end - start`, never negative
    pub fn elapsed(&self) -> TimeDelta {
        (self.end - self.start).max(TimeDelta::zero())
    }
}

/// Cut a message down to [`MAX_MESSAGE_CHARS`] characters
pub fn truncate_message(message: &str) -> String {
    match message.char_indices().nth(MAX_MESSAGE_CHARS) {
        Some((byte_idx, _)) => message[..byte_idx].to_string(),
        None => message.to_string(),
    }
}

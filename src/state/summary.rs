// Run summary - aggregate counts and time span over a result log

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{ResultEntity, TestStatus};

/// Counts per status plus the overall time span
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl RunSummary {
    pub fn from_results(results: &[ResultEntity]) -> Self {
        let mut summary = Self::default();
        for result in results {
            summary.add(result);
        }
        summary
    }

    /// Fold one result into the counts
    pub fn add(&mut self, result: &ResultEntity) {
        self.total += 1;
        match result.status() {
            TestStatus::Pass => self.passed += 1,
            TestStatus::Fail => self.failed += 1,
            TestStatus::Skip => self.skipped += 1,
        }

        self.start = Some(match self.start {
            Some(s) => s.min(result.start()),
            None => result.start(),
        });
        self.end = Some(match self.end {
            Some(e) => e.max(result.end()),
            None => result.end(),
        });
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Aggregate status: any failure fails, otherwise any pass passes
    pub fn status(&self) -> TestStatus {
        if self.failed > 0 {
            TestStatus::Fail
        } else if self.passed > 0 {
            TestStatus::Pass
        } else {
            TestStatus::Skip
        }
    }
}

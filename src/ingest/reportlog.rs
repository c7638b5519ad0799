// pytest-reportlog replay
//
// Each line is one JSON object. Only `"$report_type": "TestReport"` lines are
// used: the setup report opens the test with its `start`, and every phase
// report is passed on with its `stop`.

use serde::Deserialize;
use serde_json::Value;
use std::io::BufRead;
use tracing::{debug, warn};

use crate::adapters::{Adapter, Phase, PytestAdapter, TestReport, TestStarted};
use crate::error::ObservationError;
use crate::time::from_unix_seconds;

const TEST_REPORT: &str = "TestReport";

#[derive(Debug, Deserialize)]
struct ReportLine {
    #[serde(rename = "$report_type")]
    report_type: String,
    #[serde(default)]
    nodeid: Option<String>,
    #[serde(default)]
    when: Option<String>,
    #[serde(default)]
    outcome: Option<String>,
    #[serde(default)]
    longrepr: Option<Value>,
    #[serde(default)]
    start: Option<f64>,
    #[serde(default)]
    stop: Option<f64>,
}

/// Counters for one replayed log
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub lines: usize,
    pub reports: usize,
    pub skipped: usize,
}

/// Render pytest's `longrepr` into plain text.
///
/// Strings are kept, structured reprs yield their crash message, and
/// skip tuples (`[path, line, reason]`) yield the reason.
pub fn longrepr_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => items.last().and_then(longrepr_text),
        Value::Object(map) => map
            .get("reprcrash")
            .and_then(|crash| crash.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| Some(value.to_string())),
        other => Some(other.to_string()),
    }
}

fn parse_line(line: &str) -> Result<Option<(Option<TestStarted>, TestReport)>, ObservationError> {
    let parsed: ReportLine =
        serde_json::from_str(line).map_err(|e| ObservationError::Malformed {
            context: "reportlog line".to_string(),
            reason: e.to_string(),
        })?;

    if parsed.report_type != TEST_REPORT {
        return Ok(None);
    }

    // The adapter reports a missing identity under a placeholder name
    let nodeid = parsed.nodeid.unwrap_or_default();
    // A report without a phase is taken as the verdict
    let when: Phase = parsed
        .when
        .as_deref()
        .unwrap_or("call")
        .parse()
        .unwrap_or_else(|never| match never {});
    // A report without an outcome cannot be trusted to have passed
    let outcome = parsed
        .outcome
        .as_deref()
        .unwrap_or("missing")
        .parse()
        .unwrap_or_else(|never| match never {});

    let started = (when == Phase::Setup).then(|| TestStarted {
        nodeid: nodeid.clone(),
        at: parsed.start.and_then(from_unix_seconds),
    });

    let report = TestReport {
        nodeid,
        when,
        outcome,
        longrepr: parsed.longrepr.as_ref().and_then(longrepr_text),
        stop: parsed.stop.and_then(from_unix_seconds),
    };

    Ok(Some((started, report)))
}

/// Feed every test report in `reader` to `adapter`.
///
/// Unreadable lines are logged and skipped; the adapter is not finalized.
pub fn replay_reportlog<R: BufRead>(
    reader: R,
    adapter: &PytestAdapter,
) -> std::io::Result<ReplayStats> {
    let mut stats = ReplayStats::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        stats.lines += 1;
        if line.trim().is_empty() {
            continue;
        }

        match parse_line(&line) {
            Ok(Some((started, report))) => {
                if let Some(started) = started {
                    adapter.on_start(started);
                }
                adapter.on_finish(report);
                stats.reports += 1;
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Skipping reportlog line {}: {}", index + 1, e);
                stats.skipped += 1;
            }
        }
    }

    debug!(
        "Replayed {} report(s) from {} line(s), {} skipped",
        stats.reports, stats.lines, stats.skipped
    );
    Ok(stats)
}

// Tests for replaying engine event logs into a report

use hands::adapters::{Adapter, BehaveAdapter, PytestAdapter};
use hands::cli::CollectArgs;
use hands::commands::handle_collect;
use hands::config::Config;
use hands::ingest::{BehaveJsonSource, replay_reportlog};
use hands::report::WriteOutcome;
use hands::state::{ResultStore, TestStatus};
use hands::EngineKind;
use std::fs;
use std::io::{BufReader, Cursor};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const REPORTLOG: &str = r#"{"pytest_version": "8.1.1", "$report_type": "SessionStart"}
{"nodeid": "tests/test_api.py::test_ok", "location": ["tests/test_api.py", 3, "test_ok"], "keywords": {}, "outcome": "passed", "longrepr": null, "when": "setup", "start": 1717228800.0, "stop": 1717228800.01, "$report_type": "TestReport"}
{"nodeid": "tests/test_api.py::test_ok", "location": ["tests/test_api.py", 3, "test_ok"], "keywords": {}, "outcome": "passed", "longrepr": null, "when": "call", "start": 1717228800.01, "stop": 1717228800.5, "$report_type": "TestReport"}
{"nodeid": "tests/test_api.py::test_ok", "location": ["tests/test_api.py", 3, "test_ok"], "keywords": {}, "outcome": "passed", "longrepr": null, "when": "teardown", "start": 1717228800.5, "stop": 1717228800.51, "$report_type": "TestReport"}
{"nodeid": "tests/test_api.py::test_broken", "location": ["tests/test_api.py", 8, "test_broken"], "keywords": {}, "outcome": "passed", "longrepr": null, "when": "setup", "start": 1717228801.0, "stop": 1717228801.01, "$report_type": "TestReport"}
{"nodeid": "tests/test_api.py::test_broken", "location": ["tests/test_api.py", 8, "test_broken"], "keywords": {}, "outcome": "failed", "longrepr": {"reprcrash": {"path": "tests/test_api.py", "lineno": 10, "message": "AssertionError: assert 500 == 200"}, "reprtraceback": {}}, "when": "call", "start": 1717228801.01, "stop": 1717228801.25, "$report_type": "TestReport"}
{"nodeid": "tests/test_api.py::test_later", "location": ["tests/test_api.py", 12, "test_later"], "keywords": {}, "outcome": "skipped", "longrepr": ["tests/test_api.py", 12, "Skipped: not ready"], "when": "setup", "start": 1717228802.0, "stop": 1717228802.001, "$report_type": "TestReport"}
this line is not json

{"exitstatus": 1, "$report_type": "SessionFinish"}
"#;

const BEHAVE_JSON: &str = r#"[
  {
    "keyword": "Feature",
    "name": "Login",
    "tags": [],
    "location": "features/login.feature:1",
    "status": "failed",
    "elements": [
      {
        "type": "background",
        "keyword": "Background",
        "name": "",
        "steps": []
      },
      {
        "type": "scenario",
        "keyword": "Scenario",
        "name": "Valid password",
        "tags": ["smoke"],
        "status": "passed",
        "steps": [
          {"keyword": "Given", "step_type": "given", "name": "a registered user", "result": {"status": "passed", "duration": 0.25}},
          {"keyword": "Then", "step_type": "then", "name": "the dashboard opens", "result": {"status": "passed", "duration": 0.5}}
        ]
      },
      {
        "type": "scenario",
        "keyword": "Scenario",
        "name": "Wrong password",
        "tags": [],
        "status": "failed",
        "steps": [
          {"keyword": "Given", "step_type": "given", "name": "a registered user", "result": {"status": "passed", "duration": 0.25}},
          {"keyword": "Then", "step_type": "then", "name": "an error is shown", "result": {"status": "failed", "duration": 0.125, "error_message": ["Assertion Failed: expected error", "but page was blank"]}}
        ]
      }
    ]
  }
]
"#;

fn collect_args(engine: &str, input: &Path, output: &Path) -> CollectArgs {
    CollectArgs {
        engine: Some(engine.to_string()),
        input: input.to_path_buf(),
        output: Some(output.to_path_buf()),
        suite_name: None,
    }
}

// ==================== pytest-reportlog ====================

#[test]
fn test_replay_reportlog_collects_final_reports() {
    // Arrange
    let store = Arc::new(ResultStore::new());
    let adapter = PytestAdapter::new(store.clone());

    // Act
    let stats = replay_reportlog(Cursor::new(REPORTLOG), &adapter).expect("replay");
    adapter.finalize();

    // Assert
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.reports, 6);
    let results = store.drain();
    let verdicts: Vec<(&str, TestStatus)> =
        results.iter().map(|r| (r.name(), r.status())).collect();
    assert_eq!(
        verdicts,
        vec![
            ("tests/test_api.py::test_ok", TestStatus::Pass),
            ("tests/test_api.py::test_broken", TestStatus::Fail),
            ("tests/test_api.py::test_later", TestStatus::Skip),
        ]
    );
    assert_eq!(
        results[1].message(),
        Some("AssertionError: assert 500 == 200")
    );
    assert!(results[2].message().is_none());
}

#[test]
fn test_replay_reportlog_uses_engine_timestamps() {
    // Arrange
    let store = Arc::new(ResultStore::new());
    let adapter = PytestAdapter::new(store.clone());

    // Act
    replay_reportlog(Cursor::new(REPORTLOG), &adapter).expect("replay");

    // Assert
    let results = store.drain();
    let ok = &results[0];
    assert_eq!(ok.start().timestamp(), 1_717_228_800);
    assert_eq!(ok.elapsed().num_milliseconds(), 500);
}

#[test]
fn test_replay_reportlog_unfinished_test_fails_at_finalize() {
    // Arrange
    let log = r#"{"nodeid": "t.py::test_hang", "outcome": "passed", "when": "setup", "start": 1717228800.0, "stop": 1717228800.1, "$report_type": "TestReport"}"#;
    let store = Arc::new(ResultStore::new());
    let adapter = PytestAdapter::new(store.clone());

    // Act
    replay_reportlog(BufReader::new(log.as_bytes()), &adapter).expect("replay");
    assert!(store.is_empty());
    adapter.finalize();

    // Assert
    let results = store.drain();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name(), "t.py::test_hang");
    assert_eq!(results[0].status(), TestStatus::Fail);
}

#[test]
fn test_replay_reportlog_report_without_nodeid_is_kept() {
    // Arrange
    let log = concat!(
        r#"{"$report_type": "TestReport", "when": "call", "outcome": "failed", "longrepr": "boom"}"#,
        "\n",
        r#"{"$report_type": "TestReport", "nodeid": "t.py::test_ok", "when": "call", "outcome": "passed"}"#,
        "\n"
    );
    let store = Arc::new(ResultStore::new());
    let adapter = PytestAdapter::new(store.clone());

    // Act
    let stats = replay_reportlog(Cursor::new(log), &adapter).expect("replay");
    adapter.finalize();

    // Assert
    assert_eq!(stats.skipped, 0);
    let results = store.drain();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].name(), "<unnamed>");
    assert_eq!(results[0].status(), TestStatus::Fail);
    assert_eq!(results[0].message(), Some("boom"));
    assert_eq!(results[1].name(), "t.py::test_ok");
}

// ==================== behave JSON ====================

#[test]
fn test_behave_json_source_skips_background() {
    // Arrange
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("behave.json");
    fs::write(&path, BEHAVE_JSON).unwrap();
    let store = Arc::new(ResultStore::new());
    let adapter = BehaveAdapter::new(store.clone());

    // Act
    adapter.finalize_from(&BehaveJsonSource::new(&path));

    // Assert
    let results = store.drain();
    let names: Vec<&str> = results.iter().map(|r| r.name()).collect();
    assert_eq!(names, vec!["Login :: Valid password", "Login :: Wrong password"]);
    assert_eq!(results[0].elapsed().num_milliseconds(), 750);
    assert_eq!(
        results[1].message(),
        Some("Assertion Failed: expected error\nbut page was blank")
    );
}

#[test]
fn test_behave_json_source_missing_file_reports_nothing() {
    // Arrange
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = Arc::new(ResultStore::new());
    let adapter = BehaveAdapter::new(store.clone());

    // Act
    let absorbed = adapter.absorb(&BehaveJsonSource::new(temp_dir.path().join("absent.json")));
    adapter.finalize();

    // Assert
    assert_eq!(absorbed, 0);
    assert!(store.is_empty());
}

// ==================== collect command ====================

#[test]
fn test_collect_pytest_writes_report() {
    // Arrange
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input = temp_dir.path().join("reportlog.jsonl");
    let output = temp_dir.path().join("output.xml");
    fs::write(&input, REPORTLOG).unwrap();

    // Act
    let outcome = handle_collect(&collect_args("pytest", &input, &output), &Config::default())
        .expect("collect");

    // Assert
    assert_eq!(outcome.engine, EngineKind::Pytest);
    assert_eq!(
        outcome.report,
        WriteOutcome::Written {
            path: output.clone(),
            tests: 3
        }
    );
    assert_eq!(outcome.summary.failed, 1);
    assert!(!outcome.summary.all_passed());

    let xml = fs::read_to_string(&output).unwrap();
    assert!(xml.contains("name=\"Pytest Suite\""));
    assert!(xml.contains("AssertionError: assert 500 == 200"));
}

#[test]
fn test_collect_behave_directory_with_suite_name() {
    // Arrange
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let runs = temp_dir.path().join("runs");
    fs::create_dir(&runs).unwrap();
    fs::write(runs.join("login.json"), BEHAVE_JSON).unwrap();
    fs::write(runs.join("notes.txt"), "ignored").unwrap();
    let output = temp_dir.path().join("output.xml");
    let mut args = collect_args("Behave", &runs, &output);
    args.suite_name = Some("Acceptance".to_string());

    // Act
    let outcome = handle_collect(&args, &Config::default()).expect("collect");

    // Assert
    assert_eq!(outcome.engine, EngineKind::Behave);
    assert_eq!(outcome.summary.total, 2);
    let xml = fs::read_to_string(&output).unwrap();
    assert!(xml.contains("name=\"Acceptance\""));
    assert!(xml.contains("name=\"Login :: Wrong password\""));
}

#[test]
fn test_collect_engine_from_config() {
    // Arrange
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input = temp_dir.path().join("reportlog.jsonl");
    let output = temp_dir.path().join("output.xml");
    fs::write(&input, REPORTLOG).unwrap();
    let config = Config::parse("[general]\nengine = \"pytest\"\n\n[suite]\npytest = \"API\"\n")
        .expect("config");
    let mut args = collect_args("pytest", &input, &output);
    args.engine = None;

    // Act
    let outcome = handle_collect(&args, &config).expect("collect");

    // Assert
    assert_eq!(outcome.engine, EngineKind::Pytest);
    assert!(fs::read_to_string(&output).unwrap().contains("name=\"API\""));
}

#[test]
fn test_collect_rejects_unknown_and_native_engines() {
    // Arrange
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input = temp_dir.path().join("reportlog.jsonl");
    let output = temp_dir.path().join("output.xml");
    fs::write(&input, REPORTLOG).unwrap();

    // Act
    let unknown = handle_collect(&collect_args("nose", &input, &output), &Config::default());
    let native = handle_collect(&collect_args("robot", &input, &output), &Config::default());

    // Assert
    let unknown = unknown.expect_err("unknown engine must fail");
    assert!(unknown.to_string().contains("Unknown engine 'nose'"));
    assert!(native.is_err());
    assert!(!output.exists());
}

#[test]
fn test_collect_behave_huge_duration_writes_report() {
    // Arrange
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input = temp_dir.path().join("behave.json");
    let output = temp_dir.path().join("output.xml");
    let doc = BEHAVE_JSON.replace("\"duration\": 0.25", "\"duration\": 9.0e12");
    fs::write(&input, doc).unwrap();

    // Act
    let outcome = handle_collect(&collect_args("behave", &input, &output), &Config::default())
        .expect("collect");

    // Assert
    assert_eq!(outcome.summary.total, 2);
    assert!(fs::read_to_string(&output).unwrap().contains("Login :: Valid password"));
}

#[test]
fn test_collect_without_results_leaves_no_report() {
    // Arrange
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input = temp_dir.path().join("empty.jsonl");
    let output = temp_dir.path().join("output.xml");
    fs::write(&input, "{\"$report_type\": \"SessionStart\"}\n").unwrap();

    // Act
    let outcome = handle_collect(&collect_args("pytest", &input, &output), &Config::default())
        .expect("collect");

    // Assert
    assert_eq!(outcome.report, WriteOutcome::NothingToReport);
    assert!(!output.exists());
}

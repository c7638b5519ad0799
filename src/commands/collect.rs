// Collect command - replay event logs and write the report

use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::adapters::{Adapter, BehaveAdapter, PytestAdapter};
use crate::cli::CollectArgs;
use crate::config::Config;
use crate::engine::{Collection, EngineKind};
use crate::ingest::{BehaveJsonSource, CollectError, replay_reportlog};
use crate::report::{self, WriteOutcome};
use crate::state::{ResultStore, RunSummary};
use crate::utils::FileUtils;

/// Result of one `collect` invocation
#[derive(Debug, Clone)]
pub struct CollectOutcome {
    pub engine: EngineKind,
    pub report: WriteOutcome,
    pub summary: RunSummary,
}

/// Pick the engine from the command line, falling back to the config file
pub fn resolve_engine(args: &CollectArgs, config: &Config) -> Result<EngineKind> {
    let name = args
        .engine
        .as_deref()
        .or(config.general.engine.as_deref())
        .with_context(|| {
            format!(
                "No engine given. Use --engine ({})",
                EngineKind::available().join(" | ")
            )
        })?;
    Ok(name.parse::<EngineKind>()?)
}

pub fn handle_collect(args: &CollectArgs, config: &Config) -> Result<CollectOutcome> {
    let engine = resolve_engine(args, config)?;

    // One store per invocation
    let store = Arc::new(ResultStore::new());
    match engine.collection() {
        Collection::Hooks => {
            let files = event_files(&args.input, "jsonl")?;
            collect_pytest(&files, store.clone());
        }
        Collection::Formatter => {
            let files = event_files(&args.input, "json")?;
            collect_behave(&files, store.clone());
        }
        Collection::Native => {
            return Err(CollectError::NativeEngine {
                engine: engine.name(),
            }
            .into());
        }
    }

    let results = store.drain();
    let summary = RunSummary::from_results(&results);
    let suite_name = args
        .suite_name
        .clone()
        .unwrap_or_else(|| config.suite_name(engine));
    let output = args.output.clone().unwrap_or_else(|| config.output_path());

    let report = report::write(&suite_name, &results, &output)
        .with_context(|| format!("Failed writing Robot XML to {}", output.display()))?;

    match &report {
        WriteOutcome::Written { path, tests } => info!(
            "{} passed, {} failed, {} skipped ({} test(s) in {})",
            summary.passed,
            summary.failed,
            summary.skipped,
            tests,
            path.display()
        ),
        WriteOutcome::NothingToReport => {
            warn!("No test results collected; {} was not written", output.display())
        }
    }

    Ok(CollectOutcome {
        engine,
        report,
        summary,
    })
}

fn event_files(input: &Path, extension: &str) -> Result<Vec<PathBuf>, CollectError> {
    let files = FileUtils::collect_event_files(input, &[extension]);
    if files.is_empty() {
        return Err(CollectError::NoInput {
            path: input.to_path_buf(),
        });
    }
    Ok(files)
}

fn collect_pytest(files: &[PathBuf], store: Arc<ResultStore>) {
    let adapter = PytestAdapter::new(store);
    info!("Replaying {} {} event log(s)", files.len(), adapter.engine());
    for file in files {
        if let Err(e) = replay_file(file, &adapter) {
            error!("{:#}", anyhow::Error::from(e));
        }
    }
    adapter.finalize();
}

fn replay_file(path: &Path, adapter: &PytestAdapter) -> Result<(), CollectError> {
    let read_error = |source| CollectError::Read {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(read_error)?;
    let stats = replay_reportlog(BufReader::new(file), adapter).map_err(read_error)?;
    if stats.skipped > 0 {
        warn!("{}: {} unreadable line(s) skipped", path.display(), stats.skipped);
    }
    Ok(())
}

fn collect_behave(files: &[PathBuf], store: Arc<ResultStore>) {
    let adapter = BehaveAdapter::new(store);
    info!("Reading {} {} JSON report(s)", files.len(), adapter.engine());
    for file in files {
        adapter.absorb(&BehaveJsonSource::new(file));
    }
    adapter.finalize();
}

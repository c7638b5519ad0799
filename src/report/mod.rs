// Report module - serialize a run's results into Robot-style output.xml

pub mod escape;
pub mod robot;

pub use robot::render;

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::SerializationError;
use crate::state::ResultEntity;
use crate::utils::FileUtils;

/// What a call to [`write`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// A complete document now sits at `path`
    Written { path: PathBuf, tests: usize },
    /// There were no results; the filesystem was not touched
    NothingToReport,
}

impl WriteOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, Self::Written { .. })
    }
}

/// Serialize `results` under `suite_name` and write them to `destination`.
///
/// The destination either ends up holding the complete document or is left
/// as it was. An empty result list writes nothing.
pub fn write(
    suite_name: &str,
    results: &[ResultEntity],
    destination: &Path,
) -> Result<WriteOutcome, SerializationError> {
    if results.is_empty() {
        debug!("No results for suite '{}', skipping report", suite_name);
        return Ok(WriteOutcome::NothingToReport);
    }

    let xml = render(suite_name, results);
    FileUtils::write_atomic(destination, xml.as_bytes())?;

    info!(
        "Wrote Robot XML with {} test result(s) to {}",
        results.len(),
        destination.display()
    );
    Ok(WriteOutcome::Written {
        path: destination.to_path_buf(),
        tests: results.len(),
    })
}

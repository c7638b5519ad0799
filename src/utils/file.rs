// Cross-platform file utilities

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::SerializationError;

/// File utilities for cross-platform operations
pub struct FileUtils;

impl FileUtils {
    /// Collect event log files under `path` with one of `extensions`, sorted by path.
    ///
    /// A file path is returned as-is regardless of its extension.
    pub fn collect_event_files(path: &Path, extensions: &[&str]) -> Vec<PathBuf> {
        let mut files = Vec::new();

        if path.is_file() {
            files.push(path.to_path_buf());
        } else if path.is_dir() {
            // Hidden entries below `path` are skipped; `path` itself never is
            let walker = walkdir::WalkDir::new(path)
                .into_iter()
                .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));

            for entry in walker.flatten() {
                if entry.file_type().is_file()
                    && let Some(ext) = entry.path().extension()
                    && extensions.iter().any(|wanted| ext == *wanted)
                {
                    files.push(entry.path().to_path_buf());
                }
            }
        }

        files.sort();
        files
    }

    /// Replace `path` with `content` in one step.
    ///
    /// Content goes to a temporary file in the same directory, is synced, and
    /// is then renamed over `path`. On failure `path` is untouched.
    pub fn write_atomic(path: &Path, content: &[u8]) -> Result<(), SerializationError> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut file = tempfile::Builder::new()
            .prefix(".hands-")
            .suffix(".xml.tmp")
            .tempfile_in(dir)
            .map_err(|source| SerializationError::TempFile {
                path: path.to_path_buf(),
                source,
            })?;

        file.write_all(content)
            .and_then(|_| file.flush())
            .and_then(|_| file.as_file().sync_all())
            .map_err(|source| SerializationError::Write {
                path: path.to_path_buf(),
                source,
            })?;

        file.persist(path)
            .map_err(|e| SerializationError::Persist {
                path: path.to_path_buf(),
                source: e.error,
            })?;

        Ok(())
    }
}

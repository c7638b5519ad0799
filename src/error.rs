// Error taxonomy for adapters, serialization and engine selection

use std::path::PathBuf;

/// The adapter could not read an outcome or identity from the host engine.
///
/// Never propagated past the adapter: it is logged and the affected test
/// degrades to a `FAIL` result stamped with "now".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ObservationError {
    #[error("missing field `{field}` in {context}")]
    MissingField {
        field: &'static str,
        context: String,
    },

    #[error("malformed {context}: {reason}")]
    Malformed { context: String, reason: String },

    #[error("structural data unavailable: {0}")]
    Unavailable(String),
}

/// The report could not be written to its destination.
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    #[error("failed to create temporary report file next to {}", .path.display())]
    TempFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write report content for {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to move report into place at {}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SerializationError {
    /// Destination the failed write was aimed at
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::TempFile { path, .. } | Self::Write { path, .. } | Self::Persist { path, .. } => {
                path
            }
        }
    }
}

/// An engine name outside the supported set was requested.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown engine '{name}'. Available: {}", .available.join(", "))]
pub struct UnknownEngineError {
    pub name: String,
    pub available: Vec<&'static str>,
}

// Ingest module - replay engine event logs through the matching adapter

pub mod behave_json;
pub mod reportlog;

pub use behave_json::BehaveJsonSource;
pub use reportlog::{ReplayStats, replay_reportlog};

use std::path::PathBuf;

/// Reading an event log failed outright
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("failed to read event log {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{engine} writes output.xml natively; there is nothing to collect")]
    NativeEngine { engine: &'static str },

    #[error("no event logs found under {}", .path.display())]
    NoInput { path: PathBuf },
}

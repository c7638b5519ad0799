pub mod adapters;
pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod report;
pub mod state;
pub mod time;
pub mod utils;

pub use engine::EngineKind;
pub use error::{ObservationError, SerializationError, UnknownEngineError};
pub use report::{WriteOutcome, write};
pub use state::{ResultEntity, ResultStore, TestStatus};

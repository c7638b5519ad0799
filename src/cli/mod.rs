// CLI module

pub mod args;

pub use args::{Cli, CollectArgs, Commands, EnginesArgs, OutputFormat};

// CLI argument definitions using Clap

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Output format for listing commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("json") {
            Ok(Self::Json)
        } else {
            Ok(Self::Text)
        }
    }
}

/// Normalize test engine results into Robot Framework output.xml
#[derive(Parser, Debug)]
#[command(name = "hands")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Turn pytest and behave results into Robot-style output.xml", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose debug output
    #[arg(short = 'v', long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Show current configuration and exit
    #[arg(long, default_value_t = false)]
    pub config: bool,

    /// Create default configuration file
    #[arg(long, value_name = "CONFIG_FILE")]
    pub init_config: Option<PathBuf>,

    /// Print a shell completion script
    #[arg(long, value_name = "SHELL", value_enum)]
    pub completion: Option<Shell>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay an engine's event log and write output.xml
    Collect(CollectArgs),

    /// List supported test engines
    Engines(EnginesArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CollectArgs {
    /// Engine that produced the events: pytest | behave | robot
    #[arg(short = 'e', long)]
    pub engine: Option<String>,

    /// Event log file, or a directory of them
    #[arg(short = 'i', long, value_name = "PATH")]
    pub input: PathBuf,

    /// Output XML file
    #[arg(short = 'o', long, value_name = "OUTPUT_FILE")]
    pub output: Option<PathBuf>,

    /// Suite name in the report
    #[arg(short = 'n', long)]
    pub suite_name: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct EnginesArgs {
    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    pub format: String,
}

impl EnginesArgs {
    pub fn output_format(&self) -> OutputFormat {
        self.format.parse().unwrap_or(OutputFormat::Text)
    }
}

// Configuration file handling

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::engine::EngineKind;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub suite: SuiteConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Where the report is written
    #[serde(default = "default_output")]
    pub output: String,

    /// Engine used when none is given on the command line
    #[serde(default)]
    pub engine: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            engine: None,
        }
    }
}

/// Suite names per engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteConfig {
    #[serde(default = "default_pytest_suite")]
    pub pytest: String,

    #[serde(default = "default_behave_suite")]
    pub behave: String,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            pytest: default_pytest_suite(),
            behave: default_behave_suite(),
        }
    }
}

// Default values
pub const ENV_HANDS_OUTPUT: &str = "HANDS_OUTPUT";

pub fn default_output() -> String {
    std::env::var(ENV_HANDS_OUTPUT).unwrap_or_else(|_| String::from("output.xml"))
}

fn default_pytest_suite() -> String {
    EngineKind::Pytest.default_suite_name().to_string()
}

fn default_behave_suite() -> String {
    EngineKind::Behave.default_suite_name().to_string()
}

impl Config {
    /// Load configuration from default locations
    pub fn load() -> Option<Self> {
        // Check locations in order:
        // 1. .handsrc (current directory)
        // 2. ~/.handsrc (home directory)
        // 3. .handsrc.toml (current directory)
        // 4. ~/.handsrc.toml (home directory)

        let cwd = std::env::current_dir().ok()?;
        let home = dirs::home_dir();

        let mut paths = vec![cwd.join(".handsrc")];
        paths.extend(home.as_ref().map(|h| h.join(".handsrc")));
        paths.push(cwd.join(".handsrc.toml"));
        paths.extend(home.as_ref().map(|h| h.join(".handsrc.toml")));

        paths
            .iter()
            .find(|path| path.exists())
            .and_then(|path| Self::load_from_file(path))
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> Option<Self> {
        toml::from_str(content).ok()
    }

    /// Generate configuration as TOML
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_else(|_| String::new())
    }

    /// Configured suite name for `engine`
    pub fn suite_name(&self, engine: EngineKind) -> String {
        match engine {
            EngineKind::Pytest => self.suite.pytest.clone(),
            EngineKind::Behave => self.suite.behave.clone(),
            EngineKind::Robot => engine.default_suite_name().to_string(),
        }
    }

    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(&self.general.output)
    }
}

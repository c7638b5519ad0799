// Engines command - list supported engines

use anyhow::Result;

use crate::cli::{EnginesArgs, OutputFormat};
use crate::engine::{Collection, EngineKind};

pub fn handle_engines(args: &EnginesArgs) -> Result<()> {
    match args.output_format() {
        OutputFormat::Json => {
            let engines: Vec<serde_json::Value> = EngineKind::ALL
                .iter()
                .map(|engine| {
                    serde_json::json!({
                        "name": engine,
                        "collection": engine.collection(),
                        "default_suite": engine.default_suite_name(),
                    })
                })
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({ "engines": engines }))?
            );
        }
        OutputFormat::Text => {
            println!("Available Test Engines:");
            for engine in EngineKind::ALL {
                let how = match engine.collection() {
                    Collection::Hooks => "per-test hooks (pytest-reportlog)",
                    Collection::Formatter => "formatter (behave --format json)",
                    Collection::Native => "native output.xml",
                };
                println!("  {:<8} {}", engine.name(), how);
            }
        }
    }

    Ok(())
}

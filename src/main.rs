// Main entry point for hands

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, warn};

use hands::cli::{Cli, Commands};
use hands::commands;
use hands::config;
use hands::logging;

fn main() {
    let code = match run() {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            3
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    // Load configuration from file (if exists)
    let loaded = config::Config::load();

    let cli = Cli::parse();
    logging::init(cli.verbose);

    if cli.verbose {
        info!("Starting hands v{}", env!("CARGO_PKG_VERSION"));
    }

    // Handle config flag
    if cli.config {
        print_config(loaded.as_ref());
        return Ok(0);
    }

    // Handle init_config flag
    if let Some(config_file) = &cli.init_config {
        let toml_content = config::Config::default().to_toml();
        std::fs::write(config_file, toml_content)?;
        println!("Configuration file created: {}", config_file.display());
        println!("\nYou can now edit the file to customize your settings.");
        print_precedence();
        return Ok(0);
    }

    // Handle completion flag
    if let Some(shell) = cli.completion {
        commands::handle_completion(shell)?;
        return Ok(0);
    }

    let config = loaded.unwrap_or_default();

    match &cli.command {
        Some(Commands::Collect(args)) => {
            let outcome = commands::handle_collect(args, &config)?;
            Ok(if outcome.summary.all_passed() { 0 } else { 1 })
        }
        Some(Commands::Engines(args)) => {
            commands::handle_engines(args)?;
            Ok(0)
        }
        None => {
            warn!("No command given. Use 'hands --help' for usage.");
            Ok(2)
        }
    }
}

fn print_config(loaded: Option<&config::Config>) {
    println!("Current configuration:");
    match loaded {
        Some(cfg) => {
            println!("\n  Configuration file loaded:");
            println!("    Output: {}", cfg.general.output);
            if let Some(ref engine) = cfg.general.engine {
                println!("    Engine: {}", engine);
            }
            println!("    Pytest suite name: {}", cfg.suite.pytest);
            println!("    Behave suite name: {}", cfg.suite.behave);
        }
        None => {
            println!("\n  No configuration file loaded");
            println!("  Create one with: hands --init-config .handsrc.toml");
        }
    }

    println!("\n  Environment variables:");
    match std::env::var(config::ENV_HANDS_OUTPUT) {
        Ok(output) => println!("    {}: {}", config::ENV_HANDS_OUTPUT, output),
        Err(_) => println!(
            "    {}: not set (default: output.xml)",
            config::ENV_HANDS_OUTPUT
        ),
    }

    print_precedence();
}

fn print_precedence() {
    println!("\nConfiguration precedence:");
    println!("  1. Command-line arguments (highest)");
    println!("  2. Configuration file");
    println!("  3. Environment variables");
    println!("  4. Built-in defaults (lowest)");
}

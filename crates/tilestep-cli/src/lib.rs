//! # Tilestep CLI
//!
//! Headless runner for tilestep physics scenarios.
//!
//! ## Commands
//! - `run` - Simulate a scenario and print the final body states as JSON
//! - `validate` - Load a scenario and register its bodies without ticking
//! - `config` - Print the default physics configuration

pub mod scenario;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tilestep_physics::PhysicsConfig;

use crate::scenario::{Scenario, snapshot};

/// Tilestep physics CLI
#[derive(Parser)]
#[command(name = "tilestep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run a scenario
    Run {
        /// Scenario JSON file
        scenario: PathBuf,

        /// Number of ticks, overriding the scenario's own
        #[arg(short, long)]
        ticks: Option<u64>,

        /// Print every body after every tick
        #[arg(long)]
        trace: bool,
    },

    /// Check that a scenario loads and its bodies register
    Validate {
        /// Scenario JSON file
        scenario: PathBuf,
    },

    /// Print the default configuration
    Config {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Execute the CLI command
pub fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    match cli.command {
        Commands::Run { scenario, ticks, trace } => {
            let loaded = Scenario::load(&scenario)?;
            let ticks = ticks.unwrap_or(loaded.ticks);
            log::info!("Running {} for {} ticks", scenario.display(), ticks);

            let report = loaded.run(ticks, |tick, world, names| {
                if trace {
                    let line = serde_json::json!({ "tick": tick, "bodies": snapshot(world, names) });
                    println!("{line}");
                }
            })?;

            log::info!(
                "Done: {} steps, {} slides, {} pushes, {} iteration cap hits",
                report.diagnostics.steps,
                report.diagnostics.slides,
                report.diagnostics.pushes,
                report.diagnostics.iteration_cap_hits
            );
            println!("{}", serde_json::to_string_pretty(&report).context("Failed to serialize report")?);
        }

        Commands::Validate { scenario } => {
            let loaded = Scenario::load(&scenario)?;
            let (world, names) = loaded.build()?;
            log::info!(
                "{} is valid: {} levels, {} bodies",
                scenario.display(),
                world.levels().len(),
                names.len()
            );
        }

        Commands::Config { output } => {
            let json = PhysicsConfig::default().to_json_pretty()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
                    log::info!("Wrote default config to {}", path.display());
                }
                None => println!("{json}"),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse() {
        let cli = Cli::parse_from(["tilestep", "config"]);
        assert!(matches!(cli.command, Commands::Config { output: None }));
        assert!(!cli.verbose);
    }

    #[test]
    fn test_run_command() {
        let cli = Cli::parse_from(["tilestep", "-v", "run", "level.json", "--ticks", "120", "--trace"]);
        if let Commands::Run { scenario, ticks, trace } = cli.command {
            assert_eq!(scenario, PathBuf::from("level.json"));
            assert_eq!(ticks, Some(120));
            assert!(trace);
        } else {
            panic!("Expected Run command");
        }
        assert!(cli.verbose);
    }

    #[test]
    fn test_validate_requires_scenario() {
        assert!(Cli::try_parse_from(["tilestep", "validate"]).is_err());
    }
}

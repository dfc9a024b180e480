//! Headless sparring scoreboard.
//!
//! This binary runs a bout without any display, controlled via JSON on
//! stdin/stdout. Designed for operator consoles, CI scripts and replay
//! verification.
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode - read commands from stdin
//! cargo run -p spar_headless
//!
//! # Interactive mode with a configuration file
//! cargo run -p spar_headless -- run --config match.ron --auto-state
//!
//! # Run a bout script and check its expectations
//! cargo run -p spar_headless -- script scripts/split_decision.ron
//!
//! # Validate a configuration file
//! cargo run -p spar_headless -- validate match.ron
//! ```
//!
//! # Protocol
//!
//! Input (stdin): JSON commands, one per line
//! Output (stdout): JSON responses, one per line
//! Logs (stderr): Debug information
//!
//! See the protocol module for command/response format.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use spar_core::config::MatchConfig;
use spar_headless::{load_match_config, BoutScript, HeadlessConfig, HeadlessRunner};

#[derive(Parser)]
#[command(name = "spar_headless")]
#[command(about = "Headless sparring scoreboard for consoles and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interactive bout on stdin/stdout
    Run {
        /// Match configuration file (RON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output state after every command
        #[arg(long)]
        auto_state: bool,
    },

    /// Run a bout script to completion
    Script {
        /// Script file (RON)
        path: PathBuf,

        /// Print the final state as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Validate a match configuration file
    Validate {
        /// Configuration file (RON)
        path: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for protocol)
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    match cli.command {
        Some(Commands::Run { config, auto_state }) => cmd_run(config, auto_state),
        Some(Commands::Script { path, json }) => cmd_script(&path, json),
        Some(Commands::Validate { path }) => cmd_validate(&path),
        None => cmd_run(None, false),
    }
}

/// Run a single interactive bout
fn cmd_run(config: Option<PathBuf>, auto_state: bool) {
    let match_config = match config {
        Some(path) => match load_match_config(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, path = %path.display(), "Failed to load configuration");
                std::process::exit(1);
            }
        },
        None => MatchConfig::default(),
    };

    tracing::info!(match_id = %match_config.match_id, "Starting interactive session");

    let runner = HeadlessRunner::with_config(HeadlessConfig {
        auto_state_output: auto_state,
        match_config,
    });
    let mut runner = match runner {
        Ok(runner) => runner,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    if let Err(e) = runner.run_stdio() {
        tracing::error!(error = %e, "Session aborted");
        std::process::exit(1);
    }
}

/// Run a bout script and check its expectations
fn cmd_script(path: &Path, json: bool) {
    let script = match BoutScript::load(path) {
        Ok(script) => script,
        Err(e) => {
            tracing::error!(error = %e, path = %path.display(), "Failed to load script");
            std::process::exit(1);
        }
    };

    match script.run() {
        Ok(report) => {
            for conclusion in report.conclusions() {
                tracing::info!(
                    round = conclusion.round,
                    winner = ?conclusion.winner,
                    reason = ?conclusion.reason,
                    "Round result"
                );
            }
            if json {
                match serde_json::to_string_pretty(&report.snapshot) {
                    Ok(text) => println!("{text}"),
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to serialize final state");
                        std::process::exit(1);
                    }
                }
            }
            tracing::info!(script = %report.name, hash = report.hash, "Script passed");
        }
        Err(e) => {
            tracing::error!(error = %e, script = %script.name, "Script failed");
            std::process::exit(1);
        }
    }
}

/// Validate a configuration file
fn cmd_validate(path: &Path) {
    tracing::info!("Validating configuration: {}", path.display());
    match load_match_config(path) {
        Ok(config) => tracing::info!(
            match_id = %config.match_id,
            max_health = config.max_health,
            max_rounds = config.max_rounds,
            wins_required = config.wins_required(),
            "Validation passed"
        ),
        Err(e) => {
            tracing::error!("Validation failed: {e}");
            std::process::exit(1);
        }
    }
}

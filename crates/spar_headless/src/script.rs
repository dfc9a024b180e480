//! Bout scripts and configuration files.
//!
//! A script is a RON document holding a match configuration, a list of
//! steps and optional expectations about the final state. Scripts are run
//! through the same command handler as the interactive protocol, so a
//! passing script proves the protocol path too.
//!
//! ```ron
//! (
//!     name: "Early knockout",
//!     config: (max_health: 60),
//!     steps: [
//!         Start,
//!         Hit(red, super_crit),
//!         Wait(1000),
//!         Hit(red, super_crit),
//!     ],
//!     expect: (round_winners: Some([Some(red)])),
//! )
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use spar_core::prelude::{
    BoutError, BoutSnapshot, HitCategory, MatchConfig, Player, RoundConclusion,
};
use spar_core::timer::{BREAK_TICK_MS, ROUND_TICK_MS};
use thiserror::Error;

use crate::protocol::{Command, Response};
use crate::runner::{HeadlessConfig, HeadlessRunner};

/// Error type for script and configuration files.
#[derive(Error, Debug)]
pub enum ScriptError {
    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse file: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// The configuration was rejected.
    #[error(transparent)]
    Bout(#[from] BoutError),
    /// The final state did not match the script's expectations.
    #[error("Expectation failed for '{field}': expected {expected}, got {actual}")]
    ExpectationFailed {
        /// Name of the checked field.
        field: &'static str,
        /// Expected value.
        expected: String,
        /// Actual value.
        actual: String,
    },
}

/// One scripted stimulus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptStep {
    /// Start the round clock.
    Start,
    /// Pause the round clock.
    Pause,
    /// Flip the round clock.
    Toggle,
    /// Run the round clock for this many milliseconds.
    Run(u64),
    /// Run the break clock for this many milliseconds.
    Break(u64),
    /// Let time pass on the cooldown clock only.
    Wait(u64),
    /// Register a hit.
    Hit(Player, HitCategory),
    /// Apply a penalty.
    Penalty(Player),
    /// Withdraw a penalty.
    RemovePenalty(Player),
    /// Close the round on the operator's decision.
    EndRound,
    /// Revert the newest hit or penalty.
    Undo,
    /// Restart the current round.
    ResetRound,
    /// Restart the match.
    ResetMatch,
    /// Acknowledge the match result.
    CloseResult,
}

impl ScriptStep {
    /// Protocol command for this step.
    pub fn to_command(&self) -> Command {
        match *self {
            Self::Start => Command::Start,
            Self::Pause => Command::Pause,
            Self::Toggle => Command::Toggle,
            Self::Run(ms) => Command::Tick {
                ms: ROUND_TICK_MS,
                count: tick_count(ms, ROUND_TICK_MS),
            },
            Self::Break(ms) => Command::TickBreak {
                ms: BREAK_TICK_MS,
                count: tick_count(ms, BREAK_TICK_MS),
            },
            Self::Wait(ms) => Command::Wait { ms },
            Self::Hit(player, category) => Command::Hit { player, category },
            Self::Penalty(player) => Command::Penalty { player },
            Self::RemovePenalty(player) => Command::RemovePenalty { player },
            Self::EndRound => Command::EndRound,
            Self::Undo => Command::Undo,
            Self::ResetRound => Command::ResetRound,
            Self::ResetMatch => Command::ResetMatch,
            Self::CloseResult => Command::CloseResult,
        }
    }
}

/// Number of whole ticks covering `ms`, rounded up.
fn tick_count(ms: u64, tick_ms: u64) -> u32 {
    u32::try_from(ms.div_ceil(tick_ms)).unwrap_or(u32::MAX)
}

/// Checks applied to the final bout state. Unset fields are not checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Expectations {
    /// Expected match-over flag.
    pub is_match_over: Option<bool>,
    /// Expected latched winner; `Some(None)` expects a draw.
    pub match_winner: Option<Option<Player>>,
    /// Expected round in progress.
    pub current_round: Option<u8>,
    /// Expected round winners so far.
    pub round_winners: Option<Vec<Option<Player>>>,
}

impl Expectations {
    /// Compare against a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::ExpectationFailed`] for the first mismatch.
    pub fn check(&self, snapshot: &BoutSnapshot) -> Result<(), ScriptError> {
        check_field("is_match_over", self.is_match_over.as_ref(), &snapshot.is_match_over)?;
        check_field("match_winner", self.match_winner.as_ref(), &snapshot.match_winner)?;
        check_field("current_round", self.current_round.as_ref(), &snapshot.current_round)?;
        check_field("round_winners", self.round_winners.as_ref(), &snapshot.round_winners)?;
        Ok(())
    }
}

fn check_field<T: PartialEq + std::fmt::Debug>(
    field: &'static str,
    expected: Option<&T>,
    actual: &T,
) -> Result<(), ScriptError> {
    match expected {
        Some(expected) if expected != actual => Err(ScriptError::ExpectationFailed {
            field,
            expected: format!("{expected:?}"),
            actual: format!("{actual:?}"),
        }),
        _ => Ok(()),
    }
}

/// A complete bout script.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BoutScript {
    /// Script name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Bout configuration.
    pub config: MatchConfig,
    /// Steps applied in order.
    pub steps: Vec<ScriptStep>,
    /// Checks on the final state.
    pub expect: Expectations,
}

/// Result of running a script.
#[derive(Debug, Clone)]
pub struct ScriptReport {
    /// Script name.
    pub name: String,
    /// Steps applied.
    pub steps: usize,
    /// Every response produced, in order.
    pub responses: Vec<Response>,
    /// Final state.
    pub snapshot: BoutSnapshot,
    /// Final state hash.
    pub hash: u64,
}

impl ScriptReport {
    /// Rounds concluded during the script.
    pub fn conclusions(&self) -> impl Iterator<Item = &RoundConclusion> {
        self.responses.iter().filter_map(|response| match response {
            Response::RoundOver { conclusion } => Some(conclusion),
            _ => None,
        })
    }
}

impl BoutScript {
    /// Load a script from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScriptError> {
        let contents = read_file(path.as_ref())?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON string (useful for embedded scripts).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScriptError> {
        let script: BoutScript = ron::from_str(ron)?;
        script.config.validate()?;
        Ok(script)
    }

    /// Run every step on a fresh bout and check the expectations.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::Bout`] for an invalid configuration and
    /// [`ScriptError::ExpectationFailed`] if the final state disagrees.
    pub fn run(&self) -> Result<ScriptReport, ScriptError> {
        let report = self.execute()?;
        self.expect.check(&report.snapshot)?;
        Ok(report)
    }

    /// Run every step on a fresh bout without checking expectations.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::Bout`] for an invalid configuration.
    pub fn execute(&self) -> Result<ScriptReport, ScriptError> {
        let mut runner = HeadlessRunner::with_config(HeadlessConfig {
            auto_state_output: false,
            match_config: self.config.clone(),
        })?;

        tracing::info!(script = %self.name, steps = self.steps.len(), "Running bout script");

        let mut responses = Vec::new();
        for step in &self.steps {
            responses.extend(runner.handle(&step.to_command()));
        }

        let report = ScriptReport {
            name: self.name.clone(),
            steps: self.steps.len(),
            responses,
            snapshot: runner.bout().snapshot(),
            hash: runner.bout().state_hash(),
        };
        tracing::info!(
            script = %self.name,
            match_over = report.snapshot.is_match_over,
            winner = ?report.snapshot.match_winner,
            hash = report.hash,
            "Script finished"
        );
        Ok(report)
    }
}

/// Load and validate a match configuration from a RON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or validated.
pub fn load_match_config<P: AsRef<Path>>(path: P) -> Result<MatchConfig, ScriptError> {
    let contents = read_file(path.as_ref())?;
    let config: MatchConfig = ron::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

fn read_file(path: &Path) -> Result<String, ScriptError> {
    if !path.exists() {
        return Err(ScriptError::FileNotFound(path.display().to_string()));
    }
    Ok(std::fs::read_to_string(path)?)
}

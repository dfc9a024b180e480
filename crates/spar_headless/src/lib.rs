//! Headless bout runner for operator consoles and CI verification.
//!
//! This crate drives a [`spar_core::bout::Bout`] from JSON commands on
//! stdin, with responses on stdout. This enables:
//!
//! - **Console integration**: any process that speaks JSON lines can run
//!   the scoreboard without linking Rust code
//! - **CI verification**: scripted bouts assert on final results
//! - **Replay verification**: identical command streams produce identical
//!   state hashes
//!
//! # Protocol
//!
//! Communication uses JSON lines (one JSON object per line):
//!
//! - **stdin**: Commands from the console (tick, hit, penalty, etc.)
//! - **stdout**: Responses and state (JSON)
//! - **stderr**: Logs (human-readable)
//!
//! See [`protocol`] module for the full command/response format.
//!
//! # Example
//!
//! ```bash
//! # Run interactively
//! echo '{"cmd":"query"}' | cargo run -p spar_headless
//!
//! # Run a bout script
//! cargo run -p spar_headless -- script crates/spar_headless/scripts/split_decision.ron
//!
//! # Check a configuration file
//! cargo run -p spar_headless -- validate match.ron
//! ```

pub mod protocol;
pub mod runner;
pub mod script;

pub use protocol::{Command, Response};
pub use runner::{HeadlessConfig, HeadlessRunner, SessionSummary};
pub use script::{load_match_config, BoutScript, Expectations, ScriptError, ScriptReport, ScriptStep};

//! JSON protocol for headless bout control.
//!
//! The headless runner communicates via JSON lines (one JSON object per line):
//!
//! **Input (stdin):** Commands from the operator console
//! **Output (stdout):** Responses and state updates
//!
//! # Protocol Flow
//!
//! 1. Runner starts, outputs `{"type":"ready","version":"1.0",...}`
//! 2. The console sends commands as JSON lines
//! 3. Every command is answered by one or more responses
//! 4. A concluded round adds `round_over`, a finished match `match_over`
//!
//! # Example Session
//!
//! ```text
//! <- {"type":"ready","version":"1.0","match_id":"final"}
//! -> {"cmd":"start"}
//! <- {"type":"ack","cmd":"start"}
//! -> {"cmd":"tick","ms":10,"count":100}
//! <- {"type":"ack","cmd":"tick"}
//! -> {"cmd":"hit","player":"red","category":"head_crit"}
//! <- {"type":"hit","outcome":{"result":"accepted","ko_occurred":false,...}}
//! -> {"cmd":"query"}
//! <- {"type":"state","state":{...},"hash":1234}
//! ```

use serde::{Deserialize, Serialize};
use spar_core::prelude::{
    BoutSnapshot, HistoryEntry, HitCategory, HitOutcome, MatchState, Player, RoundConclusion,
};
use spar_core::timer::{BREAK_TICK_MS, ROUND_TICK_MS};

/// Protocol version announced in the ready message.
pub const PROTOCOL_VERSION: &str = "1.0";

// ============================================================================
// Input Commands (Console -> Runner)
// ============================================================================

/// Commands that can be sent to the headless runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// Advance the round clock `count` times by `ms`.
    Tick {
        #[serde(default = "default_round_tick")]
        ms: u64,
        #[serde(default = "default_count")]
        count: u32,
    },

    /// Advance the break clock `count` times by `ms`.
    TickBreak {
        #[serde(default = "default_break_tick")]
        ms: u64,
        #[serde(default = "default_count")]
        count: u32,
    },

    /// Advance the cooldown clock without running either round clock.
    Wait { ms: u64 },

    /// Register a hit.
    Hit {
        player: Player,
        category: HitCategory,
    },

    /// Apply a penalty.
    Penalty { player: Player },

    /// Withdraw a penalty.
    RemovePenalty { player: Player },

    /// Flip the round clock.
    Toggle,

    /// Start the round clock.
    Start,

    /// Pause the round clock.
    Pause,

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

    /// Change configuration at runtime. Omitted fields are left alone.
    Configure {
        #[serde(default)]
        max_health: Option<u32>,
        #[serde(default)]
        max_mana: Option<u32>,
        #[serde(default)]
        round_duration_ms: Option<u64>,
        #[serde(default)]
        break_duration_ms: Option<u64>,
        #[serde(default)]
        match_id: Option<String>,
    },

    /// Replace a corner's name and avatar.
    Identity {
        player: Player,
        name: String,
        #[serde(default)]
        avatar: Option<String>,
    },

    /// Query current bout state.
    Query,

    /// Report the current state hash.
    Hash,

    /// Quit the session.
    Quit,
}

fn default_round_tick() -> u64 {
    ROUND_TICK_MS
}

fn default_break_tick() -> u64 {
    BREAK_TICK_MS
}

fn default_count() -> u32 {
    1
}

// ============================================================================
// Output Responses (Runner -> Console)
// ============================================================================

/// Responses sent from the headless runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Runner is ready to accept commands.
    Ready { version: String, match_id: String },

    /// Acknowledgment of a command.
    Ack { cmd: String },

    /// Error processing a command.
    Error {
        message: String,
        cmd: Option<String>,
    },

    /// Result of a hit.
    Hit { outcome: HitOutcome },

    /// Result of a penalty.
    Penalty {
        player: Player,
        applied: bool,
        disqualified: bool,
    },

    /// Result of an undo.
    Undone { entry: Option<HistoryEntry> },

    /// A round concluded.
    RoundOver { conclusion: RoundConclusion },

    /// The match finished.
    MatchOver {
        winner: Option<Player>,
        red_won: u8,
        blue_won: u8,
    },

    /// Current bout state.
    State { state: BoutSnapshot, hash: u64 },

    /// State hash for replay verification.
    StateHash { round: u8, hash: u64 },

    /// Goodbye message before shutdown.
    Bye,
}

// ============================================================================
// Helpers
// ============================================================================

impl Response {
    /// Create a ready response.
    pub fn ready(match_id: &str) -> Self {
        Self::Ready {
            version: PROTOCOL_VERSION.to_string(),
            match_id: match_id.to_string(),
        }
    }

    /// Create an acknowledgment.
    pub fn ack(cmd: &str) -> Self {
        Self::Ack {
            cmd: cmd.to_string(),
        }
    }

    /// Create an error response.
    pub fn error(message: impl Into<String>, cmd: Option<&str>) -> Self {
        Self::Error {
            message: message.into(),
            cmd: cmd.map(String::from),
        }
    }

    /// Responses announcing a concluded round, and the match if it ended.
    pub fn for_conclusion(conclusion: RoundConclusion, state: &MatchState) -> Vec<Self> {
        let mut responses = vec![Self::RoundOver { conclusion }];
        if conclusion.match_over {
            responses.push(Self::MatchOver {
                winner: conclusion.match_winner,
                red_won: state.wins(Player::Red),
                blue_won: state.wins(Player::Blue),
            });
        }
        responses
    }

    /// Whether this is an error response.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Serialize to JSON line (with newline).
    pub fn to_json_line(&self) -> String {
        let mut json = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"type":"error","message":"Serialization failed: {e}"}}"#)
        });
        json.push('\n');
        json
    }
}

impl Command {
    /// Parse from a JSON line.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Get command name for acknowledgment.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tick { .. } => "tick",
            Self::TickBreak { .. } => "tick_break",
            Self::Wait { .. } => "wait",
            Self::Hit { .. } => "hit",
            Self::Penalty { .. } => "penalty",
            Self::RemovePenalty { .. } => "remove_penalty",
            Self::Toggle => "toggle",
            Self::Start => "start",
            Self::Pause => "pause",
            Self::EndRound => "end_round",
            Self::Undo => "undo",
            Self::ResetRound => "reset_round",
            Self::ResetMatch => "reset_match",
            Self::CloseResult => "close_result",
            Self::Configure { .. } => "configure",
            Self::Identity { .. } => "identity",
            Self::Query => "query",
            Self::Hash => "hash",
            Self::Quit => "quit",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tick_command() {
        let json = r#"{"cmd":"tick","ms":10,"count":60}"#;
        let cmd = Command::from_json(json).unwrap();
        assert_eq!(cmd, Command::Tick { ms: 10, count: 60 });
    }

    #[test]
    fn test_default_tick_values() {
        let cmd = Command::from_json(r#"{"cmd":"tick"}"#).unwrap();
        assert_eq!(
            cmd,
            Command::Tick {
                ms: ROUND_TICK_MS,
                count: 1
            }
        );

        let cmd = Command::from_json(r#"{"cmd":"tick_break"}"#).unwrap();
        assert_eq!(
            cmd,
            Command::TickBreak {
                ms: BREAK_TICK_MS,
                count: 1
            }
        );
    }

    #[test]
    fn test_parse_hit_command() {
        let json = r#"{"cmd":"hit","player":"blue","category":"head_crit"}"#;
        let cmd = Command::from_json(json).unwrap();
        assert_eq!(
            cmd,
            Command::Hit {
                player: Player::Blue,
                category: HitCategory::HeadCrit
            }
        );
        assert_eq!(cmd.name(), "hit");
    }

    #[test]
    fn test_parse_configure_with_omitted_fields() {
        let json = r#"{"cmd":"configure","max_health":150}"#;
        let cmd = Command::from_json(json).unwrap();
        assert!(matches!(
            cmd,
            Command::Configure {
                max_health: Some(150),
                max_mana: None,
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_command_is_error() {
        assert!(Command::from_json(r#"{"cmd":"teleport"}"#).is_err());
        assert!(Command::from_json(r#"{"cmd":"hit","player":"green","category":"body_kick"}"#).is_err());
    }

    #[test]
    fn test_serialize_responses() {
        let json = Response::ready("m-1").to_json_line();
        assert!(json.contains(r#""type":"ready""#));
        assert!(json.contains(r#""match_id":"m-1""#));
        assert!(json.ends_with('\n'));

        let json = Response::StateHash { round: 2, hash: 99 }.to_json_line();
        assert!(json.contains(r#""type":"state_hash""#));
        assert!(json.contains(r#""round":2"#));

        let json = Response::MatchOver {
            winner: None,
            red_won: 1,
            blue_won: 1,
        }
        .to_json_line();
        assert!(json.contains(r#""winner":null"#));
    }
}

//! # Spar Core
//!
//! Scoring and timing state machine for two-corner sparring bouts.
//!
//! This crate contains **only** match logic:
//! - No rendering
//! - No IO
//! - No global state (every bout is an explicit [`bout::Bout`] value)
//!
//! Hosts feed it elapsed time and operator commands and read the resulting
//! state back after each call. A display, a settings form or a network
//! relay are all thin consumers of [`bout::BoutSnapshot`].
//!
//! ## Crate Structure
//!
//! - [`hit_catalog`] - Damage and points per hit category
//! - [`timer`] - Round and break clocks
//! - [`combatant`] - Per-corner health, mana and score ledger
//! - [`orchestrator`] - Round progression and winner determination
//! - [`history`] - Bounded undo log
//! - [`bout`] - The facade tying them together
//! - [`config`] - Match configuration

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod bout;
pub mod clock;
pub mod combatant;
pub mod config;
pub mod error;
pub mod history;
pub mod hit_catalog;
pub mod orchestrator;
pub mod player;
pub mod timer;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::bout::{
        Bout, BoutSnapshot, HitReport, PenaltyReport, RoundConclusion, RoundEndReason,
        TimerSnapshot,
    };
    pub use crate::clock::{Clock, ManualClock, MonotonicClock};
    pub use crate::combatant::{
        CombatantData, CombatantLedger, HitOutcome, HitRejection, PenaltyOutcome,
    };
    pub use crate::config::{CombatantIdentity, MatchConfig};
    pub use crate::error::{BoutError, Result};
    pub use crate::history::{HistoryEntry, HistoryLog, HitEntry, PenaltyEntry};
    pub use crate::hit_catalog::{HitCategory, HitClass, HitProfile};
    pub use crate::orchestrator::{declare_winner, MatchState};
    pub use crate::player::Player;
    pub use crate::timer::{RoundTimer, TimerDisplay, TimerPhase};
}

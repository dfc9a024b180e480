//! A single bout: ledger, timer, orchestrator and history behind one facade.
//!
//! [`Bout`] is the only type a host needs. It is driven by two kinds of
//! stimulus, processed strictly in call order:
//!
//! - elapsed time, via [`Bout::tick`] and [`Bout::tick_break`]
//! - operator commands (hits, penalties, timer controls, undo, resets)
//!
//! Every mutating call leaves the bout in a consistent state and reports
//! what happened through its return value. Nothing in here performs IO.
//!
//! # Round-end contract
//!
//! A round ends on knockout, disqualification, clock exhaustion or an
//! operator override. The sequence is always the same:
//!
//! 1. decide the round with [`declare_winner`]
//! 2. save both scores for the round
//! 3. record the round winner
//! 4. mark the round ended and stop the clock
//! 5. start the break, unless the match is over
//!
//! When the break clock runs out the ledger is reset and the next round is
//! armed exactly once.
//!
//! # Example
//!
//! ```
//! use spar_core::prelude::*;
//!
//! let clock = ManualClock::new(0);
//! let mut bout = Bout::with_clock(MatchConfig::default(), clock.clone()).unwrap();
//!
//! bout.start_timer();
//! let report = bout.record_hit(Player::Red, HitCategory::HeadCrit);
//! assert!(report.outcome.accepted());
//! assert_eq!(bout.combatant(Player::Blue).health, 95);
//!
//! clock.advance(1_000);
//! bout.tick(1_000);
//! assert_eq!(bout.timer().time_left_ms(), 119_000);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::clock::{Clock, MonotonicClock};
use crate::combatant::{CombatantData, CombatantLedger, HitOutcome, HitRejection, PenaltyOutcome};
use crate::config::{CombatantIdentity, MatchConfig};
use crate::error::{BoutError, Result};
use crate::hit_catalog::HitCategory;
use crate::history::{HistoryEntry, HistoryLog};
use crate::orchestrator::{declare_winner, MatchState};
use crate::player::Player;
use crate::timer::{RoundTimer, TimerDisplay, TimerPhase};

/// Why a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundEndReason {
    /// A combatant's health reached zero.
    Knockout,
    /// A combatant ran out of mana.
    Disqualification,
    /// The round clock ran out.
    TimeExpired,
    /// The operator closed the round.
    Operator,
}

/// Result of a concluded round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundConclusion {
    /// Round that concluded, starting at one.
    pub round: u8,
    /// Round winner; `None` for a tie.
    pub winner: Option<Player>,
    /// What ended the round.
    pub reason: RoundEndReason,
    /// Whether this round ended the match.
    pub match_over: bool,
    /// Match winner once the match is over; `None` for a draw.
    pub match_winner: Option<Player>,
}

/// Result of [`Bout::record_hit`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitReport {
    /// What the ledger did with the hit.
    pub outcome: HitOutcome,
    /// Set when the hit knocked the opponent out.
    pub conclusion: Option<RoundConclusion>,
}

/// Result of an applied [`Bout::add_penalty`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyReport {
    /// What the ledger did with the penalty.
    pub outcome: PenaltyOutcome,
    /// Set when the penalty disqualified the corner.
    pub conclusion: Option<RoundConclusion>,
}

/// Timer fields as seen by a display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    /// Derived phase.
    pub phase: TimerPhase,
    /// Remaining round time.
    pub time_left_ms: u64,
    /// Remaining break time.
    pub break_time_left_ms: u64,
    /// Round clock running.
    pub is_running: bool,
    /// Break clock active.
    pub is_break_time: bool,
    /// Current round was started.
    pub round_started: bool,
    /// Current round has ended.
    pub round_ended: bool,
    /// Final-countdown blink active.
    pub final_countdown: bool,
    /// Rendered clock.
    pub display: TimerDisplay,
}

/// Read-only view of a bout for display consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoutSnapshot {
    /// Match identifier.
    pub match_id: String,
    /// Round in progress.
    pub current_round: u8,
    /// Scheduled rounds.
    pub max_rounds: u8,
    /// Red corner record.
    pub red: CombatantData,
    /// Blue corner record.
    pub blue: CombatantData,
    /// Health and score ceiling.
    pub max_health: u32,
    /// Penalty budget ceiling.
    pub max_mana: u32,
    /// Clock state.
    pub timer: TimerSnapshot,
    /// Decided rounds; `None` marks a tie.
    pub round_winners: Vec<Option<Player>>,
    /// Red round wins.
    pub red_won: u8,
    /// Blue round wins.
    pub blue_won: u8,
    /// Latched match winner.
    pub match_winner: Option<Player>,
    /// Match finished.
    pub is_match_over: bool,
    /// Result not yet acknowledged.
    pub result_pending: bool,
    /// Undoable actions available.
    pub undo_depth: usize,
}

/// One bout between the red and blue corners.
#[derive(Debug, Clone)]
pub struct Bout<C: Clock = MonotonicClock> {
    config: MatchConfig,
    ledger: CombatantLedger,
    timer: RoundTimer,
    state: MatchState,
    history: HistoryLog,
    clock: C,
}

impl Bout<MonotonicClock> {
    /// Create a bout timed by the process monotonic clock.
    ///
    /// # Errors
    ///
    /// Returns [`BoutError::InvalidConfig`] if the configuration is invalid.
    pub fn new(config: MatchConfig) -> Result<Self> {
        Self::with_clock(config, MonotonicClock::new())
    }
}

impl<C: Clock> Bout<C> {
    /// Create a bout timed by `clock`.
    ///
    /// # Errors
    ///
    /// Returns [`BoutError::InvalidConfig`] if the configuration is invalid.
    pub fn with_clock(config: MatchConfig, clock: C) -> Result<Self> {
        config.validate()?;

        let bout = Self {
            ledger: CombatantLedger::new(&config),
            timer: RoundTimer::new(config.round_duration_ms, config.break_duration_ms),
            state: MatchState::new(&config),
            history: HistoryLog::new(config.history_capacity),
            clock,
            config,
        };
        tracing::debug!(
            match_id = %bout.state.match_id(),
            max_rounds = bout.config.max_rounds,
            "Bout created"
        );
        Ok(bout)
    }

    // ------------------------------------------------------------------
    // Time
    // ------------------------------------------------------------------

    /// Advance the round clock.
    ///
    /// Returns the conclusion if the clock ran out on this tick.
    pub fn tick(&mut self, delta_ms: u64) -> Option<RoundConclusion> {
        if !self.timer.tick(delta_ms) {
            return None;
        }
        Some(self.conclude_round(RoundEndReason::TimeExpired))
    }

    /// Advance the break clock.
    ///
    /// Returns `true` if the break finished and the next round was armed.
    pub fn tick_break(&mut self, delta_ms: u64) -> bool {
        if !self.timer.tick_break(delta_ms) {
            return false;
        }
        if self.state.is_match_over() {
            return false;
        }

        self.ledger.reset_round_stats();
        self.state.next_round();
        self.timer.reset();
        self.history.clear();
        tracing::debug!(round = self.state.current_round(), "Break over, round armed");
        self.check_invariants();
        true
    }

    /// Flip the round clock. Returns the new running state.
    pub fn toggle_timer(&mut self) -> bool {
        if self.state.is_match_over() {
            return false;
        }
        self.timer.toggle()
    }

    /// Start the round clock.
    pub fn start_timer(&mut self) {
        if self.state.is_match_over() {
            return;
        }
        self.timer.start();
    }

    /// Pause the round clock.
    pub fn pause_timer(&mut self) {
        self.timer.pause();
    }

    // ------------------------------------------------------------------
    // Scoring
    // ------------------------------------------------------------------

    /// Register a hit scored by `player`.
    ///
    /// A knockout concludes the round immediately.
    pub fn record_hit(&mut self, player: Player, category: HitCategory) -> HitReport {
        let now_ms = self.clock.now_ms();
        let outcome = self.ledger.record_hit(
            player,
            category,
            self.timer.is_running(),
            self.timer.is_break_time(),
            now_ms,
        );

        let conclusion = match &outcome {
            HitOutcome::Rejected { reason } => {
                tracing::trace!(%player, ?category, ?reason, "Hit rejected");
                None
            }
            HitOutcome::Accepted { ko_occurred, entry } => {
                self.history.push(entry.clone());
                if *ko_occurred {
                    tracing::debug!(%player, ?category, "Knockout");
                    Some(self.conclude_round(RoundEndReason::Knockout))
                } else {
                    self.check_invariants();
                    None
                }
            }
        };

        HitReport {
            outcome,
            conclusion,
        }
    }

    /// Whether the clocks would reject a hit right now, ignoring cooldown.
    #[must_use]
    pub const fn hit_gate(&self) -> Option<HitRejection> {
        if self.timer.is_break_time() {
            Some(HitRejection::BreakTime)
        } else if !self.timer.is_running() {
            Some(HitRejection::TimerStopped)
        } else {
            None
        }
    }

    /// Whether penalties can currently be applied.
    ///
    /// Penalties are accepted before the round starts and while paused,
    /// but not during a break, after the round ended or after the match.
    #[must_use]
    pub const fn accepts_penalties(&self) -> bool {
        !self.timer.is_break_time() && !self.timer.round_ended() && !self.state.is_match_over()
    }

    /// Penalise `player`. Returns `None` if penalties are locked.
    ///
    /// Exhausting the corner's mana concludes the round immediately.
    pub fn add_penalty(&mut self, player: Player) -> Option<PenaltyReport> {
        if !self.accepts_penalties() {
            tracing::trace!(%player, phase = ?self.timer.phase(), "Penalty rejected");
            return None;
        }

        let outcome = self.ledger.add_penalty(player);
        self.history.push(outcome.entry);

        let conclusion = if outcome.disqualified {
            tracing::debug!(%player, fouls = self.ledger.get(player).fouls, "Disqualification");
            Some(self.conclude_round(RoundEndReason::Disqualification))
        } else {
            self.check_invariants();
            None
        };

        Some(PenaltyReport {
            outcome,
            conclusion,
        })
    }

    /// Withdraw one penalty from `player`. Not recorded in history.
    pub fn remove_penalty(&mut self, player: Player) -> bool {
        if !self.accepts_penalties() {
            return false;
        }
        let removed = self.ledger.remove_penalty(player);
        if !removed {
            tracing::trace!(%player, "No penalty to remove");
        }
        removed
    }

    /// Revert the newest recorded hit or penalty of the current round.
    pub fn undo(&mut self) -> Option<HistoryEntry> {
        let entry = self.history.pop()?;
        self.ledger.apply_undo(&entry);
        tracing::debug!(player = %entry.player(), remaining = self.history.len(), "Undo");
        self.check_invariants();
        Some(entry)
    }

    /// Close the current round on the operator's decision.
    ///
    /// Returns `None` if no round is in progress.
    pub fn end_round(&mut self) -> Option<RoundConclusion> {
        if self.timer.is_break_time() || self.timer.round_ended() || self.state.is_match_over() {
            return None;
        }
        Some(self.conclude_round(RoundEndReason::Operator))
    }

    fn conclude_round(&mut self, reason: RoundEndReason) -> RoundConclusion {
        let round = self.state.current_round();
        let winner = declare_winner(self.ledger.red(), self.ledger.blue());

        self.ledger.save_round_scores(usize::from(round - 1));
        self.state.record_round_winner(winner);
        self.timer.set_round_ended(true);
        self.history.clear();

        let match_over = self.state.evaluate_match_end();
        if !match_over {
            self.timer.start_break();
        }

        tracing::info!(
            round,
            winner = ?winner,
            reason = ?reason,
            red_won = self.state.wins(Player::Red),
            blue_won = self.state.wins(Player::Blue),
            "Round concluded"
        );
        if match_over {
            tracing::info!(
                match_id = %self.state.match_id(),
                winner = ?self.state.match_winner(),
                "Match over"
            );
        }

        self.check_invariants();
        RoundConclusion {
            round,
            winner,
            reason,
            match_over,
            match_winner: self.state.match_winner(),
        }
    }

    // ------------------------------------------------------------------
    // Resets
    // ------------------------------------------------------------------

    /// Restart the current round from full health and a full clock.
    ///
    /// Returns `false` during a break or after the match is over.
    pub fn reset_round(&mut self) -> bool {
        if self.timer.is_break_time() || self.state.is_match_over() {
            return false;
        }
        self.ledger.reset_round_stats();
        self.timer.reset();
        self.history.clear();
        tracing::debug!(round = self.state.current_round(), "Round reset");
        true
    }

    /// Return to round one with everything cleared.
    pub fn reset_match(&mut self) {
        self.ledger.reset_all();
        self.state.reset();
        self.timer.reset();
        self.history.clear();
        tracing::debug!(match_id = %self.state.match_id(), "Match reset");
    }

    /// Acknowledge the match result. The winner stays latched.
    pub fn close_match_result(&mut self) -> bool {
        self.state.close_match_result()
    }

    // ------------------------------------------------------------------
    // Runtime configuration
    // ------------------------------------------------------------------

    /// Change the health ceiling; both corners return to full health.
    ///
    /// Clears the undo history, since recorded health values would exceed
    /// the new ceiling.
    ///
    /// # Errors
    ///
    /// Returns [`BoutError::InvalidConfig`] for zero.
    pub fn set_max_health(&mut self, max_health: u32) -> Result<()> {
        if max_health == 0 {
            return Err(BoutError::zero("max_health"));
        }
        self.config.max_health = max_health;
        self.ledger.set_max_health(max_health);
        self.history.clear();
        Ok(())
    }

    /// Change the penalty budget; mana is re-based against current fouls.
    ///
    /// If the new budget leaves a corner with no mana during a live round,
    /// that corner is disqualified and the round concluded.
    ///
    /// # Errors
    ///
    /// Returns [`BoutError::InvalidConfig`] for zero.
    pub fn set_max_mana(&mut self, max_mana: u32) -> Result<Option<RoundConclusion>> {
        if max_mana == 0 {
            return Err(BoutError::zero("max_mana"));
        }
        self.config.max_mana = max_mana;
        self.ledger.set_max_mana(max_mana);
        self.history.clear();

        let disqualified = Player::ALL
            .into_iter()
            .find(|&player| self.ledger.get(player).is_disqualified());
        match disqualified {
            Some(player) if self.accepts_penalties() => {
                tracing::debug!(%player, max_mana, "Disqualified by penalty budget change");
                Ok(Some(self.conclude_round(RoundEndReason::Disqualification)))
            }
            _ => {
                self.check_invariants();
                Ok(None)
            }
        }
    }

    /// Change the round length. Applies now if the round has not started.
    ///
    /// # Errors
    ///
    /// Returns [`BoutError::InvalidConfig`] for zero.
    pub fn set_round_duration(&mut self, round_duration_ms: u64) -> Result<()> {
        if round_duration_ms == 0 {
            return Err(BoutError::zero("round_duration_ms"));
        }
        self.config.round_duration_ms = round_duration_ms;
        self.timer.set_round_duration(round_duration_ms);
        Ok(())
    }

    /// Change the break length. A running break keeps its remaining time.
    ///
    /// # Errors
    ///
    /// Returns [`BoutError::InvalidConfig`] for zero.
    pub fn set_break_duration(&mut self, break_duration_ms: u64) -> Result<()> {
        if break_duration_ms == 0 {
            return Err(BoutError::zero("break_duration_ms"));
        }
        self.config.break_duration_ms = break_duration_ms;
        self.timer.set_break_duration(break_duration_ms);
        Ok(())
    }

    /// Replace a corner's name and avatar.
    pub fn set_identity(&mut self, player: Player, identity: CombatantIdentity) {
        match player {
            Player::Red => self.config.red = identity.clone(),
            Player::Blue => self.config.blue = identity.clone(),
        }
        self.ledger.set_identity(player, identity);
    }

    /// Replace the match identifier.
    pub fn set_match_id(&mut self, match_id: impl Into<String>) {
        let match_id = match_id.into();
        self.config.match_id.clone_from(&match_id);
        self.state.set_match_id(match_id);
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Active configuration, including runtime changes.
    #[must_use]
    pub const fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// A corner's record.
    #[must_use]
    pub const fn combatant(&self, player: Player) -> &CombatantData {
        self.ledger.get(player)
    }

    /// The scoring ledger.
    #[must_use]
    pub const fn ledger(&self) -> &CombatantLedger {
        &self.ledger
    }

    /// The round and break clocks.
    #[must_use]
    pub const fn timer(&self) -> &RoundTimer {
        &self.timer
    }

    /// Round and match progression.
    #[must_use]
    pub const fn state(&self) -> &MatchState {
        &self.state
    }

    /// Undo history of the current round.
    #[must_use]
    pub const fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// The clock used for hit cooldowns.
    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Serializable view for display consumers.
    #[must_use]
    pub fn snapshot(&self) -> BoutSnapshot {
        BoutSnapshot {
            match_id: self.state.match_id().to_string(),
            current_round: self.state.current_round(),
            max_rounds: self.state.max_rounds(),
            red: self.ledger.red().clone(),
            blue: self.ledger.blue().clone(),
            max_health: self.ledger.max_health(),
            max_mana: self.ledger.max_mana(),
            timer: TimerSnapshot {
                phase: self.timer.phase(),
                time_left_ms: self.timer.time_left_ms(),
                break_time_left_ms: self.timer.break_time_left_ms(),
                is_running: self.timer.is_running(),
                is_break_time: self.timer.is_break_time(),
                round_started: self.timer.round_started(),
                round_ended: self.timer.round_ended(),
                final_countdown: self.timer.is_final_countdown(),
                display: self.timer.display(),
            },
            round_winners: self.state.round_winners().to_vec(),
            red_won: self.state.wins(Player::Red),
            blue_won: self.state.wins(Player::Blue),
            match_winner: self.state.match_winner(),
            is_match_over: self.state.is_match_over(),
            result_pending: self.state.result_pending(),
            undo_depth: self.history.len(),
        }
    }

    /// Hash of the scoring state.
    ///
    /// Two bouts fed the same commands produce the same hash. The clock is
    /// not part of the hash.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.ledger.hash(&mut hasher);
        self.timer.hash(&mut hasher);
        self.state.hash(&mut hasher);
        self.history.hash(&mut hasher);
        let hash = hasher.finish();

        #[cfg(debug_assertions)]
        {
            tracing::debug!(round = self.state.current_round(), state_hash = hash, "Bout state hash");
        }

        hash
    }

    #[cfg(feature = "debug-validation")]
    fn check_invariants(&self) {
        let max_health = self.ledger.max_health();
        let max_mana = self.ledger.max_mana();
        for player in Player::ALL {
            let data = self.ledger.get(player);
            assert!(data.health <= max_health, "{player} health above ceiling");
            assert!(data.score <= max_health, "{player} score above ceiling");
            assert!(data.mana <= max_mana, "{player} mana above ceiling");
        }
        assert!(
            !(self.timer.is_running() && self.timer.is_break_time()),
            "round and break clocks both running"
        );
        assert!(
            self.state.current_round() >= 1 && self.state.current_round() <= self.state.max_rounds(),
            "round out of range"
        );
        assert!(self.history.len() <= self.history.capacity());
    }

    #[cfg(not(feature = "debug-validation"))]
    #[allow(clippy::unused_self)]
    fn check_invariants(&self) {}
}

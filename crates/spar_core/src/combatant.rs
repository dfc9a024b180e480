//! Per-combatant scoring ledger.
//!
//! The ledger owns both combatants' records and applies hits and penalties
//! to them. Every operation either applies completely or not at all.
//!
//! Clamping rules:
//! - Health never drops below zero
//! - Score never exceeds the health ceiling (a full depletion in points is
//!   worth the same as a knockout)
//! - Mana never drops below zero and never exceeds its ceiling

use serde::{Deserialize, Serialize};

use crate::config::{CombatantIdentity, MatchConfig};
use crate::hit_catalog::HitCategory;
use crate::history::{HistoryEntry, HitEntry, PenaltyEntry};
use crate::player::Player;

/// One combatant's mutable record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatantData {
    /// Display identity.
    pub identity: CombatantIdentity,
    /// Remaining health; zero is a knockout.
    pub health: u32,
    /// Points scored this round.
    pub score: u32,
    /// Accepted hits this round.
    pub hits: u32,
    /// Penalties this round.
    pub fouls: u32,
    /// Remaining penalty budget; zero is a disqualification.
    pub mana: u32,
    /// Damage summed over technique hits this round.
    pub technique: u32,
    /// Mid-tier head kicks this round.
    pub head_hits: u32,
    /// Score saved at the close of each round.
    pub round_scores: Vec<u32>,
}

impl CombatantData {
    /// Create a fresh record at full health and mana.
    #[must_use]
    pub fn new(identity: CombatantIdentity, max_health: u32, max_mana: u32, rounds: u8) -> Self {
        Self {
            identity,
            health: max_health,
            score: 0,
            hits: 0,
            fouls: 0,
            mana: max_mana,
            technique: 0,
            head_hits: 0,
            round_scores: vec![0; usize::from(rounds)],
        }
    }

    /// Whether this combatant has been knocked out.
    #[must_use]
    pub const fn is_knocked_out(&self) -> bool {
        self.health == 0
    }

    /// Whether this combatant has exhausted the penalty budget.
    #[must_use]
    pub const fn is_disqualified(&self) -> bool {
        self.mana == 0
    }

    /// Sum of saved round scores.
    #[must_use]
    pub fn total_score(&self) -> u32 {
        self.round_scores.iter().sum()
    }

    fn reset_round(&mut self, max_health: u32, max_mana: u32) {
        self.health = max_health;
        self.score = 0;
        self.hits = 0;
        self.fouls = 0;
        self.mana = max_mana;
        self.technique = 0;
        self.head_hits = 0;
    }
}

/// Why a hit was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitRejection {
    /// Same corner scored too recently.
    Cooldown,
    /// The break clock is running.
    BreakTime,
    /// The round clock is not running.
    TimerStopped,
}

/// Result of registering a hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum HitOutcome {
    /// The hit was applied.
    Accepted {
        /// The opponent's health reached zero.
        ko_occurred: bool,
        /// Undo record for the hit.
        entry: HitEntry,
    },
    /// The hit was ignored and nothing changed.
    Rejected {
        /// Reason for the rejection.
        reason: HitRejection,
    },
}

impl HitOutcome {
    /// Whether the hit was applied.
    #[must_use]
    pub const fn accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    /// Whether the hit knocked the opponent out.
    #[must_use]
    pub const fn ko_occurred(&self) -> bool {
        matches!(
            self,
            Self::Accepted {
                ko_occurred: true,
                ..
            }
        )
    }
}

/// Result of applying a penalty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyOutcome {
    /// The penalised corner's mana is exhausted.
    pub disqualified: bool,
    /// Undo record for the penalty.
    pub entry: PenaltyEntry,
}

/// Both combatants' records plus the rules that mutate them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatantLedger {
    red: CombatantData,
    blue: CombatantData,
    max_health: u32,
    max_mana: u32,
    hit_cooldown_ms: u64,
    /// Clock reading of each corner's last accepted hit, `[red, blue]`.
    last_hit_ms: [Option<u64>; 2],
}

const fn slot(player: Player) -> usize {
    match player {
        Player::Red => 0,
        Player::Blue => 1,
    }
}

impl CombatantLedger {
    /// Create a ledger from a match configuration.
    #[must_use]
    pub fn new(config: &MatchConfig) -> Self {
        Self {
            red: CombatantData::new(
                config.red.clone(),
                config.max_health,
                config.max_mana,
                config.max_rounds,
            ),
            blue: CombatantData::new(
                config.blue.clone(),
                config.max_health,
                config.max_mana,
                config.max_rounds,
            ),
            max_health: config.max_health,
            max_mana: config.max_mana,
            hit_cooldown_ms: config.hit_cooldown_ms,
            last_hit_ms: [None; 2],
        }
    }

    /// Get a combatant's record.
    #[must_use]
    pub const fn get(&self, player: Player) -> &CombatantData {
        match player {
            Player::Red => &self.red,
            Player::Blue => &self.blue,
        }
    }

    fn get_mut(&mut self, player: Player) -> &mut CombatantData {
        match player {
            Player::Red => &mut self.red,
            Player::Blue => &mut self.blue,
        }
    }

    /// The red corner's record.
    #[must_use]
    pub const fn red(&self) -> &CombatantData {
        &self.red
    }

    /// The blue corner's record.
    #[must_use]
    pub const fn blue(&self) -> &CombatantData {
        &self.blue
    }

    /// Health and score ceiling.
    #[must_use]
    pub const fn max_health(&self) -> u32 {
        self.max_health
    }

    /// Penalty budget ceiling.
    #[must_use]
    pub const fn max_mana(&self) -> u32 {
        self.max_mana
    }

    /// Clock reading of a corner's last accepted hit.
    #[must_use]
    pub const fn last_hit_ms(&self, player: Player) -> Option<u64> {
        self.last_hit_ms[slot(player)]
    }

    /// Register a hit scored by `player` at clock reading `now_ms`.
    ///
    /// Rejected without any change if the same corner scored less than the
    /// cooldown window ago, if the break clock runs, or if the round clock
    /// is stopped. Otherwise the opponent loses the catalog damage, the
    /// scorer gains the catalog points, and the cooldown restarts for this
    /// corner only.
    pub fn record_hit(
        &mut self,
        player: Player,
        category: HitCategory,
        is_timer_running: bool,
        is_break_time: bool,
        now_ms: u64,
    ) -> HitOutcome {
        if let Some(last) = self.last_hit_ms[slot(player)] {
            if now_ms.saturating_sub(last) < self.hit_cooldown_ms {
                return HitOutcome::Rejected {
                    reason: HitRejection::Cooldown,
                };
            }
        }
        if is_break_time {
            return HitOutcome::Rejected {
                reason: HitRejection::BreakTime,
            };
        }
        if !is_timer_running {
            return HitOutcome::Rejected {
                reason: HitRejection::TimerStopped,
            };
        }

        let profile = category.profile();
        let max_health = self.max_health;

        let opponent = self.get_mut(player.opponent());
        let previous_health = opponent.health;
        opponent.health = opponent.health.saturating_sub(profile.damage);
        let health_deduction = previous_health - opponent.health;
        let ko_occurred = opponent.health == 0 && previous_health > 0;

        let scorer = self.get_mut(player);
        let entry = HitEntry {
            player,
            health_key: player.opponent().health_key().to_string(),
            health_deduction,
            points: profile.points,
            previous_health,
            previous_score: scorer.score,
            previous_hits: scorer.hits,
            previous_technique: scorer.technique,
            previous_head_hits: scorer.head_hits,
            category,
            icon_ref: category.icon().to_string(),
        };

        scorer.score = scorer.score.saturating_add(profile.points).min(max_health);
        scorer.hits += 1;
        if profile.is_technique() {
            scorer.technique += profile.damage;
        }
        if profile.is_head_hit() {
            scorer.head_hits += 1;
        }

        self.last_hit_ms[slot(player)] = Some(now_ms);

        HitOutcome::Accepted { ko_occurred, entry }
    }

    /// Penalise a corner: one more foul, one less mana.
    pub fn add_penalty(&mut self, player: Player) -> PenaltyOutcome {
        let record = self.get_mut(player);
        let entry = PenaltyEntry {
            player,
            previous_mana: record.mana,
            previous_fouls: record.fouls,
        };

        record.fouls += 1;
        record.mana = record.mana.saturating_sub(1);

        PenaltyOutcome {
            disqualified: record.mana == 0,
            entry,
        }
    }

    /// Withdraw one penalty from a corner.
    ///
    /// Returns `false` without change if the corner has no fouls.
    pub fn remove_penalty(&mut self, player: Player) -> bool {
        let max_mana = self.max_mana;
        let record = self.get_mut(player);
        if record.fouls == 0 {
            return false;
        }

        record.fouls -= 1;
        record.mana = (record.mana + 1).min(max_mana);
        true
    }

    /// Restore the values captured by a history entry.
    pub fn apply_undo(&mut self, entry: &HistoryEntry) {
        match entry {
            HistoryEntry::Hit(hit) => {
                self.get_mut(hit.player.opponent()).health = hit.previous_health;

                let scorer = self.get_mut(hit.player);
                scorer.score = hit.previous_score;
                scorer.hits = hit.previous_hits;
                scorer.technique = hit.previous_technique;
                scorer.head_hits = hit.previous_head_hits;
            }
            HistoryEntry::Penalty(penalty) => {
                let record = self.get_mut(penalty.player);
                record.mana = penalty.previous_mana;
                record.fouls = penalty.previous_fouls;
            }
        }
    }

    /// Save both current scores into the slot for `round_index`.
    ///
    /// Returns `false` if the index is outside the scheduled rounds.
    pub fn save_round_scores(&mut self, round_index: usize) -> bool {
        if round_index >= self.red.round_scores.len() {
            return false;
        }
        self.red.round_scores[round_index] = self.red.score;
        self.blue.round_scores[round_index] = self.blue.score;
        true
    }

    /// Restore both corners for a new round. Saved round scores are kept.
    pub fn reset_round_stats(&mut self) {
        let (max_health, max_mana) = (self.max_health, self.max_mana);
        self.red.reset_round(max_health, max_mana);
        self.blue.reset_round(max_health, max_mana);
    }

    /// Restore both corners for a new match.
    pub fn reset_all(&mut self) {
        self.reset_round_stats();
        self.red.round_scores.fill(0);
        self.blue.round_scores.fill(0);
        self.last_hit_ms = [None; 2];
    }

    /// Change the health ceiling; both corners are re-based to full health.
    pub fn set_max_health(&mut self, max_health: u32) {
        self.max_health = max_health;
        for player in Player::ALL {
            let record = self.get_mut(player);
            record.health = max_health;
            record.score = record.score.min(max_health);
        }
    }

    /// Change the penalty budget; mana is re-based against current fouls.
    pub fn set_max_mana(&mut self, max_mana: u32) {
        self.max_mana = max_mana;
        for player in Player::ALL {
            let record = self.get_mut(player);
            record.mana = max_mana.saturating_sub(record.fouls);
        }
    }

    /// Replace a corner's display identity.
    pub fn set_identity(&mut self, player: Player, identity: CombatantIdentity) {
        self.get_mut(player).identity = identity;
    }
}

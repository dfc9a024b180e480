//! Bounded undo history.
//!
//! The log keeps copies of the values a scoring action overwrote, so an
//! undo can restore them without knowing how the ledger stores them.
//! Capacity is bounded: pushing onto a full log evicts the oldest entry,
//! while [`HistoryLog::pop`] always returns the newest.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_HISTORY_CAPACITY;
use crate::hit_catalog::HitCategory;
use crate::player::Player;

/// Pre-hit values captured when a hit is accepted.
///
/// The hit was scored by `player`; the health values belong to the
/// opponent, the score values to `player`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HitEntry {
    /// Corner that scored the hit.
    pub player: Player,
    /// Display key of the health bar that was reduced.
    pub health_key: String,
    /// Health actually removed from the opponent (after flooring).
    pub health_deduction: u32,
    /// Points awarded by the catalog.
    pub points: u32,
    /// Opponent health before the hit.
    pub previous_health: u32,
    /// Scorer's score before the hit.
    pub previous_score: u32,
    /// Scorer's hit count before the hit.
    pub previous_hits: u32,
    /// Scorer's technique points before the hit.
    pub previous_technique: u32,
    /// Scorer's head-hit count before the hit.
    pub previous_head_hits: u32,
    /// Category that was scored.
    pub category: HitCategory,
    /// Icon shown next to the hit.
    pub icon_ref: String,
}

/// Pre-penalty values captured when a penalty is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PenaltyEntry {
    /// Penalised corner.
    pub player: Player,
    /// Mana before the penalty.
    pub previous_mana: u32,
    /// Foul count before the penalty.
    pub previous_fouls: u32,
}

/// A reversible scoring action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HistoryEntry {
    /// An accepted hit.
    Hit(HitEntry),
    /// An applied penalty.
    Penalty(PenaltyEntry),
}

impl HistoryEntry {
    /// Corner that performed (or received) the action.
    #[must_use]
    pub fn player(&self) -> Player {
        match self {
            Self::Hit(hit) => hit.player,
            Self::Penalty(penalty) => penalty.player,
        }
    }
}

impl From<HitEntry> for HistoryEntry {
    fn from(entry: HitEntry) -> Self {
        Self::Hit(entry)
    }
}

impl From<PenaltyEntry> for HistoryEntry {
    fn from(entry: PenaltyEntry) -> Self {
        Self::Penalty(entry)
    }
}

/// Bounded stack of undoable actions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoryLog {
    capacity: usize,
    entries: VecDeque<HistoryEntry>,
}

impl HistoryLog {
    /// Create an empty log holding at most `capacity` entries.
    ///
    /// A capacity of zero is treated as one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Append an entry, evicting the oldest if full.
    ///
    /// Returns the evicted entry, if any.
    pub fn push(&mut self, entry: impl Into<HistoryEntry>) -> Option<HistoryEntry> {
        let evicted = if self.entries.len() == self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(entry.into());
        evicted
    }

    /// Remove and return the newest entry.
    pub fn pop(&mut self) -> Option<HistoryEntry> {
        self.entries.pop_back()
    }

    /// Newest entry without removing it.
    #[must_use]
    pub fn peek(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of stored entries.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

//! Round progression and winner determination.
//!
//! [`MatchState`] tracks the round number, who won each round and the win
//! counters. [`declare_winner`] is the tie-break ladder used to decide a
//! round from the two combatant records.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::combatant::CombatantData;
use crate::config::MatchConfig;
use crate::player::Player;

/// Decide a round from the two combatant records.
///
/// Rules, first decisive one wins:
/// 1. Exactly one side is out of mana while both are standing: the side
///    with mana left wins.
/// 2. Exactly one side is knocked out while both have mana: the standing
///    side wins.
/// 3. Higher health.
/// 4. Fewer fouls.
/// 5. Higher technique.
/// 6. More head hits.
///
/// Returns `None` for a tie. The function is pure.
#[must_use]
pub fn declare_winner(red: &CombatantData, blue: &CombatantData) -> Option<Player> {
    let both_standing = red.health > 0 && blue.health > 0;
    if both_standing && red.is_disqualified() != blue.is_disqualified() {
        return Some(if red.is_disqualified() {
            Player::Blue
        } else {
            Player::Red
        });
    }

    let both_have_mana = red.mana > 0 && blue.mana > 0;
    if both_have_mana && red.is_knocked_out() != blue.is_knocked_out() {
        return Some(if red.is_knocked_out() {
            Player::Blue
        } else {
            Player::Red
        });
    }

    let ordering = red
        .health
        .cmp(&blue.health)
        .then_with(|| blue.fouls.cmp(&red.fouls))
        .then_with(|| red.technique.cmp(&blue.technique))
        .then_with(|| red.head_hits.cmp(&blue.head_hits));

    match ordering {
        Ordering::Greater => Some(Player::Red),
        Ordering::Less => Some(Player::Blue),
        Ordering::Equal => None,
    }
}

/// Round and match progression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchState {
    match_id: String,
    current_round: u8,
    max_rounds: u8,
    wins_required: u8,
    round_winners: Vec<Option<Player>>,
    red_won: u8,
    blue_won: u8,
    match_winner: Option<Player>,
    is_match_over: bool,
    result_pending: bool,
}

impl MatchState {
    /// Create the state for round one of a new match.
    #[must_use]
    pub fn new(config: &MatchConfig) -> Self {
        Self {
            match_id: config.match_id.clone(),
            current_round: 1,
            max_rounds: config.max_rounds,
            wins_required: config.wins_required(),
            round_winners: Vec::with_capacity(usize::from(config.max_rounds)),
            red_won: 0,
            blue_won: 0,
            match_winner: None,
            is_match_over: false,
            result_pending: false,
        }
    }

    /// Store the winner of the current round and bump their counter.
    ///
    /// A tie is stored as `None` and counts for nobody. Ignored once the
    /// match is over.
    pub fn record_round_winner(&mut self, winner: Option<Player>) {
        if self.is_match_over {
            return;
        }
        let index = usize::from(self.current_round.saturating_sub(1));
        if self.round_winners.len() <= index {
            self.round_winners.resize(index + 1, None);
        }
        self.round_winners[index] = winner;

        match winner {
            Some(Player::Red) => self.red_won += 1,
            Some(Player::Blue) => self.blue_won += 1,
            None => {}
        }
    }

    /// Advance to the next round. No-op on the last scheduled round.
    pub fn next_round(&mut self) -> bool {
        if self.current_round >= self.max_rounds {
            return false;
        }
        self.current_round += 1;
        true
    }

    /// Latch the match result.
    ///
    /// Returns `false` without change if the match is already over.
    pub fn set_match_over(&mut self, winner: Option<Player>) -> bool {
        if self.is_match_over {
            return false;
        }
        self.is_match_over = true;
        self.match_winner = winner;
        self.result_pending = true;
        true
    }

    /// Acknowledge the result display. The winner stays latched.
    pub fn close_match_result(&mut self) -> bool {
        std::mem::replace(&mut self.result_pending, false)
    }

    /// Latch the match result if the last recorded round ended it.
    ///
    /// The match ends when a side reaches the win target, or when the last
    /// scheduled round has been decided. In the latter case the side with
    /// more round wins takes the match, and equal counts are a draw.
    pub fn evaluate_match_end(&mut self) -> bool {
        if self.is_match_over {
            return true;
        }

        if self.red_won >= self.wins_required {
            self.set_match_over(Some(Player::Red));
        } else if self.blue_won >= self.wins_required {
            self.set_match_over(Some(Player::Blue));
        } else if self.current_round >= self.max_rounds {
            let winner = match self.red_won.cmp(&self.blue_won) {
                Ordering::Greater => Some(Player::Red),
                Ordering::Less => Some(Player::Blue),
                Ordering::Equal => None,
            };
            self.set_match_over(winner);
        }
        self.is_match_over
    }

    /// Return to round one with no results.
    pub fn reset(&mut self) {
        self.current_round = 1;
        self.round_winners.clear();
        self.red_won = 0;
        self.blue_won = 0;
        self.match_winner = None;
        self.is_match_over = false;
        self.result_pending = false;
    }

    /// Replace the match identifier.
    pub fn set_match_id(&mut self, match_id: String) {
        self.match_id = match_id;
    }

    /// Match identifier.
    #[must_use]
    pub fn match_id(&self) -> &str {
        &self.match_id
    }

    /// Round in progress, starting at one.
    #[must_use]
    pub const fn current_round(&self) -> u8 {
        self.current_round
    }

    /// Number of scheduled rounds.
    #[must_use]
    pub const fn max_rounds(&self) -> u8 {
        self.max_rounds
    }

    /// Winners of the rounds decided so far; `None` marks a tied round.
    #[must_use]
    pub fn round_winners(&self) -> &[Option<Player>] {
        &self.round_winners
    }

    /// Round wins for a corner.
    #[must_use]
    pub const fn wins(&self, player: Player) -> u8 {
        match player {
            Player::Red => self.red_won,
            Player::Blue => self.blue_won,
        }
    }

    /// Latched match winner; `None` while running or for a draw.
    #[must_use]
    pub const fn match_winner(&self) -> Option<Player> {
        self.match_winner
    }

    /// Whether the match has finished.
    #[must_use]
    pub const fn is_match_over(&self) -> bool {
        self.is_match_over
    }

    /// Whether the result is waiting to be acknowledged.
    #[must_use]
    pub const fn result_pending(&self) -> bool {
        self.result_pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CombatantIdentity;

    fn record(health: u32, mana: u32, fouls: u32) -> CombatantData {
        let mut data = CombatantData::new(CombatantIdentity::default(), 120, 5, 3);
        data.health = health;
        data.mana = mana;
        data.fouls = fouls;
        data
    }

    #[test]
    fn test_fewer_fouls_wins_on_equal_health() {
        let red = record(80, 5, 1);
        let blue = record(80, 5, 2);
        assert_eq!(declare_winner(&red, &blue), Some(Player::Red));
        assert_eq!(declare_winner(&blue, &red), Some(Player::Blue));
    }

    #[test]
    fn test_mixed_ko_and_disqualification_falls_through_to_health() {
        let red = record(0, 5, 0);
        let blue = record(50, 0, 5);
        assert_eq!(declare_winner(&red, &blue), Some(Player::Blue));
    }

    #[test]
    fn test_disqualification_beats_health() {
        let red = record(10, 5, 0);
        let blue = record(120, 0, 5);
        assert_eq!(declare_winner(&red, &blue), Some(Player::Red));
    }

    #[test]
    fn test_knockout_beats_fouls() {
        let red = record(0, 5, 0);
        let blue = record(5, 1, 4);
        assert_eq!(declare_winner(&red, &blue), Some(Player::Blue));
    }

    #[test]
    fn test_technique_then_head_hits_then_tie() {
        let mut red = record(100, 5, 0);
        let mut blue = record(100, 5, 0);
        assert_eq!(declare_winner(&red, &blue), None);

        blue.head_hits = 2;
        assert_eq!(declare_winner(&red, &blue), Some(Player::Blue));

        red.technique = 20;
        assert_eq!(declare_winner(&red, &blue), Some(Player::Red));
    }

    #[test]
    fn test_early_finish_at_two_wins() {
        let mut state = MatchState::new(&MatchConfig::default());
        state.record_round_winner(Some(Player::Blue));
        assert!(!state.evaluate_match_end());
        assert!(state.next_round());

        state.record_round_winner(Some(Player::Blue));
        assert!(state.evaluate_match_end());
        assert_eq!(state.match_winner(), Some(Player::Blue));
        assert_eq!(state.current_round(), 2);
        assert_eq!(state.round_winners(), &[Some(Player::Blue), Some(Player::Blue)]);
    }

    #[test]
    fn test_tie_counts_for_nobody() {
        let mut state = MatchState::new(&MatchConfig::default());
        state.record_round_winner(None);
        assert_eq!(state.wins(Player::Red), 0);
        assert_eq!(state.wins(Player::Blue), 0);
        assert_eq!(state.round_winners(), &[None]);
    }

    #[test]
    fn test_final_round_draw() {
        let mut state = MatchState::new(&MatchConfig::default());
        state.record_round_winner(Some(Player::Red));
        state.next_round();
        state.record_round_winner(Some(Player::Blue));
        state.next_round();
        state.record_round_winner(None);

        assert!(state.evaluate_match_end());
        assert_eq!(state.match_winner(), None);
        assert!(!state.next_round());
    }

    #[test]
    fn test_final_round_decided_by_count() {
        let mut state = MatchState::new(&MatchConfig::default());
        state.record_round_winner(Some(Player::Red));
        state.next_round();
        state.record_round_winner(None);
        state.next_round();
        state.record_round_winner(None);

        assert!(state.evaluate_match_end());
        assert_eq!(state.match_winner(), Some(Player::Red));
    }

    #[test]
    fn test_match_over_latch() {
        let mut state = MatchState::new(&MatchConfig::default());
        assert!(state.set_match_over(Some(Player::Red)));
        assert!(!state.set_match_over(Some(Player::Blue)));
        assert_eq!(state.match_winner(), Some(Player::Red));

        state.record_round_winner(Some(Player::Blue));
        assert!(state.round_winners().is_empty());
        assert_eq!(state.wins(Player::Blue), 0);

        assert!(state.close_match_result());
        assert!(!state.close_match_result());
        assert_eq!(state.match_winner(), Some(Player::Red));
        assert!(state.is_match_over());

        state.reset();
        assert!(!state.is_match_over());
        assert_eq!(state.match_winner(), None);
        assert_eq!(state.current_round(), 1);
    }
}

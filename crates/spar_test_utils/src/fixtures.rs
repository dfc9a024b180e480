//! Test fixtures and helpers.
//!
//! Pre-built configurations, bouts and combatant records for consistent
//! testing.

use serde::{Deserialize, Serialize};
use spar_core::prelude::*;

/// Round length used by fixture bouts.
pub const FIXTURE_ROUND_MS: u64 = 10_000;

/// Break length used by fixture bouts.
pub const FIXTURE_BREAK_MS: u64 = 3_000;

/// Gap between fixture hits, comfortably outside the cooldown window.
pub const HIT_SPACING_MS: u64 = 1_000;

/// Default configuration with short rounds and breaks.
#[must_use]
pub fn short_config() -> MatchConfig {
    MatchConfig::default()
        .with_match_id("fixture")
        .with_durations(FIXTURE_ROUND_MS, FIXTURE_BREAK_MS)
}

/// A fixture bout driven by a manual clock.
///
/// # Panics
///
/// Panics if `config` is invalid.
#[must_use]
pub fn manual_bout(config: MatchConfig) -> (Bout<ManualClock>, ManualClock) {
    let clock = ManualClock::new(0);
    let bout = Bout::with_clock(config, clock.clone()).expect("fixture config must be valid");
    (bout, clock)
}

/// A combatant record with the given health, mana and fouls.
#[must_use]
pub fn combatant(health: u32, mana: u32, fouls: u32) -> CombatantData {
    let mut data = CombatantData::new(CombatantIdentity::default(), 120, 5, 3);
    data.health = health;
    data.mana = mana;
    data.fouls = fouls;
    data
}

/// Start the clock and land super-crits for `player` until the round ends.
///
/// # Panics
///
/// Panics if the round does not end within a bounded number of hits.
pub fn knock_out(bout: &mut Bout<ManualClock>, clock: &ManualClock, player: Player) -> RoundConclusion {
    bout.start_timer();
    for _ in 0..1_000 {
        clock.advance(HIT_SPACING_MS);
        if let Some(conclusion) = bout.record_hit(player, HitCategory::SuperCrit).conclusion {
            return conclusion;
        }
    }
    panic!("round did not end by knockout");
}

/// Run the break clock down until the next round is armed.
///
/// # Panics
///
/// Panics if the bout is not in a break.
pub fn finish_break(bout: &mut Bout<ManualClock>) {
    assert!(bout.timer().is_break_time(), "bout is not in a break");
    while !bout.tick_break(1_000) {}
}

/// One host stimulus, used to drive bouts from generated sequences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoutAction {
    /// Advance the manual clock and the round clock.
    Tick(u64),
    /// Advance the manual clock and the break clock.
    TickBreak(u64),
    /// Advance the manual clock only.
    Wait(u64),
    /// Register a hit.
    Hit(Player, HitCategory),
    /// Apply a penalty.
    Penalty(Player),
    /// Withdraw a penalty.
    RemovePenalty(Player),
    /// Flip the round clock.
    Toggle,
    /// Operator round close.
    EndRound,
    /// Revert the newest action.
    Undo,
}

/// Apply one action to a manually clocked bout.
pub fn apply_action(bout: &mut Bout<ManualClock>, clock: &ManualClock, action: &BoutAction) {
    match *action {
        BoutAction::Tick(ms) => {
            clock.advance(ms);
            bout.tick(ms);
        }
        BoutAction::TickBreak(ms) => {
            clock.advance(ms);
            bout.tick_break(ms);
        }
        BoutAction::Wait(ms) => clock.advance(ms),
        BoutAction::Hit(player, category) => {
            bout.record_hit(player, category);
        }
        BoutAction::Penalty(player) => {
            bout.add_penalty(player);
        }
        BoutAction::RemovePenalty(player) => {
            bout.remove_penalty(player);
        }
        BoutAction::Toggle => {
            bout.toggle_timer();
        }
        BoutAction::EndRound => {
            bout.end_round();
        }
        BoutAction::Undo => {
            bout.undo();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_knock_out_fixture_ends_round() {
        let (mut bout, clock) = manual_bout(short_config());
        let conclusion = knock_out(&mut bout, &clock, Player::Blue);
        assert_eq!(conclusion.winner, Some(Player::Blue));
        assert_eq!(conclusion.reason, RoundEndReason::Knockout);

        finish_break(&mut bout);
        assert_eq!(bout.state().current_round(), 2);
    }

    #[test]
    fn test_apply_action_advances_clock() {
        let (mut bout, clock) = manual_bout(short_config());
        apply_action(&mut bout, &clock, &BoutAction::Toggle);
        apply_action(&mut bout, &clock, &BoutAction::Tick(500));
        assert_eq!(clock.now_ms(), 500);
        assert_eq!(bout.timer().time_left_ms(), FIXTURE_ROUND_MS - 500);
    }
}

//! Match flow tests.
//!
//! Full bouts driven through the public facade, from the first bell to the
//! result latch.

use spar_core::prelude::*;
use spar_test_utils::fixtures::{finish_break, knock_out, manual_bout, short_config, FIXTURE_ROUND_MS};

fn run_clock_out(bout: &mut Bout<ManualClock>, clock: &ManualClock) -> RoundConclusion {
    bout.start_timer();
    loop {
        clock.advance(10);
        if let Some(conclusion) = bout.tick(10) {
            return conclusion;
        }
    }
}

#[test]
fn test_head_crit_then_rejected_repeat() {
    let (mut bout, clock) = manual_bout(MatchConfig::default());
    bout.start_timer();
    clock.advance(5_000);

    let report = bout.record_hit(Player::Red, HitCategory::HeadCrit);
    assert!(report.outcome.accepted());
    assert!(!report.outcome.ko_occurred());
    assert!(report.conclusion.is_none());

    let red = bout.combatant(Player::Red);
    let blue = bout.combatant(Player::Blue);
    assert_eq!(blue.health, 95);
    assert_eq!(red.score, 25);
    assert_eq!(red.hits, 1);
    assert_eq!(red.technique, 25);

    let hash = bout.state_hash();
    clock.advance(299);
    let repeat = bout.record_hit(Player::Red, HitCategory::HeadCrit);
    assert_eq!(
        repeat.outcome,
        HitOutcome::Rejected {
            reason: HitRejection::Cooldown
        }
    );
    assert_eq!(bout.state_hash(), hash);
}

#[test]
fn test_last_penalty_disqualifies() {
    let (mut bout, _) = manual_bout(MatchConfig::default());
    for _ in 0..4 {
        let report = bout.add_penalty(Player::Blue).unwrap();
        assert!(!report.outcome.disqualified);
    }
    assert_eq!(bout.combatant(Player::Blue).mana, 1);

    let report = bout.add_penalty(Player::Blue).unwrap();
    assert!(report.outcome.disqualified);
    assert_eq!(bout.combatant(Player::Blue).mana, 0);
    assert_eq!(bout.combatant(Player::Blue).fouls, 5);
    assert_eq!(report.conclusion.map(|c| c.winner), Some(Some(Player::Red)));
}

#[test]
fn test_three_round_split_decision() {
    let (mut bout, clock) = manual_bout(short_config());

    let first = knock_out(&mut bout, &clock, Player::Red);
    assert_eq!(first.winner, Some(Player::Red));
    finish_break(&mut bout);

    let second = knock_out(&mut bout, &clock, Player::Blue);
    assert_eq!(second.round, 2);
    assert!(!second.match_over);
    finish_break(&mut bout);

    // Round three goes the distance; red takes it on fouls
    bout.add_penalty(Player::Blue);
    let third = run_clock_out(&mut bout, &clock);
    assert_eq!(third.round, 3);
    assert_eq!(third.reason, RoundEndReason::TimeExpired);
    assert_eq!(third.winner, Some(Player::Red));
    assert!(third.match_over);
    assert_eq!(third.match_winner, Some(Player::Red));

    let snapshot = bout.snapshot();
    assert_eq!(
        snapshot.round_winners,
        vec![Some(Player::Red), Some(Player::Blue), Some(Player::Red)]
    );
    assert_eq!(snapshot.red.round_scores, vec![120, 0, 0]);
    assert_eq!(snapshot.blue.round_scores, vec![0, 120, 0]);
    assert!(!snapshot.timer.is_break_time);
    assert!(snapshot.result_pending);
}

#[test]
fn test_final_round_tie_is_a_draw() {
    let (mut bout, clock) = manual_bout(short_config());
    knock_out(&mut bout, &clock, Player::Red);
    finish_break(&mut bout);
    knock_out(&mut bout, &clock, Player::Blue);
    finish_break(&mut bout);

    let third = run_clock_out(&mut bout, &clock);
    assert_eq!(third.winner, None);
    assert!(third.match_over);
    assert_eq!(third.match_winner, None);
    assert!(bout.state().is_match_over());
}

#[test]
fn test_match_result_latched_until_reset() {
    let (mut bout, clock) = manual_bout(short_config());
    knock_out(&mut bout, &clock, Player::Blue);
    finish_break(&mut bout);
    knock_out(&mut bout, &clock, Player::Blue);
    assert_eq!(bout.state().match_winner(), Some(Player::Blue));

    // Nothing after the latch changes the winner
    bout.toggle_timer();
    clock.advance(1_000);
    bout.record_hit(Player::Red, HitCategory::SuperCrit);
    bout.tick(FIXTURE_ROUND_MS);
    assert!(!bout.tick_break(60_000));
    assert!(bout.close_match_result());
    assert_eq!(bout.state().match_winner(), Some(Player::Blue));
    assert_eq!(bout.state().current_round(), 2);

    bout.reset_match();
    assert_eq!(bout.state().match_winner(), None);
    assert!(!bout.state().is_match_over());
    assert_eq!(bout.state().current_round(), 1);
}

#[test]
fn test_undo_does_not_cross_rounds() {
    let (mut bout, clock) = manual_bout(short_config());
    bout.start_timer();
    clock.advance(1_000);
    bout.record_hit(Player::Red, HitCategory::BodyKick);
    bout.end_round();

    assert!(bout.undo().is_none());
    assert_eq!(bout.state().wins(Player::Red), 1);
    assert_eq!(bout.combatant(Player::Red).round_scores[0], 10);
}

#[test]
fn test_history_keeps_ten_most_recent() {
    let (mut bout, clock) = manual_bout(short_config().with_max_health(1_000));
    bout.start_timer();
    for _ in 0..15 {
        clock.advance(1_000);
        bout.record_hit(Player::Red, HitCategory::BodyPunch);
    }
    assert_eq!(bout.combatant(Player::Red).hits, 15);
    assert_eq!(bout.history().len(), 10);

    while bout.undo().is_some() {}
    assert_eq!(bout.combatant(Player::Red).hits, 5);
    assert_eq!(bout.combatant(Player::Blue).health, 975);
}

#[test]
fn test_break_and_round_clocks_are_exclusive() {
    let (mut bout, clock) = manual_bout(short_config());
    bout.start_timer();
    bout.end_round();

    assert!(bout.timer().is_break_time());
    bout.start_timer();
    assert!(!bout.timer().is_running());
    assert_eq!(bout.timer().phase(), TimerPhase::BreakRunning);
    assert!(bout.tick(1_000).is_none());

    clock.advance(1_000);
    assert!(!bout.tick_break(1_000));
    assert_eq!(bout.timer().display().to_string(), "00:02");
}

#[test]
fn test_final_countdown_display() {
    let (mut bout, clock) = manual_bout(short_config());
    bout.start_timer();
    clock.advance(500);
    bout.tick(500);
    assert!(bout.snapshot().timer.final_countdown);
    assert_eq!(bout.timer().display().to_string(), "09.50");
}

#[test]
fn test_break_clock_shown_after_early_finish() {
    let (mut bout, clock) = manual_bout(short_config());
    bout.start_timer();
    clock.advance(4_000);
    bout.tick(4_000);
    assert!(bout.timer().is_final_countdown());

    bout.end_round().unwrap();
    assert!(bout.timer().is_break_time());
    assert!(bout.timer().time_left_ms() > 0);
    assert!(!bout.timer().is_final_countdown());
    assert!(!bout.snapshot().timer.final_countdown);
    assert_eq!(bout.timer().display().to_string(), "00:03");
}

#[test]
fn test_snapshot_serializes_for_displays() {
    let (mut bout, clock) = manual_bout(short_config());
    bout.start_timer();
    clock.advance(1_000);
    bout.record_hit(Player::Blue, HitCategory::HeadKick);

    let snapshot = bout.snapshot();
    assert_eq!(snapshot.blue.head_hits, 1);
    assert_eq!(snapshot.undo_depth, 1);

    let text = ron::to_string(&snapshot).unwrap();
    assert!(text.contains("head_hits:1"));
    assert!(text.contains("phase:round_running"));
}

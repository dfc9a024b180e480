//! Bout benchmarks for spar_core.
//!
//! Run with: `cargo bench -p spar_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use spar_core::prelude::*;

/// Play a three-round bout at display tick resolution.
fn run_full_bout() -> u64 {
    let clock = ManualClock::new(0);
    let config = MatchConfig::default().with_durations(30_000, 5_000);
    let Ok(mut bout) = Bout::with_clock(config, clock.clone()) else {
        return 0;
    };

    while !bout.state().is_match_over() {
        if bout.timer().is_break_time() {
            clock.advance(1_000);
            bout.tick_break(1_000);
            continue;
        }

        bout.start_timer();
        clock.advance(10);
        bout.tick(10);

        // A light exchange every 400 ms keeps both corners scoring
        let now = clock.now_ms();
        if now % 400 == 0 {
            let player = if now % 800 == 0 { Player::Red } else { Player::Blue };
            bout.record_hit(player, HitCategory::BodyPunch);
        }
    }

    bout.state_hash()
}

pub fn bout_benchmark(c: &mut Criterion) {
    c.bench_function("full_bout_three_rounds", |b| b.iter(|| black_box(run_full_bout())));

    c.bench_function("declare_winner", |b| {
        let clock = ManualClock::new(0);
        let Ok(bout) = Bout::with_clock(MatchConfig::default(), clock) else {
            return;
        };
        b.iter(|| {
            declare_winner(
                black_box(bout.combatant(Player::Red)),
                black_box(bout.combatant(Player::Blue)),
            )
        });
    });
}

criterion_group!(benches, bout_benchmark);
criterion_main!(benches);

//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a bout produces identical state
//! given identical inputs.
//!
//! # Testing Strategy
//!
//! Scoreboards that mirror the same bout (a referee console and a venue
//! display, or a live bout and its script replay) must agree exactly.
//! Sources of divergence include:
//!
//! - **Wall-clock time**: hit cooldowns read a clock. Tests use
//!   [`ManualClock`] so every run sees the same readings.
//!
//! - **Hidden state**: anything outside the ledger, timer, orchestrator
//!   and history would escape [`Bout::state_hash`].
//!
//! # Test Levels
//!
//! 1. **Unit tests**: individual component behaviour
//! 2. **Property tests**: random action sequences replay identically
//! 3. **Integration tests**: full bouts are reproducible

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use spar_core::prelude::*;

use crate::fixtures::{apply_action, BoutAction};

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps applied per run.
    pub steps: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic bout).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the runs agreed, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Bout is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a state machine multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `steps` - Number of steps per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance the state by one step
/// * `hash` - Function to compute the state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S, u64),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for index in 0..steps {
            step(&mut state, index);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}

/// Replay an action sequence on fresh bouts and compare final hashes.
///
/// # Panics
///
/// Panics if `config` is invalid.
#[must_use]
pub fn verify_action_replay(config: &MatchConfig, actions: &[BoutAction], runs: usize) -> DeterminismResult {
    verify_determinism(
        runs,
        actions.len() as u64,
        || crate::fixtures::manual_bout(config.clone()),
        |(bout, clock), index| {
            let index = usize::try_from(index).unwrap_or(usize::MAX);
            if let Some(action) = actions.get(index) {
                apply_action(bout, clock, action);
            }
        },
        |(bout, _)| bout.state_hash(),
    )
}

/// Replay two bouts step by step and find the first step where they differ.
///
/// Returns `None` if the hashes agree throughout, `Some(0)` if the initial
/// states differ, otherwise the one-based index of the diverging action.
pub fn find_first_divergence(
    mut left: (Bout<ManualClock>, ManualClock),
    mut right: (Bout<ManualClock>, ManualClock),
    actions: &[BoutAction],
) -> Option<usize> {
    if left.0.state_hash() != right.0.state_hash() {
        return Some(0);
    }

    for (index, action) in actions.iter().enumerate() {
        apply_action(&mut left.0, &left.1, action);
        apply_action(&mut right.0, &right.1, action);

        if left.0.state_hash() != right.0.state_hash() {
            return Some(index + 1);
        }
    }

    None
}

/// Compute a hash of any hashable value.
#[must_use]
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for bout testing.
///
/// These strategies generate random but reproducible inputs for
/// property-based testing of the scoring rules.
pub mod strategies {
    use proptest::prelude::*;
    use spar_core::prelude::*;

    use crate::fixtures::BoutAction;

    /// Generate either corner.
    pub fn arb_player() -> impl Strategy<Value = Player> {
        prop_oneof![Just(Player::Red), Just(Player::Blue)]
    }

    /// Generate any hit category.
    pub fn arb_hit_category() -> impl Strategy<Value = HitCategory> {
        proptest::sample::select(HitCategory::ALL.to_vec())
    }

    /// Generate a clock gap around the cooldown window.
    pub fn arb_gap_ms() -> impl Strategy<Value = u64> {
        0u64..1_000
    }

    /// Generate a combatant record within the default ceilings.
    pub fn arb_combatant() -> impl Strategy<Value = CombatantData> {
        (0u32..=120, 0u32..=5, 0u32..8, 0u32..200, 0u32..10).prop_map(
            |(health, mana, fouls, technique, head_hits)| {
                let mut data = crate::fixtures::combatant(health, mana, fouls);
                data.technique = technique;
                data.head_hits = head_hits;
                data
            },
        )
    }

    /// Generate a single bout action.
    pub fn arb_action() -> impl Strategy<Value = BoutAction> {
        prop_oneof![
            4 => (arb_player(), arb_hit_category()).prop_map(|(p, c)| BoutAction::Hit(p, c)),
            3 => (1u64..2_000).prop_map(BoutAction::Tick),
            2 => (1u64..2_000).prop_map(BoutAction::TickBreak),
            2 => arb_gap_ms().prop_map(BoutAction::Wait),
            1 => arb_player().prop_map(BoutAction::Penalty),
            1 => arb_player().prop_map(BoutAction::RemovePenalty),
            1 => Just(BoutAction::Toggle),
            1 => Just(BoutAction::Undo),
            1 => Just(BoutAction::EndRound),
        ]
    }

    /// Generate a sequence of actions.
    pub fn arb_action_sequence(max_len: usize) -> impl Strategy<Value = Vec<BoutAction>> {
        proptest::collection::vec(arb_action(), 0..max_len)
    }

    /// Generate hits with the clock gap preceding each one.
    pub fn arb_hit_sequence(max_len: usize) -> impl Strategy<Value = Vec<(u64, Player, HitCategory)>> {
        proptest::collection::vec((arb_gap_ms(), arb_player(), arb_hit_category()), 0..max_len)
    }
}

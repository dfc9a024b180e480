//! Round and break clocks.
//!
//! The timer has two mutually exclusive modes: the round clock, advanced by
//! [`RoundTimer::tick`], and the break clock, advanced by
//! [`RoundTimer::tick_break`]. Both are driven by explicit millisecond
//! deltas supplied by the host; the timer never reads a clock itself.
//!
//! The timer reports exhaustion through return values and flags only. It
//! never decides who won a round; that belongs to the caller.
//!
//! # Phases
//!
//! ```text
//! Idle -> RoundRunning <-> RoundPaused -> RoundEnded -> BreakRunning -> Idle ...
//! ```

use serde::{Deserialize, Serialize};

/// Tick resolution while the round clock runs.
pub const ROUND_TICK_MS: u64 = 10;

/// Tick resolution while the break clock runs.
pub const BREAK_TICK_MS: u64 = 1_000;

/// Remaining time below which the display switches to a centisecond countdown.
pub const FINAL_COUNTDOWN_MS: u64 = 10_000;

/// Phase derived from the timer flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerPhase {
    /// Round armed but never started.
    Idle,
    /// Round clock counting down.
    RoundRunning,
    /// Round clock stopped mid-round.
    RoundPaused,
    /// Round finished, waiting for the break.
    RoundEnded,
    /// Break clock counting down.
    BreakRunning,
}

/// How the clock should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimerDisplay {
    /// Normal `MM:SS` display.
    Clock {
        /// Whole minutes.
        minutes: u64,
        /// Remaining whole seconds.
        seconds: u64,
    },
    /// Final-countdown `SS.CC` display.
    Countdown {
        /// Whole seconds.
        seconds: u64,
        /// Hundredths of a second.
        centiseconds: u64,
    },
}

impl TimerDisplay {
    /// Build the display for a remaining time.
    #[must_use]
    pub const fn for_remaining(ms: u64, countdown: bool) -> Self {
        if countdown {
            Self::Countdown {
                seconds: ms / 1_000,
                centiseconds: (ms % 1_000) / 10,
            }
        } else {
            let total_seconds = ms / 1_000;
            Self::Clock {
                minutes: total_seconds / 60,
                seconds: total_seconds % 60,
            }
        }
    }
}

impl std::fmt::Display for TimerDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Clock { minutes, seconds } => write!(f, "{minutes:02}:{seconds:02}"),
            Self::Countdown {
                seconds,
                centiseconds,
            } => write!(f, "{seconds:02}.{centiseconds:02}"),
        }
    }
}

/// Round and break clock state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoundTimer {
    time_left_ms: u64,
    break_time_left_ms: u64,
    is_running: bool,
    is_break_time: bool,
    round_started: bool,
    round_ended: bool,
    round_duration_ms: u64,
    break_duration_ms: u64,
}

impl RoundTimer {
    /// Create an idle timer armed with a full round.
    #[must_use]
    pub const fn new(round_duration_ms: u64, break_duration_ms: u64) -> Self {
        Self {
            time_left_ms: round_duration_ms,
            break_time_left_ms: break_duration_ms,
            is_running: false,
            is_break_time: false,
            round_started: false,
            round_ended: false,
            round_duration_ms,
            break_duration_ms,
        }
    }

    /// Advance the round clock.
    ///
    /// Only applies while the round clock runs. Returns `true` if the clock
    /// reached zero on this tick; the caller must then evaluate the round.
    pub fn tick(&mut self, delta_ms: u64) -> bool {
        if !self.is_running || self.is_break_time {
            return false;
        }

        self.time_left_ms = self.time_left_ms.saturating_sub(delta_ms);
        if self.time_left_ms == 0 {
            self.is_running = false;
            return true;
        }
        false
    }

    /// Advance the break clock.
    ///
    /// Returns `true` if the break finished on this tick.
    pub fn tick_break(&mut self, delta_ms: u64) -> bool {
        if !self.is_break_time {
            return false;
        }

        self.break_time_left_ms = self.break_time_left_ms.saturating_sub(delta_ms);
        if self.break_time_left_ms == 0 {
            self.is_break_time = false;
            return true;
        }
        false
    }

    /// Whether the start/pause controls are locked.
    const fn controls_locked(&self) -> bool {
        self.is_break_time || self.round_ended
    }

    /// Flip between running and paused.
    ///
    /// Returns the new running state.
    pub fn toggle(&mut self) -> bool {
        if self.is_running {
            self.pause();
        } else {
            self.start();
        }
        self.is_running
    }

    /// Start the round clock.
    pub fn start(&mut self) {
        if self.controls_locked() || self.time_left_ms == 0 {
            return;
        }
        self.is_running = true;
        self.round_started = true;
    }

    /// Pause the round clock.
    pub fn pause(&mut self) {
        if self.controls_locked() {
            return;
        }
        self.is_running = false;
    }

    /// Switch to the break clock.
    pub fn start_break(&mut self) {
        self.is_running = false;
        self.is_break_time = true;
        self.break_time_left_ms = self.break_duration_ms;
        self.round_ended = false;
    }

    /// Mark the round as ended (or re-open it). Always stops the round clock.
    pub fn set_round_ended(&mut self, ended: bool) {
        self.round_ended = ended;
        self.is_running = false;
    }

    /// Arm a fresh round of the given length.
    pub fn reset_for_next_round(&mut self, round_duration_ms: u64) {
        self.round_duration_ms = round_duration_ms;
        self.time_left_ms = round_duration_ms;
        self.break_time_left_ms = self.break_duration_ms;
        self.is_running = false;
        self.is_break_time = false;
        self.round_ended = false;
    }

    /// Return to the initial idle state.
    pub fn reset(&mut self) {
        self.reset_for_next_round(self.round_duration_ms);
        self.round_started = false;
    }

    /// Change the round length. An unstarted round is re-armed immediately.
    pub fn set_round_duration(&mut self, round_duration_ms: u64) {
        self.round_duration_ms = round_duration_ms;
        if !self.round_started && !self.is_break_time {
            self.time_left_ms = round_duration_ms;
        }
    }

    /// Change the break length. A running break keeps its remaining time.
    pub fn set_break_duration(&mut self, break_duration_ms: u64) {
        self.break_duration_ms = break_duration_ms;
        if !self.is_break_time {
            self.break_time_left_ms = break_duration_ms;
        }
    }

    /// Remaining round time.
    #[must_use]
    pub const fn time_left_ms(&self) -> u64 {
        self.time_left_ms
    }

    /// Remaining break time.
    #[must_use]
    pub const fn break_time_left_ms(&self) -> u64 {
        self.break_time_left_ms
    }

    /// Whether the round clock is counting down.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.is_running
    }

    /// Whether the break clock is active.
    #[must_use]
    pub const fn is_break_time(&self) -> bool {
        self.is_break_time
    }

    /// Whether the current round has ever been started.
    #[must_use]
    pub const fn round_started(&self) -> bool {
        self.round_started
    }

    /// Whether the current round has ended.
    #[must_use]
    pub const fn round_ended(&self) -> bool {
        self.round_ended
    }

    /// Configured round length.
    #[must_use]
    pub const fn round_duration_ms(&self) -> u64 {
        self.round_duration_ms
    }

    /// Configured break length.
    #[must_use]
    pub const fn break_duration_ms(&self) -> u64 {
        self.break_duration_ms
    }

    /// Current phase derived from the flags.
    #[must_use]
    pub const fn phase(&self) -> TimerPhase {
        if self.is_break_time {
            TimerPhase::BreakRunning
        } else if self.round_ended {
            TimerPhase::RoundEnded
        } else if self.is_running {
            TimerPhase::RoundRunning
        } else if self.round_started {
            TimerPhase::RoundPaused
        } else {
            TimerPhase::Idle
        }
    }

    /// Whether the final-countdown blink is active.
    #[must_use]
    pub const fn is_final_countdown(&self) -> bool {
        self.time_left_ms < FINAL_COUNTDOWN_MS && self.time_left_ms > 0 && !self.is_break_time
    }

    /// Display form of whichever clock is active.
    #[must_use]
    pub const fn display(&self) -> TimerDisplay {
        if self.is_break_time {
            TimerDisplay::for_remaining(self.break_time_left_ms, false)
        } else {
            TimerDisplay::for_remaining(self.time_left_ms, self.is_final_countdown())
        }
    }
}

//! Headless bout runner implementation.
//!
//! The runner owns one bout timed by a [`ManualClock`]. Time only moves when
//! a `tick` or `tick_break` command arrives, so a recorded command stream
//! replays to the same state hash on any machine.

use std::io::{self, BufRead, Write};

use spar_core::prelude::*;

use crate::protocol::{Command, Response};

/// Headless runner configuration.
#[derive(Debug, Clone, Default)]
pub struct HeadlessConfig {
    /// Output state after every command (vs only on query).
    pub auto_state_output: bool,
    /// Bout configuration.
    pub match_config: MatchConfig,
}

/// Counters reported when a session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Commands successfully parsed.
    pub commands: u64,
    /// Lines that failed to parse or were rejected.
    pub errors: u64,
    /// Final state hash.
    pub final_hash: u64,
}

/// Headless runner for operator-driven bouts.
#[derive(Debug)]
pub struct HeadlessRunner {
    config: HeadlessConfig,
    bout: Bout<ManualClock>,
    clock: ManualClock,
}

impl HeadlessRunner {
    /// Create a runner with default configuration.
    ///
    /// # Errors
    ///
    /// Never fails for the default configuration; the signature matches
    /// [`HeadlessRunner::with_config`].
    pub fn new() -> Result<Self> {
        Self::with_config(HeadlessConfig::default())
    }

    /// Create a runner with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BoutError::InvalidConfig`] if the bout configuration is
    /// invalid.
    pub fn with_config(config: HeadlessConfig) -> Result<Self> {
        let clock = ManualClock::new(0);
        let bout = Bout::with_clock(config.match_config.clone(), clock.clone())?;
        Ok(Self {
            config,
            bout,
            clock,
        })
    }

    /// The bout being run.
    #[must_use]
    pub fn bout(&self) -> &Bout<ManualClock> {
        &self.bout
    }

    /// Apply one command and collect its responses.
    pub fn handle(&mut self, command: &Command) -> Vec<Response> {
        let name = command.name();
        let mut responses = Vec::new();

        match command {
            Command::Tick { ms, count } => {
                for _ in 0..*count {
                    self.clock.advance(*ms);
                    if let Some(conclusion) = self.bout.tick(*ms) {
                        responses.extend(Response::for_conclusion(conclusion, self.bout.state()));
                        break;
                    }
                }
                responses.insert(0, Response::ack(name));
            }
            Command::TickBreak { ms, count } => {
                for _ in 0..*count {
                    self.clock.advance(*ms);
                    if self.bout.tick_break(*ms) {
                        break;
                    }
                }
                responses.push(Response::ack(name));
            }
            Command::Wait { ms } => {
                self.clock.advance(*ms);
                responses.push(Response::ack(name));
            }
            Command::Hit { player, category } => {
                let report = self.bout.record_hit(*player, *category);
                responses.push(Response::Hit {
                    outcome: report.outcome,
                });
                if let Some(conclusion) = report.conclusion {
                    responses.extend(Response::for_conclusion(conclusion, self.bout.state()));
                }
            }
            Command::Penalty { player } => match self.bout.add_penalty(*player) {
                Some(report) => {
                    responses.push(Response::Penalty {
                        player: *player,
                        applied: true,
                        disqualified: report.outcome.disqualified,
                    });
                    if let Some(conclusion) = report.conclusion {
                        responses.extend(Response::for_conclusion(conclusion, self.bout.state()));
                    }
                }
                None => responses.push(Response::Penalty {
                    player: *player,
                    applied: false,
                    disqualified: false,
                }),
            },
            Command::RemovePenalty { player } => {
                if self.bout.remove_penalty(*player) {
                    responses.push(Response::ack(name));
                } else {
                    responses.push(Response::error(
                        format!("{player} has no penalty to remove"),
                        Some(name),
                    ));
                }
            }
            Command::Toggle => {
                self.bout.toggle_timer();
                responses.push(Response::ack(name));
            }
            Command::Start => {
                self.bout.start_timer();
                responses.push(Response::ack(name));
            }
            Command::Pause => {
                self.bout.pause_timer();
                responses.push(Response::ack(name));
            }
            Command::EndRound => match self.bout.end_round() {
                Some(conclusion) => {
                    responses.extend(Response::for_conclusion(conclusion, self.bout.state()));
                }
                None => responses.push(Response::error("No round in progress", Some(name))),
            },
            Command::Undo => {
                let entry = self.bout.undo();
                responses.push(Response::Undone { entry });
            }
            Command::ResetRound => {
                if self.bout.reset_round() {
                    responses.push(Response::ack(name));
                } else {
                    responses.push(Response::error("Round cannot be reset now", Some(name)));
                }
            }
            Command::ResetMatch => {
                self.bout.reset_match();
                responses.push(Response::ack(name));
            }
            Command::CloseResult => {
                self.bout.close_match_result();
                responses.push(Response::ack(name));
            }
            Command::Configure {
                max_health,
                max_mana,
                round_duration_ms,
                break_duration_ms,
                match_id,
            } => match self.configure(
                *max_health,
                *max_mana,
                *round_duration_ms,
                *break_duration_ms,
                match_id.clone(),
            ) {
                Ok(conclusion) => {
                    responses.push(Response::ack(name));
                    if let Some(conclusion) = conclusion {
                        responses.extend(Response::for_conclusion(conclusion, self.bout.state()));
                    }
                }
                Err(e) => responses.push(Response::error(e.to_string(), Some(name))),
            },
            Command::Identity {
                player,
                name: combatant,
                avatar,
            } => {
                self.bout.set_identity(
                    *player,
                    CombatantIdentity {
                        name: combatant.clone(),
                        avatar: avatar.clone(),
                    },
                );
                responses.push(Response::ack(name));
            }
            Command::Query => responses.push(self.state_response()),
            Command::Hash => responses.push(Response::StateHash {
                round: self.bout.state().current_round(),
                hash: self.bout.state_hash(),
            }),
            Command::Quit => responses.push(Response::Bye),
        }

        let wants_state = !matches!(command, Command::Query | Command::Quit);
        if self.config.auto_state_output && wants_state {
            responses.push(self.state_response());
        }
        responses
    }

    fn configure(
        &mut self,
        max_health: Option<u32>,
        max_mana: Option<u32>,
        round_duration_ms: Option<u64>,
        break_duration_ms: Option<u64>,
        match_id: Option<String>,
    ) -> Result<Option<RoundConclusion>> {
        if let Some(value) = max_health {
            self.bout.set_max_health(value)?;
        }
        let mut conclusion = None;
        if let Some(value) = max_mana {
            conclusion = self.bout.set_max_mana(value)?;
        }
        if let Some(value) = round_duration_ms {
            self.bout.set_round_duration(value)?;
        }
        if let Some(value) = break_duration_ms {
            self.bout.set_break_duration(value)?;
        }
        if let Some(value) = match_id {
            self.bout.set_match_id(value);
        }
        Ok(conclusion)
    }

    fn state_response(&self) -> Response {
        Response::State {
            state: self.bout.snapshot(),
            hash: self.bout.state_hash(),
        }
    }

    /// Run a JSON-lines session until `quit` or end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input or writing output fails.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<SessionSummary> {
        let mut summary = SessionSummary::default();

        write!(output, "{}", Response::ready(self.bout.state().match_id()).to_json_line())?;
        output.flush()?;

        for line in input.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let command = match Command::from_json(line) {
                Ok(command) => command,
                Err(e) => {
                    tracing::warn!(error = %e, "Unparseable command");
                    summary.errors += 1;
                    write!(output, "{}", Response::error(format!("Parse error: {e}"), None).to_json_line())?;
                    output.flush()?;
                    continue;
                }
            };

            summary.commands += 1;
            tracing::trace!(cmd = command.name(), "Command received");
            for response in self.handle(&command) {
                if response.is_error() {
                    summary.errors += 1;
                }
                write!(output, "{}", response.to_json_line())?;
            }
            output.flush()?;

            if matches!(command, Command::Quit) {
                break;
            }
        }

        summary.final_hash = self.bout.state_hash();
        tracing::info!(
            commands = summary.commands,
            errors = summary.errors,
            final_hash = summary.final_hash,
            "Session finished"
        );
        Ok(summary)
    }

    /// Run a session on the process stdin and stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if stdin or stdout fail.
    pub fn run_stdio(&mut self) -> io::Result<SessionSummary> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run(stdin.lock(), stdout.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner() -> HeadlessRunner {
        HeadlessRunner::new().unwrap()
    }

    #[test]
    fn test_tick_stops_at_round_end() {
        let config = HeadlessConfig {
            match_config: MatchConfig::default().with_durations(1_000, 2_000),
            ..Default::default()
        };
        let mut runner = HeadlessRunner::with_config(config).unwrap();
        runner.handle(&Command::Start);

        let responses = runner.handle(&Command::Tick { ms: 10, count: 500 });
        assert_eq!(responses[0], Response::ack("tick"));
        assert!(matches!(responses[1], Response::RoundOver { .. }));
        assert!(runner.bout().timer().is_break_time());
        assert_eq!(runner.bout().timer().break_time_left_ms(), 2_000);
    }

    #[test]
    fn test_hit_response_carries_outcome() {
        let mut runner = runner();
        runner.handle(&Command::Start);
        let responses = runner.handle(&Command::Hit {
            player: Player::Red,
            category: HitCategory::BodyCrit,
        });
        assert_eq!(responses.len(), 1);
        assert!(matches!(
            &responses[0],
            Response::Hit { outcome } if outcome.accepted()
        ));
    }

    #[test]
    fn test_penalty_locked_during_break() {
        let mut runner = runner();
        runner.handle(&Command::Configure {
            max_health: None,
            max_mana: Some(1),
            round_duration_ms: None,
            break_duration_ms: None,
            match_id: None,
        });

        let responses = runner.handle(&Command::Penalty { player: Player::Red });
        assert!(matches!(
            responses[0],
            Response::Penalty {
                applied: true,
                disqualified: true,
                ..
            }
        ));
        assert!(matches!(responses[1], Response::RoundOver { .. }));

        let responses = runner.handle(&Command::Penalty { player: Player::Red });
        assert!(matches!(responses[0], Response::Penalty { applied: false, .. }));
    }

    #[test]
    fn test_configure_announces_disqualification() {
        let mut runner = runner();
        runner.handle(&Command::Start);
        runner.handle(&Command::Penalty { player: Player::Blue });
        runner.handle(&Command::Penalty { player: Player::Blue });

        let responses = runner.handle(&Command::Configure {
            max_health: None,
            max_mana: Some(2),
            round_duration_ms: None,
            break_duration_ms: None,
            match_id: None,
        });
        assert_eq!(responses[0], Response::ack("configure"));
        assert!(matches!(
            &responses[1],
            Response::RoundOver { conclusion }
                if conclusion.reason == RoundEndReason::Disqualification
                    && conclusion.winner == Some(Player::Red)
        ));
    }

    #[test]
    fn test_configure_rejects_zero() {
        let mut runner = runner();
        let responses = runner.handle(&Command::Configure {
            max_health: Some(0),
            max_mana: None,
            round_duration_ms: None,
            break_duration_ms: None,
            match_id: None,
        });
        assert!(responses[0].is_error());
    }

    #[test]
    fn test_auto_state_output() {
        let config = HeadlessConfig {
            auto_state_output: true,
            ..Default::default()
        };
        let mut runner = HeadlessRunner::with_config(config).unwrap();
        let responses = runner.handle(&Command::Start);
        assert_eq!(responses.len(), 2);
        assert!(matches!(responses[1], Response::State { .. }));

        let responses = runner.handle(&Command::Query);
        assert_eq!(responses.len(), 1);
    }

    #[test]
    fn test_run_session_reports_parse_errors() {
        let input = "{\"cmd\":\"start\"}\nnot json\n\n{\"cmd\":\"quit\"}\n{\"cmd\":\"start\"}\n";
        let mut output = Vec::new();
        let summary = runner().run(input.as_bytes(), &mut output).unwrap();

        assert_eq!(summary.commands, 2);
        assert_eq!(summary.errors, 1);

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains(r#""type":"ready""#));
        assert!(lines[2].contains(r#""type":"error""#));
        assert!(lines[3].contains(r#""type":"bye""#));
    }
}

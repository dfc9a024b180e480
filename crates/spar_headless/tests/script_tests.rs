//! Loading scripts and configuration files from disk.

use std::io::Write;
use std::path::PathBuf;

use spar_core::prelude::*;
use spar_headless::{load_match_config, BoutScript, ScriptError};
use tempfile::NamedTempFile;

fn bundled(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scripts").join(name)
}

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_bundled_split_decision_passes() {
    let script = BoutScript::load(bundled("split_decision.ron")).unwrap();
    assert_eq!(script.config.blue.avatar.as_deref(), Some("okafor.png"));

    let report = script.run().unwrap();
    let reasons: Vec<RoundEndReason> = report.conclusions().map(|c| c.reason).collect();
    assert_eq!(
        reasons,
        vec![
            RoundEndReason::Knockout,
            RoundEndReason::Knockout,
            RoundEndReason::TimeExpired,
        ]
    );
    assert_eq!(report.snapshot.red_won, 2);
    assert_eq!(report.snapshot.blue_won, 1);
    assert!(report.snapshot.result_pending);
}

#[test]
fn test_bundled_match_config_is_valid() {
    let config = load_match_config(bundled("match.ron")).unwrap();
    assert_eq!(config, MatchConfig::default().with_match_id("championship-final"));
    assert_eq!(config.wins_required(), 2);
}

#[test]
fn test_script_from_temp_file_is_replayable() {
    let file = write_temp(
        r#"(
            name: "Penalty trouble",
            config: (max_mana: 2),
            steps: [Penalty(blue), Penalty(blue)],
            expect: (round_winners: Some([Some(red)]), current_round: Some(1)),
        )"#,
    );

    let script = BoutScript::load(file.path()).unwrap();
    let first = script.run().unwrap();
    let second = script.run().unwrap();
    assert_eq!(first.hash, second.hash);
    assert_eq!(first.snapshot.blue.mana, 0);

    let conclusion = first.conclusions().next().unwrap();
    assert_eq!(conclusion.reason, RoundEndReason::Disqualification);
}

#[test]
fn test_malformed_config_file() {
    let file = write_temp("(max_health: \"lots\")");
    let err = load_match_config(file.path()).unwrap_err();
    assert!(matches!(err, ScriptError::ParseError(_)));
}

#[test]
fn test_config_file_failing_validation() {
    let file = write_temp("(round_duration_ms: 0)");
    let err = load_match_config(file.path()).unwrap_err();
    assert!(matches!(
        err,
        ScriptError::Bout(BoutError::InvalidConfig {
            field: "round_duration_ms",
            ..
        })
    ));
}

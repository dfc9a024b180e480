//! Match configuration.
//!
//! A [`MatchConfig`] is supplied once at bout setup. It is plain data that
//! can be deserialized from RON; loading files is left to the host.
//!
//! # Example RON
//!
//! ```ron
//! MatchConfig(
//!     match_id: "ring-2-bout-14",
//!     max_health: 120,
//!     round_duration_ms: 90000,
//!     red: CombatantIdentity(name: "Kim", avatar: Some("kim.png")),
//! )
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{BoutError, Result};

/// Default ceiling for health and score.
pub const DEFAULT_MAX_HEALTH: u32 = 120;

/// Default penalty budget.
pub const DEFAULT_MAX_MANA: u32 = 5;

/// Default number of scheduled rounds (best of three).
pub const DEFAULT_MAX_ROUNDS: u8 = 3;

/// Default round length.
pub const DEFAULT_ROUND_DURATION_MS: u64 = 120_000;

/// Default break length between rounds.
pub const DEFAULT_BREAK_DURATION_MS: u64 = 60_000;

/// Default window during which a second hit from the same corner is ignored.
pub const DEFAULT_HIT_COOLDOWN_MS: u64 = 300;

/// Default number of undoable actions kept.
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Display identity of a combatant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatantIdentity {
    /// Name shown on the scoreboard.
    pub name: String,
    /// Avatar reference (path or URL), opaque to the core.
    pub avatar: Option<String>,
}

impl CombatantIdentity {
    /// Create an identity with a name and no avatar.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            avatar: None,
        }
    }
}

/// Complete configuration for one bout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Identifier of the match, opaque to the core.
    pub match_id: String,
    /// Ceiling for health and score.
    pub max_health: u32,
    /// Penalty budget; reaching zero disqualifies.
    pub max_mana: u32,
    /// Number of scheduled rounds.
    pub max_rounds: u8,
    /// Round clock length.
    pub round_duration_ms: u64,
    /// Break clock length.
    pub break_duration_ms: u64,
    /// Per-corner hit de-duplication window.
    pub hit_cooldown_ms: u64,
    /// Maximum number of undoable actions.
    pub history_capacity: usize,
    /// Red corner identity.
    pub red: CombatantIdentity,
    /// Blue corner identity.
    pub blue: CombatantIdentity,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            match_id: String::new(),
            max_health: DEFAULT_MAX_HEALTH,
            max_mana: DEFAULT_MAX_MANA,
            max_rounds: DEFAULT_MAX_ROUNDS,
            round_duration_ms: DEFAULT_ROUND_DURATION_MS,
            break_duration_ms: DEFAULT_BREAK_DURATION_MS,
            hit_cooldown_ms: DEFAULT_HIT_COOLDOWN_MS,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            red: CombatantIdentity::named("Red"),
            blue: CombatantIdentity::named("Blue"),
        }
    }
}

impl MatchConfig {
    /// Parse a configuration from a RON document.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        let config: Self = ron::from_str(ron).map_err(|e| BoutError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to a pretty-printed RON document.
    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| BoutError::ConfigParse(e.to_string()))
    }

    /// Builder method to set the match identifier.
    #[must_use]
    pub fn with_match_id(mut self, match_id: impl Into<String>) -> Self {
        self.match_id = match_id.into();
        self
    }

    /// Builder method to set the health ceiling.
    #[must_use]
    pub const fn with_max_health(mut self, max_health: u32) -> Self {
        self.max_health = max_health;
        self
    }

    /// Builder method to set the penalty budget.
    #[must_use]
    pub const fn with_max_mana(mut self, max_mana: u32) -> Self {
        self.max_mana = max_mana;
        self
    }

    /// Builder method to set the round and break lengths.
    #[must_use]
    pub const fn with_durations(mut self, round_ms: u64, break_ms: u64) -> Self {
        self.round_duration_ms = round_ms;
        self.break_duration_ms = break_ms;
        self
    }

    /// Builder method to set the history capacity.
    #[must_use]
    pub const fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Number of round wins that ends the match early.
    #[must_use]
    pub const fn wins_required(&self) -> u8 {
        self.max_rounds / 2 + 1
    }

    /// Check every value is usable for scoring.
    ///
    /// # Errors
    ///
    /// Returns [`BoutError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        if self.max_health == 0 {
            return Err(BoutError::zero("max_health"));
        }
        if self.max_mana == 0 {
            return Err(BoutError::zero("max_mana"));
        }
        if self.max_rounds == 0 {
            return Err(BoutError::zero("max_rounds"));
        }
        if self.round_duration_ms == 0 {
            return Err(BoutError::zero("round_duration_ms"));
        }
        if self.break_duration_ms == 0 {
            return Err(BoutError::zero("break_duration_ms"));
        }
        if self.history_capacity == 0 {
            return Err(BoutError::zero("history_capacity"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = MatchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.wins_required(), 2);
    }

    #[test]
    fn test_zero_health_rejected() {
        let config = MatchConfig::default().with_max_health(0);
        assert_eq!(config.validate(), Err(BoutError::zero("max_health")));
    }

    #[test]
    fn test_zero_durations_rejected() {
        let config = MatchConfig::default().with_durations(0, 1_000);
        assert!(matches!(
            config.validate(),
            Err(BoutError::InvalidConfig {
                field: "round_duration_ms",
                ..
            })
        ));

        let config = MatchConfig::default().with_durations(1_000, 0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config = MatchConfig::from_ron_str(
            r#"(match_id: "bout-7", max_health: 100, red: (name: "Kim"))"#,
        )
        .unwrap();

        assert_eq!(config.match_id, "bout-7");
        assert_eq!(config.max_health, 100);
        assert_eq!(config.max_mana, DEFAULT_MAX_MANA);
        assert_eq!(config.red.name, "Kim");
        assert_eq!(config.blue.name, "Blue");
    }

    #[test]
    fn test_invalid_ron_reports_parse_error() {
        let err = MatchConfig::from_ron_str("(max_health: \"lots\")").unwrap_err();
        assert!(matches!(err, BoutError::ConfigParse(_)));
    }

    #[test]
    fn test_ron_rejects_zero_values() {
        let err = MatchConfig::from_ron_str("(max_mana: 0)").unwrap_err();
        assert_eq!(err, BoutError::zero("max_mana"));
    }

    #[test]
    fn test_ron_roundtrip() {
        let config = MatchConfig::default().with_match_id("final");
        let ron = config.to_ron_string().unwrap();
        assert_eq!(MatchConfig::from_ron_str(&ron).unwrap(), config);
    }

    #[test]
    fn test_wins_required_scales_with_rounds() {
        let mut config = MatchConfig::default();
        config.max_rounds = 5;
        assert_eq!(config.wins_required(), 3);
        config.max_rounds = 1;
        assert_eq!(config.wins_required(), 1);
    }
}

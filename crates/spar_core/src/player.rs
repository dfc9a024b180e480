//! Corner identifiers for the two combatants.

use serde::{Deserialize, Serialize};

/// One of the two corners in a bout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    /// The red corner.
    Red,
    /// The blue corner.
    Blue,
}

impl Player {
    /// Both corners, red first.
    pub const ALL: [Player; 2] = [Player::Red, Player::Blue];

    /// The combatant facing this one.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Red => Self::Blue,
            Self::Blue => Self::Red,
        }
    }

    /// Get the display name for this corner.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Red => "Red",
            Self::Blue => "Blue",
        }
    }

    /// Key used by display layers to address this corner's health bar.
    #[must_use]
    pub const fn health_key(self) -> &'static str {
        match self {
            Self::Red => "redHealth",
            Self::Blue => "blueHealth",
        }
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

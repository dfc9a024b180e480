//! Static hit catalog.
//!
//! Every scoring action an operator can register maps to a fixed
//! damage/point profile:
//! - Damage is taken off the opponent's health
//! - Points are added to the striker's score
//! - Hits of 20 damage or more count as technique
//! - Hits of exactly 15 damage count as head hits

use serde::{Deserialize, Serialize};

/// Damage at or above which a hit counts toward technique points.
pub const TECHNIQUE_DAMAGE_THRESHOLD: u32 = 20;

/// Damage of the mid-tier head kick tracked by the head-hit counter.
pub const HEAD_HIT_DAMAGE: u32 = 15;

/// Severity tier of a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HitClass {
    /// Ordinary scoring contact.
    #[default]
    Normal,
    /// Critical contact.
    Critical,
    /// Super-critical contact.
    SuperCritical,
}

/// Category of a registered hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitCategory {
    /// Punch to the trunk protector.
    #[serde(alias = "punch")]
    BodyPunch,
    /// Kick to the trunk protector.
    #[serde(alias = "bodyKick")]
    BodyKick,
    /// Kick to the head.
    #[serde(alias = "headKick")]
    HeadKick,
    /// Critical contact to the trunk.
    #[serde(alias = "bodyCrit")]
    BodyCrit,
    /// Critical contact to the head.
    #[serde(alias = "headCrit")]
    HeadCrit,
    /// Super-critical contact, spinning technique to the head.
    #[serde(alias = "superCrit")]
    SuperCrit,
}

/// Damage and point profile of a hit category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HitProfile {
    /// Health removed from the opponent.
    pub damage: u32,
    /// Points added to the striker's score.
    pub points: u32,
    /// Severity tier.
    pub class: HitClass,
}

impl HitProfile {
    /// Whether this hit counts toward technique points.
    #[must_use]
    pub const fn is_technique(&self) -> bool {
        self.damage >= TECHNIQUE_DAMAGE_THRESHOLD
    }

    /// Whether this hit counts as a head hit.
    #[must_use]
    pub const fn is_head_hit(&self) -> bool {
        self.damage == HEAD_HIT_DAMAGE
    }
}

impl HitCategory {
    /// Every category, weakest first.
    pub const ALL: [HitCategory; 6] = [
        HitCategory::BodyPunch,
        HitCategory::BodyKick,
        HitCategory::HeadKick,
        HitCategory::BodyCrit,
        HitCategory::HeadCrit,
        HitCategory::SuperCrit,
    ];

    /// Look up the damage/point profile for this category.
    #[must_use]
    pub const fn profile(self) -> HitProfile {
        let (damage, points, class) = match self {
            Self::BodyPunch => (5, 5, HitClass::Normal),
            Self::BodyKick => (10, 10, HitClass::Normal),
            Self::HeadKick => (15, 15, HitClass::Normal),

            // Both critical tiers feed technique points
            Self::BodyCrit => (20, 20, HitClass::Critical),
            Self::HeadCrit => (25, 25, HitClass::Critical),
            Self::SuperCrit => (30, 30, HitClass::SuperCritical),
        };

        HitProfile {
            damage,
            points,
            class,
        }
    }

    /// Damage dealt by this category.
    #[must_use]
    pub const fn damage(self) -> u32 {
        self.profile().damage
    }

    /// Points scored by this category.
    #[must_use]
    pub const fn points(self) -> u32 {
        self.profile().points
    }

    /// Icon shown by display layers next to the hit.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::BodyPunch => "punch",
            Self::BodyKick => "body-kick",
            Self::HeadKick => "head-kick",
            Self::BodyCrit => "body-crit",
            Self::HeadCrit => "head-crit",
            Self::SuperCrit => "super-crit",
        }
    }
}

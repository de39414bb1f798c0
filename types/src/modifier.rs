use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of timed modifier.
///
/// The category decides which registered handler (if any) drives the
/// modifier's side effects. Categories with no handler are inert data that
/// other code paths query (e.g. damage calculation reads `DamageBoost`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierCategory {
    DamageBoost,
    SpeedBoost,
    SpeedReduction,
    Shield,
    Taunt,
    Reveal,
    ExecutionMark,
    InfiniteAmmo,
    WeaponSpreadIncrease,
    Stun,
    Invisibility,
    Regeneration,
    /// Game-specific category not known to the engine
    Custom(String),
}

impl ModifierCategory {
    pub fn custom(name: impl Into<String>) -> Self {
        Self::Custom(name.into())
    }

    pub fn name(&self) -> &str {
        match self {
            Self::DamageBoost => "damage_boost",
            Self::SpeedBoost => "speed_boost",
            Self::SpeedReduction => "speed_reduction",
            Self::Shield => "shield",
            Self::Taunt => "taunt",
            Self::Reveal => "reveal",
            Self::ExecutionMark => "execution_mark",
            Self::InfiniteAmmo => "infinite_ammo",
            Self::WeaponSpreadIncrease => "weapon_spread_increase",
            Self::Stun => "stun",
            Self::Invisibility => "invisibility",
            Self::Regeneration => "regeneration",
            Self::Custom(name) => name,
        }
    }
}

impl fmt::Display for ModifierCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rule used when a modifier is applied while one with the same
/// `(target, id)` is still active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombinationPolicy {
    /// Restart the timer and take the new application's parameters
    Refresh,
    /// Sum overlapping parameters, count a stack
    #[default]
    Additive,
    /// Multiply overlapping parameters, count a stack
    Multiplicative,
    /// Keep the larger of each overlapping parameter, count a stack
    Max,
    /// Ignore re-application while the existing one is alive
    Reject,
}

impl CombinationPolicy {
    /// Whether this policy merges parameters and counts stacks
    pub fn is_stacking(self) -> bool {
        matches!(self, Self::Additive | Self::Multiplicative | Self::Max)
    }

    /// Combine one parameter present on both the old and new application.
    ///
    /// Returns `None` for policies that do not merge parameters.
    pub fn combine(self, old: f64, new: f64) -> Option<f64> {
        match self {
            Self::Additive => Some(old + new),
            Self::Multiplicative => Some(old * new),
            Self::Max => Some(old.max(new)),
            Self::Refresh | Self::Reject => None,
        }
    }
}

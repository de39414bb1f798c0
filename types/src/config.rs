//! Engine tuning tables.
//!
//! Every field has a serde default so a config file only needs to name the
//! values it changes. An empty TOML document yields [`EngineConfig::default`].

use serde::{Deserialize, Serialize};

use crate::TagGroup;

/// Stack cap applied on insertion when a modifier names none
pub const DEFAULT_MAX_STACKS: u32 = 5;

/// Upper bound on the fraction diminishing returns may remove
pub const DEFAULT_MAX_REDUCTION: f64 = 0.8;

// ═══════════════════════════════════════════════════════════════════════════
// Engine
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub diminishing: DiminishingConfig,
    pub build_risk: BuildRiskThresholds,
    pub max_policy_timer: MaxPolicyTimer,
    pub default_max_stacks: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            diminishing: DiminishingConfig::default(),
            build_risk: BuildRiskThresholds::default(),
            max_policy_timer: MaxPolicyTimer::default(),
            default_max_stacks: DEFAULT_MAX_STACKS,
        }
    }
}

/// How a `Max` re-application treats the running timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxPolicyTimer {
    /// Every re-application restarts the timer, even a weaker one
    #[default]
    ResetOnApply,
    /// Only a re-application that raises at least one parameter restarts
    /// the timer; weaker applications leave the expiry untouched
    KeepStrongest,
}

// ═══════════════════════════════════════════════════════════════════════════
// Diminishing Returns
// ═══════════════════════════════════════════════════════════════════════════

/// Derating parameters for one tag group
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupDerating {
    /// Fraction removed per stack beyond the first
    pub base_reduction: f64,
    /// Same-group skill count above which build validation warns
    pub max_stacks: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiminishingConfig {
    pub crowd_control: GroupDerating,
    pub stealth: GroupDerating,
    pub mobility: GroupDerating,
    pub max_reduction: f64,
}

impl Default for DiminishingConfig {
    fn default() -> Self {
        Self {
            crowd_control: GroupDerating { base_reduction: 0.5, max_stacks: 3 },
            stealth: GroupDerating { base_reduction: 0.3, max_stacks: 2 },
            mobility: GroupDerating { base_reduction: 0.2, max_stacks: 4 },
            max_reduction: DEFAULT_MAX_REDUCTION,
        }
    }
}

impl DiminishingConfig {
    pub fn group(&self, group: TagGroup) -> &GroupDerating {
        match group {
            TagGroup::CrowdControl => &self.crowd_control,
            TagGroup::Stealth => &self.stealth,
            TagGroup::Mobility => &self.mobility,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Build Risk
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildRiskThresholds {
    /// Crowd-control skills at or above this count make a build toxic
    pub toxic_crowd_control: u32,
    /// Stealth skills at or above this count make a build toxic
    pub toxic_stealth: u32,
    /// Defensive skills at or above this count (with no mobility) mark camping
    pub camping_defensive: u32,
}

impl Default for BuildRiskThresholds {
    fn default() -> Self {
        Self {
            toxic_crowd_control: 3,
            toxic_stealth: 2,
            camping_defensive: 3,
        }
    }
}

//! Damage-side reads over active modifiers.
//!
//! Pure functions of a target's [`ModifierView`]; the engine exposes them
//! per target. Conflicting effects resolve in a fixed order: execution
//! bonus first, then shield reduction.

use tempora_types::ModifierCategory;

use crate::engine::ModifierEngine;
use crate::handlers::SHIELD_DAMAGE_REDUCTION;
use crate::store::ModifierView;

/// Parameter on `DamageBoost` and `WeaponSpreadIncrease` modifiers
pub const MULTIPLIER: &str = "multiplier";
/// Health fraction at or below which an execution mark applies
pub const EXECUTION_THRESHOLD: &str = "threshold";
/// Extra damage taken while an execution mark applies
pub const EXECUTION_BONUS: &str = "bonus";

const DEFAULT_EXECUTION_THRESHOLD: f64 = 0.3;
const DEFAULT_EXECUTION_BONUS: f64 = 0.5;

/// `1 + Σ DamageBoost.multiplier`, floored at zero
pub fn outgoing_damage_multiplier(view: ModifierView<'_>) -> f64 {
    (1.0 + view.aggregate(&ModifierCategory::DamageBoost, MULTIPLIER, 0.0)).max(0.0)
}

/// Factor applied to damage a victim takes.
///
/// The strongest applicable execution mark adds its bonus; the strongest
/// shield then removes its `damage_reduction` (clamped to `[0, 1]`).
/// Neither marks nor shields sum with their own kind.
pub fn incoming_damage_factor(view: ModifierView<'_>, health_fraction: f64) -> f64 {
    let execution = view
        .of_category(&ModifierCategory::ExecutionMark)
        .filter(|m| {
            health_fraction <= m.parameter_or(EXECUTION_THRESHOLD, DEFAULT_EXECUTION_THRESHOLD)
        })
        .map(|m| m.parameter_or(EXECUTION_BONUS, DEFAULT_EXECUTION_BONUS).max(0.0))
        .fold(0.0, f64::max);

    let reduction = view
        .strongest(&ModifierCategory::Shield, SHIELD_DAMAGE_REDUCTION)
        .unwrap_or(0.0)
        .clamp(0.0, 1.0);

    ((1.0 + execution) * (1.0 - reduction)).max(0.0)
}

/// `1 + Σ WeaponSpreadIncrease.multiplier`
pub fn weapon_spread_multiplier(view: ModifierView<'_>) -> f64 {
    (1.0 + view.aggregate(&ModifierCategory::WeaponSpreadIncrease, MULTIPLIER, 0.0)).max(0.0)
}

impl ModifierEngine {
    pub fn outgoing_damage_multiplier(&self, attacker: &str) -> f64 {
        outgoing_damage_multiplier(self.view(attacker))
    }

    pub fn incoming_damage_factor(&self, victim: &str) -> f64 {
        let health = self.capabilities().health_fraction(victim).clamp(0.0, 1.0);
        incoming_damage_factor(self.view(victim), health)
    }

    pub fn weapon_spread_multiplier(&self, target: &str) -> f64 {
        weapon_spread_multiplier(self.view(target))
    }

    pub fn is_taunted(&self, target: &str) -> bool {
        self.has_category(target, &ModifierCategory::Taunt)
    }

    pub fn is_revealed(&self, target: &str) -> bool {
        self.has_category(target, &ModifierCategory::Reveal)
    }

    pub fn has_infinite_ammo(&self, target: &str) -> bool {
        self.has_category(target, &ModifierCategory::InfiniteAmmo)
    }
}

use tempora_types::ModifierCategory;

use super::{HookContext, ModifierHandler, RemovalReason};
use crate::modifier::Modifier;
use crate::store::{ApplyResult, ModifierView};

/// Drives the movement-speed factor for `SpeedBoost`, `SpeedReduction` and `Stun`.
///
/// The factor is recomputed from every live movement modifier on each
/// apply and remove, so overlapping boosts and slows never fight over it.
#[derive(Debug, Clone, Copy, Default)]
pub struct MovementHandler;

/// Parameter read from boost and reduction modifiers
pub const SPEED_MULTIPLIER: &str = "multiplier";

/// Combined movement-speed factor for one target.
///
/// Zero while stunned, otherwise the product of `1 + multiplier` for every
/// boost and `1 - multiplier` for every reduction, floored at zero.
pub fn movement_speed_factor(view: ModifierView<'_>) -> f64 {
    if view.has_category(&ModifierCategory::Stun) {
        return 0.0;
    }

    let boosts: f64 = view
        .of_category(&ModifierCategory::SpeedBoost)
        .map(|m| 1.0 + m.parameter_or(SPEED_MULTIPLIER, 0.0))
        .product();
    let reductions: f64 = view
        .of_category(&ModifierCategory::SpeedReduction)
        .map(|m| 1.0 - m.parameter_or(SPEED_MULTIPLIER, 0.0))
        .product();

    (boosts * reductions).max(0.0)
}

impl MovementHandler {
    fn sync(ctx: &mut HookContext<'_>, modifier: &Modifier) {
        let factor = movement_speed_factor(ctx.live());
        ctx.capabilities()
            .set_movement_speed_factor(modifier.target(), factor);
    }
}

impl ModifierHandler for MovementHandler {
    fn on_apply(&self, ctx: &mut HookContext<'_>, modifier: &Modifier, _result: ApplyResult) {
        Self::sync(ctx, modifier);
    }

    fn on_remove(&self, ctx: &mut HookContext<'_>, modifier: &Modifier, _reason: RemovalReason) {
        Self::sync(ctx, modifier);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::secs;
    use crate::store::ModifierStore;
    use tempora_types::MaxPolicyTimer;

    fn movement(id: &str, category: ModifierCategory, multiplier: f64) -> Modifier {
        Modifier::builder(id, "p1", category)
            .duration_secs(5.0)
            .param(SPEED_MULTIPLIER, multiplier)
            .build()
            .unwrap()
    }

    #[test]
    fn test_factor_combines_boosts_and_slows() {
        let mut store = ModifierStore::new();
        for modifier in [
            movement("sprint", ModifierCategory::SpeedBoost, 0.5),
            movement("chill", ModifierCategory::SpeedReduction, 0.2),
        ] {
            store.insert_or_combine(modifier, secs(0.0), 5, MaxPolicyTimer::ResetOnApply);
        }

        let factor = movement_speed_factor(store.view("p1", secs(1.0)));
        assert!((factor - 1.5 * 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_stun_pins_factor_to_zero() {
        let mut store = ModifierStore::new();
        for modifier in [
            movement("sprint", ModifierCategory::SpeedBoost, 0.5),
            movement("bash", ModifierCategory::Stun, 0.0),
        ] {
            store.insert_or_combine(modifier, secs(0.0), 5, MaxPolicyTimer::ResetOnApply);
        }

        assert_eq!(movement_speed_factor(store.view("p1", secs(1.0))), 0.0);
        assert_eq!(movement_speed_factor(store.view("nobody", secs(1.0))), 1.0);
    }

    #[test]
    fn test_factor_never_negative() {
        let mut store = ModifierStore::new();
        store.insert_or_combine(
            movement("glue", ModifierCategory::SpeedReduction, 1.4),
            secs(0.0),
            5,
            MaxPolicyTimer::ResetOnApply,
        );
        assert_eq!(movement_speed_factor(store.view("p1", secs(0.0))), 0.0);
    }
}

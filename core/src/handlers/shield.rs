use super::{HookContext, ModifierHandler};
use crate::modifier::Modifier;
use crate::store::ApplyResult;

/// One-time armour grant for `Shield` modifiers.
///
/// Armour is granted only when the shield is created; a refresh extends the
/// shield without granting again. `damage_reduction` is read by damage
/// calculation, not applied here.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShieldHandler;

pub const SHIELD_ARMOR: &str = "armor";
pub const SHIELD_ARMOR_CAP: &str = "armor_cap";
pub const SHIELD_DAMAGE_REDUCTION: &str = "damage_reduction";

const DEFAULT_ARMOR_CAP: f64 = 100.0;

impl ModifierHandler for ShieldHandler {
    fn on_apply(&self, ctx: &mut HookContext<'_>, modifier: &Modifier, result: ApplyResult) {
        if result != ApplyResult::Created {
            return;
        }
        let armor = modifier.parameter_or(SHIELD_ARMOR, 0.0);
        if armor > 0.0 {
            let cap = modifier.parameter_or(SHIELD_ARMOR_CAP, DEFAULT_ARMOR_CAP);
            ctx.capabilities().add_armor(modifier.target(), armor, cap);
        }
    }
}

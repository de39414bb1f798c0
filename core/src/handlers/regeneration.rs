use super::{HookContext, ModifierHandler};
use crate::modifier::Modifier;

/// Heals `heal_per_tick` every tick while alive
#[derive(Debug, Clone, Copy, Default)]
pub struct RegenerationHandler;

pub const HEAL_PER_TICK: &str = "heal_per_tick";

impl ModifierHandler for RegenerationHandler {
    fn on_tick(&self, ctx: &mut HookContext<'_>, modifier: &Modifier) {
        let amount = modifier.parameter_or(HEAL_PER_TICK, 0.0);
        if amount > 0.0 {
            ctx.capabilities().heal(modifier.target(), amount);
        }
    }
}

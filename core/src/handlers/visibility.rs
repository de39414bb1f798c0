use tempora_types::ModifierCategory;

use super::{HookContext, ModifierHandler, RemovalReason};
use crate::modifier::Modifier;
use crate::store::ApplyResult;

/// Hides the target while any `Invisibility` modifier is live
#[derive(Debug, Clone, Copy, Default)]
pub struct VisibilityHandler;

impl ModifierHandler for VisibilityHandler {
    fn on_apply(&self, ctx: &mut HookContext<'_>, modifier: &Modifier, _result: ApplyResult) {
        ctx.capabilities().set_visible(modifier.target(), false);
    }

    fn on_remove(&self, ctx: &mut HookContext<'_>, modifier: &Modifier, _reason: RemovalReason) {
        // Overlapping invisibility keeps the target hidden
        if ctx.live().has_category(&ModifierCategory::Invisibility) {
            return;
        }
        ctx.capabilities().set_visible(modifier.target(), true);
    }
}

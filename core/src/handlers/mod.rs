//! Modifier side effects.
//!
//! A [`ModifierHandler`] implements the three lifecycle hooks. Handlers
//! reach the engine two ways:
//! - **Registered**: one handler per [`ModifierCategory`](crate::ModifierCategory), composed into a
//!   [`HandlerRegistry`] at startup and shared by every modifier of that
//!   category.
//! - **Embedded**: a one-off [`EmbeddedBehavior`] carried by a single
//!   modifier (bespoke ultimates). Behaviour reused by more than one ability
//!   belongs in a registered handler instead.
//!
//! Hooks see a [`HookContext`]: the current time, a read-only view of the
//! target's live modifiers, the entity capability surface, and a queue for
//! chained applications. They cannot remove store entries.

mod movement;
mod regeneration;
mod registry;
mod shield;
mod visibility;

use std::fmt;

use crate::capabilities::EntityCapabilities;
use crate::clock::GameTime;
use crate::modifier::Modifier;
use crate::store::{ApplyResult, ModifierView};

pub use movement::{MovementHandler, SPEED_MULTIPLIER, movement_speed_factor};
pub use regeneration::{HEAL_PER_TICK, RegenerationHandler};
pub use registry::HandlerRegistry;
pub use shield::{SHIELD_ARMOR, SHIELD_ARMOR_CAP, SHIELD_DAMAGE_REDUCTION, ShieldHandler};
pub use visibility::VisibilityHandler;

/// Why a modifier left the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemovalReason {
    /// Its duration ran out during a tick (or before a re-application)
    Expired,
    /// Explicit `remove(target, id)`
    Removed,
    /// `remove_all(target)` or `clear()`: disconnect, death, round reset
    Cleared,
}

/// Apply/tick/remove hooks. All default to no-ops.
pub trait ModifierHandler {
    /// Runs once per successful application, including refreshes and merges.
    /// `result` says which; apply-only effects should check for `Created`.
    fn on_apply(&self, _ctx: &mut HookContext<'_>, _modifier: &Modifier, _result: ApplyResult) {}

    /// Runs once per tick while the modifier is alive
    fn on_tick(&self, _ctx: &mut HookContext<'_>, _modifier: &Modifier) {}

    /// Runs exactly once when the modifier leaves the store
    fn on_remove(&self, _ctx: &mut HookContext<'_>, _modifier: &Modifier, _reason: RemovalReason) {}
}

/// What a hook may see and do
pub struct HookContext<'a> {
    now: GameTime,
    live: ModifierView<'a>,
    capabilities: &'a mut dyn EntityCapabilities,
    chained: &'a mut Vec<Modifier>,
}

impl<'a> HookContext<'a> {
    pub(crate) fn new(
        now: GameTime,
        live: ModifierView<'a>,
        capabilities: &'a mut dyn EntityCapabilities,
        chained: &'a mut Vec<Modifier>,
    ) -> Self {
        Self { now, live, capabilities, chained }
    }

    pub fn now(&self) -> GameTime {
        self.now
    }

    /// Non-expired modifiers on the hook's target. During `on_remove` the
    /// departing modifier is already gone from this view.
    pub fn live(&self) -> ModifierView<'a> {
        self.live
    }

    pub fn capabilities(&mut self) -> &mut dyn EntityCapabilities {
        &mut *self.capabilities
    }

    /// Queue a chained application. It is applied after the current
    /// operation (or tick sweep) finishes, never mid-iteration.
    pub fn chain(&mut self, modifier: Modifier) {
        self.chained.push(modifier);
    }
}

type ApplyHook = Box<dyn Fn(&mut HookContext<'_>, &Modifier, ApplyResult)>;
type TickHook = Box<dyn Fn(&mut HookContext<'_>, &Modifier)>;
type RemoveHook = Box<dyn Fn(&mut HookContext<'_>, &Modifier, RemovalReason)>;

/// Closure-backed handler carried by a single modifier.
///
/// ```
/// use tempora_core::{EmbeddedBehavior, Modifier, ModifierCategory};
///
/// let ghost = Modifier::builder("phantom_walk", "player_7", ModifierCategory::Invisibility)
///     .duration_secs(8.0)
///     .embedded(
///         EmbeddedBehavior::new()
///             .on_apply(|ctx, m, _| ctx.capabilities().set_visible(m.target(), false))
///             .on_remove(|ctx, m, _| ctx.capabilities().set_visible(m.target(), true)),
///     )
///     .build()
///     .unwrap();
/// assert_eq!(ghost.id(), "phantom_walk");
/// ```
#[derive(Default)]
pub struct EmbeddedBehavior {
    apply: Option<ApplyHook>,
    tick: Option<TickHook>,
    remove: Option<RemoveHook>,
}

impl EmbeddedBehavior {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_apply<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut HookContext<'_>, &Modifier, ApplyResult) + 'static,
    {
        self.apply = Some(Box::new(hook));
        self
    }

    pub fn on_tick<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut HookContext<'_>, &Modifier) + 'static,
    {
        self.tick = Some(Box::new(hook));
        self
    }

    pub fn on_remove<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut HookContext<'_>, &Modifier, RemovalReason) + 'static,
    {
        self.remove = Some(Box::new(hook));
        self
    }
}

impl fmt::Debug for EmbeddedBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddedBehavior")
            .field("on_apply", &self.apply.is_some())
            .field("on_tick", &self.tick.is_some())
            .field("on_remove", &self.remove.is_some())
            .finish()
    }
}

impl ModifierHandler for EmbeddedBehavior {
    fn on_apply(&self, ctx: &mut HookContext<'_>, modifier: &Modifier, result: ApplyResult) {
        if let Some(hook) = &self.apply {
            hook(ctx, modifier, result);
        }
    }

    fn on_tick(&self, ctx: &mut HookContext<'_>, modifier: &Modifier) {
        if let Some(hook) = &self.tick {
            hook(ctx, modifier);
        }
    }

    fn on_remove(&self, ctx: &mut HookContext<'_>, modifier: &Modifier, reason: RemovalReason) {
        if let Some(hook) = &self.remove {
            hook(ctx, modifier, reason);
        }
    }
}

/// Lifecycle transition being dispatched
#[derive(Debug, Clone, Copy)]
pub(crate) enum Hook {
    Apply(ApplyResult),
    Tick,
    Remove(RemovalReason),
}

/// Run `hook` on whichever handler drives `modifier`, if any.
///
/// Embedded behaviour wins over the registry; a category with no
/// registered handler is query-only and dispatch is a no-op.
pub(crate) fn dispatch(
    registry: &HandlerRegistry,
    modifier: &Modifier,
    hook: Hook,
    ctx: &mut HookContext<'_>,
) {
    let handler: &dyn ModifierHandler = match modifier.behavior() {
        crate::modifier::Behavior::Embedded(handler) => handler.as_ref(),
        crate::modifier::Behavior::Registered => match registry.get(modifier.category()) {
            Some(handler) => handler,
            None => return,
        },
    };

    match hook {
        Hook::Apply(result) => handler.on_apply(ctx, modifier, result),
        Hook::Tick => handler.on_tick(ctx, modifier),
        Hook::Remove(reason) => handler.on_remove(ctx, modifier, reason),
    }
}

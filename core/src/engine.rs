//! Engine facade.
//!
//! [`ModifierEngine`] owns the store, the handler registry, the clock and the
//! capability surface, and is the only place hooks are dispatched from.
//! Ability code, command handlers and the host loop receive it by reference;
//! there is no global instance.
//!
//! Every mutating entry point takes `&mut self`. The engine holds `Rc` and
//! boxed single-threaded collaborators, so it is `!Send` and stays on the
//! simulation thread that built it.

use tempora_types::{EngineConfig, ModifierCategory, TagGroup};

use crate::capabilities::EntityCapabilities;
use crate::clock::{Clock, GameTime};
use crate::diminishing::derate;
use crate::error::RegistryError;
use crate::handlers::{Hook, HookContext, HandlerRegistry, RemovalReason, dispatch, movement_speed_factor};
use crate::modifier::Modifier;
use crate::store::{ApplyResult, ModifierStore, ModifierView};

/// Rounds of chained applications resolved per operation
const MAX_CHAIN_ROUNDS: usize = 8;

pub struct ModifierEngine {
    pub(crate) store: ModifierStore,
    pub(crate) registry: HandlerRegistry,
    pub(crate) clock: Box<dyn Clock>,
    pub(crate) capabilities: Box<dyn EntityCapabilities>,
    pub(crate) config: EngineConfig,
    /// Applications queued by hooks, resolved after the current operation
    pub(crate) chained: Vec<Modifier>,
}

impl ModifierEngine {
    pub fn new(
        registry: HandlerRegistry,
        clock: impl Clock + 'static,
        capabilities: impl EntityCapabilities + 'static,
        config: EngineConfig,
    ) -> Self {
        tracing::debug!(
            handlers = registry.len(),
            max_policy_timer = ?config.max_policy_timer,
            "modifier engine composed"
        );
        Self {
            store: ModifierStore::new(),
            registry,
            clock: Box::new(clock),
            capabilities: Box::new(capabilities),
            config,
            chained: Vec::new(),
        }
    }

    /// Engine with the built-in handlers and default tuning
    pub fn with_builtins(
        clock: impl Clock + 'static,
        capabilities: impl EntityCapabilities + 'static,
    ) -> Result<Self, RegistryError> {
        let registry = HandlerRegistry::with_builtins()?;
        Ok(Self::new(registry, clock, capabilities, EngineConfig::default()))
    }

    pub fn now(&self) -> GameTime {
        self.clock.now()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn store(&self) -> &ModifierStore {
        &self.store
    }

    pub fn capabilities(&self) -> &dyn EntityCapabilities {
        self.capabilities.as_ref()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutation
    // ─────────────────────────────────────────────────────────────────────────

    /// Apply a modifier at the clock's current time.
    ///
    /// Fires `on_apply` once for every result except `Rejected`, then
    /// resolves any applications the hook chained.
    pub fn apply(&mut self, modifier: Modifier) -> ApplyResult {
        let now = self.clock.now();
        let result = self.apply_at(modifier, now);
        self.flush_chained(now);
        result
    }

    /// Remove one modifier, firing `on_remove` if it was present.
    /// Removing an absent id is a no-op that returns `false`.
    pub fn remove(&mut self, target: &str, id: &str) -> bool {
        let now = self.clock.now();
        let reason = match self.store.get(target, id) {
            Some(modifier) if modifier.is_expired(now) => RemovalReason::Expired,
            Some(_) => RemovalReason::Removed,
            None => return false,
        };
        let removed = self.remove_entry(target, id, now, reason);
        self.flush_chained(now);
        removed
    }

    /// Remove every modifier on `target` (disconnect, death, round reset).
    /// Returns how many were removed; zero is fine.
    pub fn remove_all(&mut self, target: &str) -> usize {
        let now = self.clock.now();
        let removed = self.clear_target(target, now);
        self.flush_chained(now);
        removed
    }

    /// Remove every modifier on every target
    pub fn clear(&mut self) -> usize {
        let now = self.clock.now();
        let removed: usize = self
            .store
            .target_ids()
            .iter()
            .map(|target| self.clear_target(target, now))
            .sum();
        self.flush_chained(now);
        removed
    }

    pub(crate) fn apply_at(&mut self, modifier: Modifier, now: GameTime) -> ApplyResult {
        let target = modifier.target().to_owned();
        let id = modifier.id().to_owned();
        let category = modifier.category().clone();

        // An expired entry not yet swept ends here; it is never merged into
        if self.store.get(&target, &id).is_some_and(|m| m.is_expired(now)) {
            self.remove_entry(&target, &id, now, RemovalReason::Expired);
        }

        let result = self.store.insert_or_combine(
            modifier,
            now,
            self.config.default_max_stacks,
            self.config.max_policy_timer,
        );

        if result == ApplyResult::Rejected {
            tracing::debug!(entity = %target, modifier = %id, category = %category, "modifier rejected");
            return result;
        }
        tracing::debug!(
            entity = %target,
            modifier = %id,
            category = %category,
            result = ?result,
            "modifier applied"
        );

        if let Some(entry) = self.store.get(&target, &id) {
            let mut ctx = HookContext::new(
                now,
                self.store.view(&target, now),
                self.capabilities.as_mut(),
                &mut self.chained,
            );
            dispatch(&self.registry, entry, Hook::Apply(result), &mut ctx);
        }
        result
    }

    /// Take one entry out of the store and fire its `on_remove`
    pub(crate) fn remove_entry(
        &mut self,
        target: &str,
        id: &str,
        now: GameTime,
        reason: RemovalReason,
    ) -> bool {
        let Some(removed) = self.store.take(target, id) else {
            return false;
        };
        tracing::debug!(
            entity = %target,
            modifier = %id,
            category = %removed.category(),
            reason = ?reason,
            "modifier removed"
        );

        let mut ctx = HookContext::new(
            now,
            self.store.view(target, now),
            self.capabilities.as_mut(),
            &mut self.chained,
        );
        dispatch(&self.registry, &removed, Hook::Remove(reason), &mut ctx);
        true
    }

    fn clear_target(&mut self, target: &str, now: GameTime) -> usize {
        let removed = self.store.take_all(target);
        if removed.is_empty() {
            return 0;
        }
        tracing::debug!(entity = %target, count = removed.len(), "modifiers cleared");

        for modifier in &removed {
            let mut ctx = HookContext::new(
                now,
                self.store.view(target, now),
                self.capabilities.as_mut(),
                &mut self.chained,
            );
            dispatch(&self.registry, modifier, Hook::Remove(RemovalReason::Cleared), &mut ctx);
        }
        removed.len()
    }

    /// Apply queued chained modifiers. Returns how many were applied.
    pub(crate) fn flush_chained(&mut self, now: GameTime) -> usize {
        let mut applied = 0;
        for _ in 0..MAX_CHAIN_ROUNDS {
            if self.chained.is_empty() {
                return applied;
            }
            for modifier in std::mem::take(&mut self.chained) {
                self.apply_at(modifier, now);
                applied += 1;
            }
        }

        if !self.chained.is_empty() {
            tracing::warn!(
                dropped = self.chained.len(),
                rounds = MAX_CHAIN_ROUNDS,
                "chained application limit reached, dropping the rest"
            );
            self.chained.clear();
        }
        applied
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries (pure reads, as of the clock's current time)
    // ─────────────────────────────────────────────────────────────────────────

    pub fn view(&self, target: &str) -> ModifierView<'_> {
        self.store.view(target, self.clock.now())
    }

    /// Active modifiers on `target`, optionally filtered by category
    pub fn query(&self, target: &str, category: Option<&ModifierCategory>) -> Vec<&Modifier> {
        let view = self.view(target);
        match category {
            Some(category) => view.of_category(category).collect(),
            None => view.iter().collect(),
        }
    }

    pub fn get(&self, target: &str, id: &str) -> Option<&Modifier> {
        self.view(target).get(id)
    }

    pub fn has(&self, target: &str, id: &str) -> bool {
        self.view(target).has(id)
    }

    pub fn has_category(&self, target: &str, category: &ModifierCategory) -> bool {
        self.view(target).has_category(category)
    }

    /// `key` from the first active modifier of `category`, in application order
    pub fn get_parameter(
        &self,
        target: &str,
        category: &ModifierCategory,
        key: &str,
        default: f64,
    ) -> f64 {
        self.view(target).parameter(category, key, default)
    }

    /// Sum of `key` across every active modifier of `category`
    pub fn get_aggregate_parameter(
        &self,
        target: &str,
        category: &ModifierCategory,
        key: &str,
        default: f64,
    ) -> f64 {
        self.view(target).aggregate(category, key, default)
    }

    /// Active modifiers on `target` tagged with `group`
    pub fn stack_count(&self, target: &str, group: TagGroup) -> u32 {
        self.view(target).group_count(group)
    }

    /// Derate `base_value` by the number of active `group` modifiers on `target`
    pub fn derate_for(&self, target: &str, group: TagGroup, base_value: f64) -> f64 {
        derate(&self.config.diminishing, group, base_value, self.stack_count(target, group))
    }

    pub fn movement_speed_factor(&self, target: &str) -> f64 {
        movement_speed_factor(self.view(target))
    }
}

impl std::fmt::Debug for ModifierEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModifierEngine")
            .field("store", &self.store)
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

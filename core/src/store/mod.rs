//! Live modifier state, per target.
//!
//! The store is plain data: it owns every active [`Modifier`], resolves
//! re-application through the combination policy, and answers reads. It
//! never runs side effects; hook dispatch belongs to
//! [`ModifierEngine`](crate::ModifierEngine).
//!
//! Each target's modifiers are kept in application order. A refresh or merge
//! keeps the entry in its original slot.

mod view;

use hashbrown::HashMap;
use serde::Serialize;
use tempora_types::MaxPolicyTimer;

use crate::clock::GameTime;
use crate::modifier::{Modifier, TargetId};

pub use view::ModifierView;

/// Outcome of applying a modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyResult {
    /// No entry shared `(target, id)`; a new one was inserted
    Created,
    /// The existing entry's timer restarted (parameters replaced or capped)
    Refreshed,
    /// Parameters were combined into the existing entry
    Merged,
    /// The existing entry's policy refused the application
    Rejected,
}

impl ApplyResult {
    /// Whether the application took effect (and fires `on_apply`)
    pub fn is_applied(self) -> bool {
        !matches!(self, Self::Rejected)
    }
}

#[derive(Debug, Default)]
pub struct ModifierStore {
    targets: HashMap<TargetId, Vec<Modifier>>,
}

impl ModifierStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a modifier or fold it into the entry sharing its `(target, id)`.
    ///
    /// An entry that has already expired but not yet been swept is never
    /// merged into; callers must remove it first (the engine does).
    pub fn insert_or_combine(
        &mut self,
        mut modifier: Modifier,
        now: GameTime,
        default_max_stacks: u32,
        max_timer: MaxPolicyTimer,
    ) -> ApplyResult {
        let entries = self.targets.entry(modifier.target().to_owned()).or_default();

        if let Some(existing) = entries.iter_mut().find(|m| m.id() == modifier.id()) {
            return existing.absorb(modifier, now, max_timer);
        }

        modifier.stamp(now, default_max_stacks);
        entries.push(modifier);
        ApplyResult::Created
    }

    pub fn get(&self, target: &str, id: &str) -> Option<&Modifier> {
        self.live(target).iter().find(|m| m.id() == id)
    }

    /// Every stored modifier on `target` in application order, including
    /// expired entries the tick driver has not swept yet
    pub fn live(&self, target: &str) -> &[Modifier] {
        self.targets.get(target).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Read-only view of the non-expired modifiers on `target`
    pub fn view(&self, target: &str, now: GameTime) -> ModifierView<'_> {
        ModifierView::new(self.live(target), now)
    }

    /// Remove and return one entry. Drops the target once its set is empty.
    pub fn take(&mut self, target: &str, id: &str) -> Option<Modifier> {
        let entries = self.targets.get_mut(target)?;
        let index = entries.iter().position(|m| m.id() == id)?;
        let removed = entries.remove(index);
        if entries.is_empty() {
            self.targets.remove(target);
        }
        Some(removed)
    }

    /// Remove and return every entry on `target`, in application order
    pub fn take_all(&mut self, target: &str) -> Vec<Modifier> {
        self.targets.remove(target).unwrap_or_default()
    }

    /// Snapshot of the ids on `target`, in application order
    pub fn ids(&self, target: &str) -> Vec<String> {
        self.live(target).iter().map(|m| m.id().to_owned()).collect()
    }

    /// Snapshot of every target that currently holds modifiers
    pub fn target_ids(&self) -> Vec<TargetId> {
        self.targets.keys().cloned().collect()
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// Total stored modifiers across all targets
    pub fn len(&self) -> usize {
        self.targets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Drop targets whose modifier set became empty
    pub(crate) fn prune_empty(&mut self) {
        self.targets.retain(|_, entries| !entries.is_empty());
    }
}

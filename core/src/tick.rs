//! Tick driver.
//!
//! One [`ModifierEngine::tick`] per simulation step. Each target's modifier
//! ids are snapshotted before the sweep; entries are looked up again by id
//! as the sweep reaches them, so nothing iterates the live collection while
//! it changes. Applications chained by hooks during the sweep are resolved
//! after it, which makes them tick-eligible from the next tick on.

use serde::Serialize;

use crate::clock::GameTime;
use crate::engine::ModifierEngine;
use crate::handlers::{Hook, HookContext, RemovalReason, dispatch};

/// What one tick did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
    /// Targets that held modifiers when the sweep started
    pub targets: usize,
    /// `on_tick` invocations
    pub ticked: usize,
    /// Modifiers removed because their duration ran out
    pub expired: usize,
    /// Chained applications resolved after the sweep
    pub chained: usize,
}

impl ModifierEngine {
    /// Advance every active modifier to `now`.
    ///
    /// For each target, in application order: an expired modifier is
    /// removed and gets `on_remove`, a live one gets `on_tick`. An expired
    /// modifier is never ticked.
    pub fn tick(&mut self, now: GameTime) -> TickReport {
        let mut report = TickReport::default();

        for target in self.store.target_ids() {
            report.targets += 1;

            for id in self.store.ids(&target) {
                let Some(modifier) = self.store.get(&target, &id) else {
                    continue;
                };

                if modifier.is_expired(now) {
                    self.remove_entry(&target, &id, now, RemovalReason::Expired);
                    report.expired += 1;
                } else {
                    let mut ctx = HookContext::new(
                        now,
                        self.store.view(&target, now),
                        self.capabilities.as_mut(),
                        &mut self.chained,
                    );
                    dispatch(&self.registry, modifier, Hook::Tick, &mut ctx);
                    report.ticked += 1;
                }
            }
        }

        self.store.prune_empty();
        report.chained = self.flush_chained(now);

        tracing::trace!(
            targets = report.targets,
            ticked = report.ticked,
            expired = report.expired,
            chained = report.chained,
            "tick"
        );
        report
    }

    /// Tick at the clock's current time
    pub fn tick_now(&mut self) -> TickReport {
        let now = self.clock.now();
        self.tick(now)
    }
}

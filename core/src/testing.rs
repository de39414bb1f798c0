//! Test doubles for engine consumers.
//!
//! Also used by the replay tool to show what each step did to the game.
//!
//! [`RecordingCapabilities`] and [`CountingHandler`] keep their state behind
//! `Rc<RefCell<_>>`, so a test keeps one clone and hands the other to the
//! engine, then inspects what happened after each operation.

use std::cell::RefCell;
use std::rc::Rc;

use hashbrown::HashMap;
use serde::Serialize;

use crate::capabilities::EntityCapabilities;
use crate::handlers::{HookContext, ModifierHandler, RemovalReason};
use crate::modifier::Modifier;
use crate::store::ApplyResult;

/// One call made through the capability surface
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum CapabilityCall {
    MovementSpeed { target: String, factor: f64 },
    Visible { target: String, visible: bool },
    Armor { target: String, amount: f64, cap: f64 },
    Heal { target: String, amount: f64 },
}

#[derive(Debug, Default)]
struct Recorded {
    calls: Vec<CapabilityCall>,
    health: HashMap<String, f64>,
}

/// Capability surface that records every call
#[derive(Debug, Clone, Default)]
pub struct RecordingCapabilities {
    inner: Rc<RefCell<Recorded>>,
}

impl RecordingCapabilities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<CapabilityCall> {
        self.inner.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.inner.borrow_mut().calls.clear();
    }

    /// Set the health fraction reported for `target` (unset targets are at 1.0)
    pub fn set_health(&self, target: &str, fraction: f64) {
        self.inner.borrow_mut().health.insert(target.to_owned(), fraction);
    }

    /// Last movement speed factor pushed for `target`
    pub fn movement_speed(&self, target: &str) -> Option<f64> {
        self.inner.borrow().calls.iter().rev().find_map(|call| match call {
            CapabilityCall::MovementSpeed { target: t, factor } if t == target => Some(*factor),
            _ => None,
        })
    }

    /// Last visibility pushed for `target`
    pub fn visible(&self, target: &str) -> Option<bool> {
        self.inner.borrow().calls.iter().rev().find_map(|call| match call {
            CapabilityCall::Visible { target: t, visible } if t == target => Some(*visible),
            _ => None,
        })
    }

    pub fn total_armor(&self, target: &str) -> f64 {
        self.inner
            .borrow()
            .calls
            .iter()
            .filter_map(|call| match call {
                CapabilityCall::Armor { target: t, amount, .. } if t == target => Some(*amount),
                _ => None,
            })
            .sum()
    }

    pub fn total_healed(&self, target: &str) -> f64 {
        self.inner
            .borrow()
            .calls
            .iter()
            .filter_map(|call| match call {
                CapabilityCall::Heal { target: t, amount } if t == target => Some(*amount),
                _ => None,
            })
            .sum()
    }

    fn record(&self, call: CapabilityCall) {
        self.inner.borrow_mut().calls.push(call);
    }
}

impl EntityCapabilities for RecordingCapabilities {
    fn set_movement_speed_factor(&mut self, target: &str, factor: f64) {
        self.record(CapabilityCall::MovementSpeed { target: target.to_owned(), factor });
    }

    fn set_visible(&mut self, target: &str, visible: bool) {
        self.record(CapabilityCall::Visible { target: target.to_owned(), visible });
    }

    fn add_armor(&mut self, target: &str, amount: f64, cap: f64) {
        self.record(CapabilityCall::Armor { target: target.to_owned(), amount, cap });
    }

    fn heal(&mut self, target: &str, amount: f64) {
        self.record(CapabilityCall::Heal { target: target.to_owned(), amount });
    }

    fn health_fraction(&self, target: &str) -> f64 {
        self.inner.borrow().health.get(target).copied().unwrap_or(1.0)
    }
}

/// Hook invocation counts for one modifier id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookCounts {
    pub applied: u32,
    pub ticked: u32,
    pub removed: u32,
    pub results: Vec<ApplyResult>,
    pub reasons: Vec<RemovalReason>,
}

/// Handler that counts hook invocations per modifier id
#[derive(Debug, Clone, Default)]
pub struct CountingHandler {
    counts: Rc<RefCell<HashMap<String, HookCounts>>>,
    /// Modifier ids in the order `on_tick` saw them
    tick_order: Rc<RefCell<Vec<String>>>,
}

impl CountingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counts(&self, id: &str) -> HookCounts {
        self.counts.borrow().get(id).cloned().unwrap_or_default()
    }

    pub fn tick_order(&self) -> Vec<String> {
        self.tick_order.borrow().clone()
    }

    fn update(&self, id: &str, f: impl FnOnce(&mut HookCounts)) {
        f(self.counts.borrow_mut().entry(id.to_owned()).or_default());
    }
}

impl ModifierHandler for CountingHandler {
    fn on_apply(&self, _ctx: &mut HookContext<'_>, modifier: &Modifier, result: ApplyResult) {
        self.update(modifier.id(), |c| {
            c.applied += 1;
            c.results.push(result);
        });
    }

    fn on_tick(&self, _ctx: &mut HookContext<'_>, modifier: &Modifier) {
        self.update(modifier.id(), |c| c.ticked += 1);
        self.tick_order.borrow_mut().push(modifier.id().to_owned());
    }

    fn on_remove(&self, _ctx: &mut HookContext<'_>, modifier: &Modifier, reason: RemovalReason) {
        self.update(modifier.id(), |c| {
            c.removed += 1;
            c.reasons.push(reason);
        });
    }
}

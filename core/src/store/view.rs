use tempora_types::{ModifierCategory, TagGroup};

use crate::clock::GameTime;
use crate::modifier::Modifier;

/// Non-expired modifiers on one target, as of `now`.
///
/// Every aggregate is computed by filtering this set on demand; nothing is
/// cached alongside the store.
#[derive(Debug, Clone, Copy)]
pub struct ModifierView<'a> {
    modifiers: &'a [Modifier],
    now: GameTime,
}

impl<'a> ModifierView<'a> {
    pub fn new(modifiers: &'a [Modifier], now: GameTime) -> Self {
        Self { modifiers, now }
    }

    pub fn now(&self) -> GameTime {
        self.now
    }

    pub fn iter(self) -> impl Iterator<Item = &'a Modifier> + 'a {
        let now = self.now;
        self.modifiers.iter().filter(move |m| !m.is_expired(now))
    }

    pub fn of_category<'c>(
        self,
        category: &'c ModifierCategory,
    ) -> impl Iterator<Item = &'a Modifier> + 'c
    where
        'a: 'c,
    {
        self.iter().filter(move |m| m.category() == category)
    }

    pub fn get(&self, id: &str) -> Option<&'a Modifier> {
        self.iter().find(|m| m.id() == id)
    }

    pub fn has(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn has_category(&self, category: &ModifierCategory) -> bool {
        self.of_category(category).next().is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// `key` on the first matching modifier in application order
    pub fn parameter(&self, category: &ModifierCategory, key: &str, default: f64) -> f64 {
        self.of_category(category)
            .find_map(|m| m.parameter(key))
            .unwrap_or(default)
    }

    /// Sum of `key` across every matching modifier
    pub fn aggregate(&self, category: &ModifierCategory, key: &str, default: f64) -> f64 {
        self.of_category(category)
            .filter_map(|m| m.parameter(key))
            .fold(None, |sum: Option<f64>, value| Some(sum.unwrap_or(0.0) + value))
            .unwrap_or(default)
    }

    /// Largest `key` across every matching modifier
    pub fn strongest(&self, category: &ModifierCategory, key: &str) -> Option<f64> {
        self.of_category(category)
            .filter_map(|m| m.parameter(key))
            .fold(None, |best: Option<f64>, value| Some(best.map_or(value, |b| b.max(value))))
    }

    /// Number of modifiers tagged with `group`
    pub fn group_count(&self, group: TagGroup) -> u32 {
        let count = self.iter().filter(|m| m.tag_group() == Some(group)).count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}

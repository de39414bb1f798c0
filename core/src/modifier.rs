//! The timed modifier and its combination rules.
//!
//! A [`Modifier`] is built (and validated) by ability code through
//! [`Modifier::builder`], then handed to the engine. The engine stamps the
//! application time; after that only re-application through the
//! [`CombinationPolicy`] rewrites its timer or parameters.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use tempora_types::{CombinationPolicy, MaxPolicyTimer, ModifierCategory, TagGroup, DEFAULT_MAX_STACKS};

use crate::clock::GameTime;
use crate::error::ModifierError;
use crate::handlers::ModifierHandler;
use crate::store::ApplyResult;

/// Opaque player identity
pub type TargetId = String;

/// Named magnitudes read by handlers and queries (e.g. `"multiplier" -> 0.1`)
pub type Parameters = BTreeMap<String, f64>;

/// `now - applied_at >= duration`
pub fn is_expired(applied_at: GameTime, duration: Duration, now: GameTime) -> bool {
    now.saturating_sub(applied_at) >= duration
}

/// Where a modifier's side effects come from
#[derive(Clone, Default)]
pub enum Behavior {
    /// Resolved through the handler registry by category
    #[default]
    Registered,
    /// Carried by this modifier instance
    Embedded(Rc<dyn ModifierHandler>),
}

impl fmt::Debug for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registered => f.write_str("Registered"),
            Self::Embedded(_) => f.write_str("Embedded(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Modifier {
    id: String,
    target: TargetId,
    category: ModifierCategory,
    duration: Duration,
    applied_at: GameTime,
    policy: CombinationPolicy,
    parameters: Parameters,
    current_stacks: u32,
    max_stacks: Option<u32>,
    tag_group: Option<TagGroup>,
    behavior: Behavior,
}

impl Modifier {
    pub fn builder(
        id: impl Into<String>,
        target: impl Into<TargetId>,
        category: ModifierCategory,
    ) -> ModifierBuilder {
        ModifierBuilder::new(id, target, category)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn category(&self) -> &ModifierCategory {
        &self.category
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn applied_at(&self) -> GameTime {
        self.applied_at
    }

    pub fn expires_at(&self) -> GameTime {
        self.applied_at.saturating_add(self.duration)
    }

    pub fn policy(&self) -> CombinationPolicy {
        self.policy
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn parameter(&self, key: &str) -> Option<f64> {
        self.parameters.get(key).copied()
    }

    pub fn parameter_or(&self, key: &str, default: f64) -> f64 {
        self.parameter(key).unwrap_or(default)
    }

    pub fn current_stacks(&self) -> u32 {
        self.current_stacks
    }

    pub fn max_stacks(&self) -> u32 {
        self.max_stacks.unwrap_or(DEFAULT_MAX_STACKS)
    }

    pub fn tag_group(&self) -> Option<TagGroup> {
        self.tag_group
    }

    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    pub fn is_expired(&self, now: GameTime) -> bool {
        is_expired(self.applied_at, self.duration, now)
    }

    pub fn remaining(&self, now: GameTime) -> Duration {
        self.expires_at().saturating_sub(now)
    }

    /// Stamp a fresh application. Fills in the stack cap if the author left it open.
    pub(crate) fn stamp(&mut self, now: GameTime, default_max_stacks: u32) {
        self.applied_at = now;
        self.current_stacks = 1;
        if self.max_stacks.is_none() {
            self.max_stacks = Some(default_max_stacks.max(1));
        }
    }

    /// Fold a re-application of the same `(target, id)` into this entry.
    ///
    /// The policy of the incoming application decides the outcome. Stacking
    /// policies count a stack and merge parameters while below the stack cap;
    /// at the cap Additive and Multiplicative only restart the timer.
    ///
    /// The entry keeps its original behaviour: its cleanup belongs to the
    /// instance that ran `on_apply` first and must run exactly once.
    pub(crate) fn absorb(
        &mut self,
        incoming: Modifier,
        now: GameTime,
        max_timer: MaxPolicyTimer,
    ) -> ApplyResult {
        match incoming.policy {
            CombinationPolicy::Reject => ApplyResult::Rejected,
            CombinationPolicy::Refresh => {
                self.applied_at = now;
                self.duration = incoming.duration;
                self.parameters = incoming.parameters;
                self.policy = incoming.policy;
                self.tag_group = incoming.tag_group;
                // One application's magnitude again
                self.current_stacks = 1;
                ApplyResult::Refreshed
            }
            policy => {
                let below_cap = self.current_stacks < self.max_stacks();
                let mut raised = false;

                // Max keeps tracking the strongest value past the stack cap
                if below_cap || policy == CombinationPolicy::Max {
                    for (key, value) in incoming.parameters {
                        match self.parameters.get_mut(&key) {
                            Some(existing) => {
                                let combined = policy.combine(*existing, value).unwrap_or(value);
                                raised |= combined > *existing;
                                *existing = combined;
                            }
                            None => {
                                raised = true;
                                self.parameters.insert(key, value);
                            }
                        }
                    }
                }
                if below_cap {
                    self.current_stacks += 1;
                }

                let reset_timer = policy != CombinationPolicy::Max
                    || max_timer == MaxPolicyTimer::ResetOnApply
                    || raised;
                if reset_timer {
                    self.applied_at = now;
                    self.duration = incoming.duration;
                }
                self.policy = policy;

                match (below_cap, reset_timer) {
                    (true, _) => ApplyResult::Merged,
                    (false, true) => ApplyResult::Refreshed,
                    (false, false) => ApplyResult::Merged,
                }
            }
        }
    }
}

/// Validating constructor for [`Modifier`]
#[derive(Debug, Clone)]
pub struct ModifierBuilder {
    id: String,
    target: TargetId,
    category: ModifierCategory,
    duration_secs: f64,
    /// Set by [`ModifierBuilder::duration`]; skips the float conversion
    exact_duration: Option<Duration>,
    policy: CombinationPolicy,
    parameters: Parameters,
    max_stacks: Option<u32>,
    tag_group: Option<TagGroup>,
    behavior: Behavior,
}

impl ModifierBuilder {
    pub fn new(id: impl Into<String>, target: impl Into<TargetId>, category: ModifierCategory) -> Self {
        Self {
            id: id.into(),
            target: target.into(),
            category,
            duration_secs: 0.0,
            exact_duration: None,
            policy: CombinationPolicy::default(),
            parameters: Parameters::new(),
            max_stacks: None,
            tag_group: None,
            behavior: Behavior::Registered,
        }
    }

    pub fn duration_secs(mut self, secs: f64) -> Self {
        self.duration_secs = secs;
        self.exact_duration = None;
        self
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration_secs = duration.as_secs_f64();
        self.exact_duration = Some(duration);
        self
    }

    pub fn policy(mut self, policy: CombinationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: f64) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }

    pub fn params(mut self, parameters: impl IntoIterator<Item = (String, f64)>) -> Self {
        self.parameters.extend(parameters);
        self
    }

    pub fn max_stacks(mut self, max_stacks: u32) -> Self {
        self.max_stacks = Some(max_stacks);
        self
    }

    pub fn tag_group(mut self, group: TagGroup) -> Self {
        self.tag_group = Some(group);
        self
    }

    /// Carry one-off behaviour instead of resolving a registered handler
    pub fn embedded(mut self, handler: impl ModifierHandler + 'static) -> Self {
        self.behavior = Behavior::Embedded(Rc::new(handler));
        self
    }

    pub fn build(self) -> Result<Modifier, ModifierError> {
        if self.id.trim().is_empty() {
            return Err(ModifierError::EmptyId);
        }
        if self.target.trim().is_empty() {
            return Err(ModifierError::EmptyTarget { id: self.id });
        }
        if !self.duration_secs.is_finite() || self.duration_secs <= 0.0 {
            return Err(ModifierError::InvalidDuration {
                id: self.id,
                secs: self.duration_secs,
            });
        }
        let Some(duration) = self
            .exact_duration
            .or_else(|| Duration::try_from_secs_f64(self.duration_secs).ok())
        else {
            return Err(ModifierError::InvalidDuration {
                id: self.id,
                secs: self.duration_secs,
            });
        };
        // Sub-nanosecond durations round to zero
        if duration.is_zero() {
            return Err(ModifierError::InvalidDuration {
                id: self.id,
                secs: self.duration_secs,
            });
        }
        if self.max_stacks == Some(0) {
            return Err(ModifierError::InvalidMaxStacks { id: self.id });
        }
        if let Some(key) = self
            .parameters
            .iter()
            .find_map(|(key, value)| (!value.is_finite()).then(|| key.clone()))
        {
            return Err(ModifierError::InvalidParameter { id: self.id, key });
        }

        Ok(Modifier {
            id: self.id,
            target: self.target,
            category: self.category,
            duration,
            applied_at: GameTime::ZERO,
            policy: self.policy,
            parameters: self.parameters,
            current_stacks: 1,
            max_stacks: self.max_stacks,
            tag_group: self.tag_group,
            behavior: self.behavior,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::secs;

    fn boost(policy: CombinationPolicy, multiplier: f64) -> Modifier {
        Modifier::builder("damage_boost", "p1", ModifierCategory::DamageBoost)
            .duration_secs(10.0)
            .policy(policy)
            .param("multiplier", multiplier)
            .max_stacks(3)
            .build()
            .unwrap()
    }

    fn stamped(mut modifier: Modifier, at: f64) -> Modifier {
        modifier.stamp(secs(at), DEFAULT_MAX_STACKS);
        modifier
    }

    #[test]
    fn test_build_rejects_invalid_input() {
        let err = Modifier::builder("", "p1", ModifierCategory::Taunt)
            .duration_secs(1.0)
            .build()
            .unwrap_err();
        assert_eq!(err, ModifierError::EmptyId);

        let err = Modifier::builder("taunt", " ", ModifierCategory::Taunt)
            .duration_secs(1.0)
            .build()
            .unwrap_err();
        assert!(matches!(err, ModifierError::EmptyTarget { .. }));

        for bad in [0.0, -3.0, f64::NAN, f64::INFINITY] {
            let err = Modifier::builder("taunt", "p1", ModifierCategory::Taunt)
                .duration_secs(bad)
                .build()
                .unwrap_err();
            assert!(matches!(err, ModifierError::InvalidDuration { .. }), "{bad}");
        }

        let err = Modifier::builder("taunt", "p1", ModifierCategory::Taunt)
            .duration_secs(1.0)
            .max_stacks(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, ModifierError::InvalidMaxStacks { .. }));

        let err = Modifier::builder("taunt", "p1", ModifierCategory::Taunt)
            .duration_secs(1.0)
            .param("strength", f64::NAN)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ModifierError::InvalidParameter { id: "taunt".into(), key: "strength".into() }
        );
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let modifier = stamped(boost(CombinationPolicy::Refresh, 0.1), 2.0);
        assert!(!modifier.is_expired(secs(11.999)));
        assert!(modifier.is_expired(secs(12.0)));
        assert_eq!(modifier.remaining(secs(7.0)), secs(5.0));
    }

    #[test]
    fn test_stamp_fills_open_stack_cap() {
        let mut modifier = Modifier::builder("x", "p1", ModifierCategory::Reveal)
            .duration_secs(1.0)
            .build()
            .unwrap();
        modifier.stamp(secs(0.0), 7);
        assert_eq!(modifier.max_stacks(), 7);
    }

    #[test]
    fn test_additive_merges_until_cap() {
        let mut existing = stamped(boost(CombinationPolicy::Additive, 0.1), 0.0);

        assert_eq!(
            existing.absorb(boost(CombinationPolicy::Additive, 0.1), secs(1.0), MaxPolicyTimer::ResetOnApply),
            ApplyResult::Merged
        );
        assert!((existing.parameter_or("multiplier", 0.0) - 0.2).abs() < 1e-9);
        assert_eq!(existing.applied_at(), secs(1.0));

        existing.absorb(boost(CombinationPolicy::Additive, 0.1), secs(2.0), MaxPolicyTimer::ResetOnApply);
        assert_eq!(existing.current_stacks(), 3);

        // At the cap: timer restarts, magnitude does not grow
        let result =
            existing.absorb(boost(CombinationPolicy::Additive, 0.1), secs(3.0), MaxPolicyTimer::ResetOnApply);
        assert_eq!(result, ApplyResult::Refreshed);
        assert_eq!(existing.current_stacks(), 3);
        assert!((existing.parameter_or("multiplier", 0.0) - 0.3).abs() < 1e-9);
        assert_eq!(existing.applied_at(), secs(3.0));
    }

    #[test]
    fn test_multiplicative_and_union_of_keys() {
        let mut existing = stamped(boost(CombinationPolicy::Multiplicative, 2.0), 0.0);
        let incoming = Modifier::builder("damage_boost", "p1", ModifierCategory::DamageBoost)
            .duration_secs(4.0)
            .policy(CombinationPolicy::Multiplicative)
            .param("multiplier", 3.0)
            .param("bonus", 5.0)
            .build()
            .unwrap();

        existing.absorb(incoming, secs(1.0), MaxPolicyTimer::ResetOnApply);
        assert_eq!(existing.parameter("multiplier"), Some(6.0));
        assert_eq!(existing.parameter("bonus"), Some(5.0));
        assert_eq!(existing.duration(), secs(4.0));
    }

    #[test]
    fn test_refresh_adopts_new_parameters_and_duration() {
        let mut existing = stamped(boost(CombinationPolicy::Refresh, 0.5), 0.0);
        let incoming = Modifier::builder("damage_boost", "p1", ModifierCategory::DamageBoost)
            .duration_secs(3.0)
            .policy(CombinationPolicy::Refresh)
            .param("multiplier", 0.2)
            .build()
            .unwrap();

        assert_eq!(
            existing.absorb(incoming, secs(6.0), MaxPolicyTimer::ResetOnApply),
            ApplyResult::Refreshed
        );
        assert_eq!(existing.parameter("multiplier"), Some(0.2));
        assert_eq!(existing.expires_at(), secs(9.0));
        assert_eq!(existing.current_stacks(), 1);
    }

    #[test]
    fn test_reject_leaves_entry_untouched() {
        let mut existing = stamped(boost(CombinationPolicy::Reject, 0.5), 0.0);
        assert_eq!(
            existing.absorb(boost(CombinationPolicy::Reject, 0.9), secs(1.0), MaxPolicyTimer::ResetOnApply),
            ApplyResult::Rejected
        );
        assert_eq!(existing.parameter("multiplier"), Some(0.5));
        assert_eq!(existing.applied_at(), secs(0.0));
    }

    #[test]
    fn test_max_timer_rules() {
        let mut reset = stamped(boost(CombinationPolicy::Max, 0.5), 0.0);
        reset.absorb(boost(CombinationPolicy::Max, 0.3), secs(4.0), MaxPolicyTimer::ResetOnApply);
        assert_eq!(reset.parameter("multiplier"), Some(0.5));
        assert_eq!(reset.applied_at(), secs(4.0));

        let mut strongest = stamped(boost(CombinationPolicy::Max, 0.5), 0.0);
        strongest.absorb(boost(CombinationPolicy::Max, 0.3), secs(4.0), MaxPolicyTimer::KeepStrongest);
        assert_eq!(strongest.applied_at(), secs(0.0));

        strongest.absorb(boost(CombinationPolicy::Max, 0.8), secs(5.0), MaxPolicyTimer::KeepStrongest);
        assert_eq!(strongest.parameter("multiplier"), Some(0.8));
        assert_eq!(strongest.applied_at(), secs(5.0));
    }

    #[test]
    fn test_max_merges_past_the_stack_cap() {
        for timer in [MaxPolicyTimer::ResetOnApply, MaxPolicyTimer::KeepStrongest] {
            let mut existing = stamped(boost(CombinationPolicy::Max, 0.2), 0.0);
            existing.absorb(boost(CombinationPolicy::Max, 0.2), secs(1.0), timer);
            existing.absorb(boost(CombinationPolicy::Max, 0.2), secs(2.0), timer);
            assert_eq!(existing.current_stacks(), 3);

            // At the cap a stronger value still lands and restarts the timer
            let result = existing.absorb(boost(CombinationPolicy::Max, 0.7), secs(3.0), timer);
            assert_eq!(result, ApplyResult::Refreshed, "{timer:?}");
            assert_eq!(existing.current_stacks(), 3);
            assert_eq!(existing.parameter("multiplier"), Some(0.7));
            assert_eq!(existing.applied_at(), secs(3.0));

            // A weaker value at the cap only moves the timer under ResetOnApply
            let result = existing.absorb(boost(CombinationPolicy::Max, 0.4), secs(4.0), timer);
            assert_eq!(existing.parameter("multiplier"), Some(0.7));
            match timer {
                MaxPolicyTimer::ResetOnApply => {
                    assert_eq!(result, ApplyResult::Refreshed);
                    assert_eq!(existing.applied_at(), secs(4.0));
                }
                MaxPolicyTimer::KeepStrongest => {
                    assert_eq!(result, ApplyResult::Merged);
                    assert_eq!(existing.applied_at(), secs(3.0));
                }
            }
        }
    }

    #[test]
    fn test_refresh_resets_stack_count() {
        let mut existing = stamped(boost(CombinationPolicy::Additive, 0.1), 0.0);
        existing.absorb(boost(CombinationPolicy::Additive, 0.1), secs(1.0), MaxPolicyTimer::ResetOnApply);
        existing.absorb(boost(CombinationPolicy::Additive, 0.1), secs(2.0), MaxPolicyTimer::ResetOnApply);
        assert_eq!(existing.current_stacks(), 3);

        existing.absorb(boost(CombinationPolicy::Refresh, 0.1), secs(3.0), MaxPolicyTimer::ResetOnApply);
        assert_eq!(existing.current_stacks(), 1);
        assert_eq!(existing.parameter("multiplier"), Some(0.1));

        // Stacking resumes from one application
        let result =
            existing.absorb(boost(CombinationPolicy::Additive, 0.1), secs(4.0), MaxPolicyTimer::ResetOnApply);
        assert_eq!(result, ApplyResult::Merged);
        assert_eq!(existing.current_stacks(), 2);
        assert!((existing.parameter_or("multiplier", 0.0) - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_refresh_keeps_embedded_behavior() {
        use crate::handlers::EmbeddedBehavior;

        let ult = |marker: f64| {
            Modifier::builder("ult", "p1", ModifierCategory::Custom("ult".into()))
                .duration_secs(5.0)
                .policy(CombinationPolicy::Refresh)
                .param("cast", marker)
                .embedded(EmbeddedBehavior::new())
                .build()
                .unwrap()
        };
        let mut existing = stamped(ult(1.0), 0.0);
        let Behavior::Embedded(original) = existing.behavior().clone() else {
            panic!("expected embedded behavior");
        };

        existing.absorb(ult(2.0), secs(1.0), MaxPolicyTimer::ResetOnApply);
        let Behavior::Embedded(kept) = existing.behavior() else {
            panic!("expected embedded behavior");
        };
        assert!(Rc::ptr_eq(&original, kept));
        assert_eq!(existing.parameter("cast"), Some(2.0));
    }

    #[test]
    fn test_huge_duration_saturates_expiry() {
        let mut modifier = Modifier::builder("forever", "p1", ModifierCategory::Reveal)
            .duration(Duration::MAX)
            .build()
            .unwrap();
        modifier.stamp(secs(10.0), DEFAULT_MAX_STACKS);
        assert_eq!(modifier.expires_at(), Duration::MAX);
        assert!(!modifier.is_expired(secs(1_000_000.0)));
        assert_eq!(modifier.remaining(secs(10.0)), Duration::MAX - secs(10.0));
    }
}

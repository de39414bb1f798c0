//! Diminishing returns and build risk.
//!
//! Both functions are pure: every input, including the stack count, comes
//! from the caller. Ability authors pass the number of same-group modifiers
//! active on a target; build validation passes the number of same-group
//! skills in a build.

use hashbrown::HashMap;
use serde::Serialize;
use tempora_types::{BuildRiskThresholds, DiminishingConfig, SkillTag, TagGroup};

/// Taper `base_value` for `stack_count` concurrent effects of `group`.
///
/// `stack_count <= 1` returns `base_value` unchanged. Above that, each stack
/// beyond the first removes the group's `base_reduction`, never past
/// `max_reduction`. The group's `max_stacks` is advisory and plays no part.
pub fn derate(config: &DiminishingConfig, group: TagGroup, base_value: f64, stack_count: u32) -> f64 {
    if stack_count <= 1 {
        return base_value;
    }
    let base_reduction = config.group(group).base_reduction;
    let reduction = (base_reduction * f64::from(stack_count - 1))
        .min(config.max_reduction)
        .max(0.0);
    base_value * (1.0 - reduction)
}

/// Advisory classification of a hero build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildRisk {
    /// Too much lockdown or stealth
    Toxic,
    /// Heavily defensive with no way to move
    Camping,
    Normal,
}

/// Number of skills carrying each tag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagCounts {
    counts: HashMap<SkillTag, u32>,
}

impl TagCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, tag: SkillTag) {
        *self.counts.entry(tag).or_default() += 1;
    }

    pub fn get(&self, tag: SkillTag) -> u32 {
        self.counts.get(&tag).copied().unwrap_or(0)
    }

    pub fn group(&self, group: TagGroup) -> u32 {
        self.get(group.into())
    }
}

impl FromIterator<SkillTag> for TagCounts {
    fn from_iter<I: IntoIterator<Item = SkillTag>>(iter: I) -> Self {
        let mut counts = Self::new();
        for tag in iter {
            counts.add(tag);
        }
        counts
    }
}

/// Toxic takes precedence over Camping.
pub fn classify_build_risk(thresholds: &BuildRiskThresholds, counts: &TagCounts) -> BuildRisk {
    if counts.get(SkillTag::CrowdControl) >= thresholds.toxic_crowd_control
        || counts.get(SkillTag::Stealth) >= thresholds.toxic_stealth
    {
        BuildRisk::Toxic
    } else if counts.get(SkillTag::Defensive) >= thresholds.camping_defensive
        && counts.get(SkillTag::Mobility) == 0
    {
        BuildRisk::Camping
    } else {
        BuildRisk::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_three_crowd_control_effects() {
        let config = DiminishingConfig::default();
        let value = derate(&config, TagGroup::CrowdControl, 100.0, 3);
        assert!((value - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_stack_is_unchanged() {
        let config = DiminishingConfig::default();
        for group in TagGroup::ALL {
            assert_eq!(derate(&config, group, 42.0, 0), 42.0);
            assert_eq!(derate(&config, group, 42.0, 1), 42.0);
        }
    }

    #[test]
    fn test_reduction_grows_past_group_max_stacks() {
        let config = DiminishingConfig::default();
        // Stealth: 1 - min(0.3 * 2, 0.8)
        assert!((derate(&config, TagGroup::Stealth, 100.0, 3) - 40.0).abs() < 1e-9);
        // Mobility: 1 - min(0.2 * 4, 0.8)
        assert!((derate(&config, TagGroup::Mobility, 100.0, 5) - 20.0).abs() < 1e-9);
        // Ceiling holds from there on
        assert!((derate(&config, TagGroup::Stealth, 100.0, 9) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_classify_build_risk() {
        let thresholds = BuildRiskThresholds::default();

        let cc: TagCounts = [SkillTag::CrowdControl; 3].into_iter().collect();
        assert_eq!(classify_build_risk(&thresholds, &cc), BuildRisk::Toxic);

        let stealth: TagCounts = [SkillTag::Stealth, SkillTag::Stealth].into_iter().collect();
        assert_eq!(classify_build_risk(&thresholds, &stealth), BuildRisk::Toxic);

        let turtle: TagCounts = [SkillTag::Defensive; 3].into_iter().collect();
        assert_eq!(classify_build_risk(&thresholds, &turtle), BuildRisk::Camping);

        let mut mobile_turtle = turtle.clone();
        mobile_turtle.add(SkillTag::Mobility);
        assert_eq!(classify_build_risk(&thresholds, &mobile_turtle), BuildRisk::Normal);

        // Toxic wins when both apply
        let mut both = turtle;
        for _ in 0..3 {
            both.add(SkillTag::CrowdControl);
        }
        assert_eq!(classify_build_risk(&thresholds, &both), BuildRisk::Toxic);
    }

    fn any_group() -> impl Strategy<Value = TagGroup> {
        prop_oneof![
            Just(TagGroup::CrowdControl),
            Just(TagGroup::Stealth),
            Just(TagGroup::Mobility),
        ]
    }

    proptest! {
        #[test]
        fn test_derate_is_non_increasing(group in any_group(), base in 0.0f64..1_000.0, n in 0u32..16) {
            let config = DiminishingConfig::default();
            prop_assert!(derate(&config, group, base, n + 1) <= derate(&config, group, base, n));
        }

        #[test]
        fn test_derate_never_removes_more_than_max_reduction(
            group in any_group(),
            base in 0.0f64..1_000.0,
            n in 0u32..64,
        ) {
            let config = DiminishingConfig::default();
            let floor = base * (1.0 - config.max_reduction);
            prop_assert!(derate(&config, group, base, n) >= floor - 1e-9);
        }
    }
}

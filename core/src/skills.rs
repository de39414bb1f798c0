//! Hero build validation.
//!
//! A build is a list of skills. Validation is advisory: it classifies the
//! build, logs a warning per problem found, and reports how hard each tag
//! group would be derated. It never rejects a build.

use serde::Serialize;
use std::time::Duration;
use tempora_types::{EngineConfig, SkillTag, TagGroup};

use crate::diminishing::{BuildRisk, TagCounts, classify_build_risk, derate};

#[derive(Debug, Clone, PartialEq)]
pub enum SkillKind {
    Active { cooldown: Duration },
    Ultimate { cooldown: Duration, charge_required: u32 },
    Passive,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Skill {
    pub id: String,
    pub name: String,
    /// Distinct tags; add through [`Skill::tagged`]
    tags: Vec<SkillTag>,
    pub kind: SkillKind,
}

impl Skill {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: SkillKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            tags: Vec::new(),
            kind,
        }
    }

    pub fn tagged(mut self, tag: SkillTag) -> Self {
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self
    }

    pub fn tags(&self) -> &[SkillTag] {
        &self.tags
    }

    pub fn has_tag(&self, tag: SkillTag) -> bool {
        self.tags.contains(&tag)
    }
}

/// Tag counts across a build. A skill counts once per distinct tag.
pub fn tag_counts(skills: &[Skill]) -> TagCounts {
    skills.iter().flat_map(|s| s.tags.iter().copied()).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildReport {
    pub risk: BuildRisk,
    pub warnings: Vec<String>,
    /// Fraction of a base value that survives derating, per tag group
    pub derating: Vec<(TagGroup, f64)>,
}

pub fn validate_build(skills: &[Skill], config: &EngineConfig) -> BuildReport {
    let counts = tag_counts(skills);
    let risk = classify_build_risk(&config.build_risk, &counts);
    let mut warnings = Vec::new();

    match risk {
        BuildRisk::Toxic => warnings.push(format!(
            "build is toxic: {} crowd-control and {} stealth skills",
            counts.group(TagGroup::CrowdControl),
            counts.group(TagGroup::Stealth)
        )),
        BuildRisk::Camping => warnings.push(format!(
            "build encourages camping: {} defensive skills and no mobility",
            counts.get(SkillTag::Defensive)
        )),
        BuildRisk::Normal => {}
    }

    let ultimates = skills
        .iter()
        .filter(|s| matches!(s.kind, SkillKind::Ultimate { .. }))
        .count();
    if ultimates > 1 {
        warnings.push(format!("build has {ultimates} ultimates"));
    }

    for group in TagGroup::ALL {
        let count = counts.group(group);
        let limit = config.diminishing.group(group).max_stacks;
        if count > limit {
            warnings.push(format!("build has {count} {group:?} skills, above the advised {limit}"));
        }
    }

    let derating = TagGroup::ALL
        .into_iter()
        .map(|group| (group, derate(&config.diminishing, group, 1.0, counts.group(group))))
        .collect();

    for warning in &warnings {
        tracing::warn!(skills = skills.len(), "{warning}");
    }

    BuildReport { risk, warnings, derating }
}

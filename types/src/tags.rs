use serde::{Deserialize, Serialize};

/// Skill classification used for diminishing returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagGroup {
    CrowdControl,
    Stealth,
    Mobility,
}

impl TagGroup {
    pub const ALL: [TagGroup; 3] = [TagGroup::CrowdControl, TagGroup::Stealth, TagGroup::Mobility];
}

/// Tag carried by a skill in a hero build.
///
/// A superset of [`TagGroup`]: build risk classification also looks at
/// defensive skills, which are never derated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillTag {
    CrowdControl,
    Stealth,
    Mobility,
    Defensive,
    Offensive,
    Support,
}

impl SkillTag {
    /// The derating group this tag belongs to, if any
    pub fn group(self) -> Option<TagGroup> {
        match self {
            Self::CrowdControl => Some(TagGroup::CrowdControl),
            Self::Stealth => Some(TagGroup::Stealth),
            Self::Mobility => Some(TagGroup::Mobility),
            Self::Defensive | Self::Offensive | Self::Support => None,
        }
    }
}

impl From<TagGroup> for SkillTag {
    fn from(group: TagGroup) -> Self {
        match group {
            TagGroup::CrowdControl => Self::CrowdControl,
            TagGroup::Stealth => Self::Stealth,
            TagGroup::Mobility => Self::Mobility,
        }
    }
}

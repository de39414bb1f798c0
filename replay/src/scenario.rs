//! Scenario scripts.
//!
//! A scenario is a TOML document with an optional `[config]` table and a
//! list of `[[step]]` tables. Each step names the match time it runs at and
//! exactly one action:
//!
//! ```toml
//! [[step]]
//! at = 0.0
//! apply = { id = "barrier", target = "p1", category = "shield", duration = 5.0, policy = "refresh", params = { damage_reduction = 0.5 } }
//!
//! [[step]]
//! at = 5.1
//! tick = {}
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tempora_core::{
    CombinationPolicy, EngineConfig, Modifier, ModifierCategory, ModifierError, SkillTag, TagGroup,
};

use crate::error::ReplayError;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub config: Option<EngineConfig>,
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

pub fn load_scenario(path: &Path) -> Result<Scenario, ReplayError> {
    let contents = fs::read_to_string(path).map_err(|e| ReplayError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_scenario(&contents, path)
}

pub fn parse_scenario(contents: &str, path: &Path) -> Result<Scenario, ReplayError> {
    toml::from_str(contents).map_err(|e| ReplayError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// One scripted action at a point in match time
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawStep")]
pub struct Step {
    /// Seconds since match start
    pub at: f64,
    pub action: Action,
}

#[derive(Debug, Clone)]
pub enum Action {
    Apply(ApplyArgs),
    Remove { target: String, id: String },
    RemoveAll { target: String },
    Tick,
    Query(QueryArgs),
    Derate(DerateArgs),
    Classify(ClassifyArgs),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApplyArgs {
    pub id: String,
    pub target: String,
    pub category: ModifierCategory,
    /// Seconds
    pub duration: f64,
    #[serde(default)]
    pub policy: CombinationPolicy,
    #[serde(default)]
    pub params: BTreeMap<String, f64>,
    pub max_stacks: Option<u32>,
    pub tag_group: Option<TagGroup>,
}

impl ApplyArgs {
    pub fn build(&self) -> Result<Modifier, ModifierError> {
        let mut builder = Modifier::builder(self.id.as_str(), self.target.as_str(), self.category.clone())
            .duration_secs(self.duration)
            .policy(self.policy)
            .params(self.params.clone());
        if let Some(max_stacks) = self.max_stacks {
            builder = builder.max_stacks(max_stacks);
        }
        if let Some(group) = self.tag_group {
            builder = builder.tag_group(group);
        }
        builder.build()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetArgs {
    pub target: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoveArgs {
    pub target: String,
    pub id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TickArgs {}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueryArgs {
    pub target: String,
    pub category: Option<ModifierCategory>,
}

/// Derate by an explicit stack count, or by the live count on `target`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DerateArgs {
    pub group: TagGroup,
    pub base: f64,
    pub stacks: Option<u32>,
    pub target: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassifyArgs {
    pub tags: Vec<SkillTag>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawStep {
    at: f64,
    apply: Option<ApplyArgs>,
    remove: Option<RemoveArgs>,
    remove_all: Option<TargetArgs>,
    tick: Option<TickArgs>,
    query: Option<QueryArgs>,
    derate: Option<DerateArgs>,
    classify: Option<ClassifyArgs>,
}

impl TryFrom<RawStep> for Step {
    type Error = String;

    fn try_from(raw: RawStep) -> Result<Self, Self::Error> {
        if !raw.at.is_finite() || raw.at < 0.0 {
            return Err(format!("step time {} must be a non-negative number of seconds", raw.at));
        }

        let mut actions = Vec::new();
        if let Some(args) = raw.apply {
            actions.push(Action::Apply(args));
        }
        if let Some(RemoveArgs { target, id }) = raw.remove {
            actions.push(Action::Remove { target, id });
        }
        if let Some(TargetArgs { target }) = raw.remove_all {
            actions.push(Action::RemoveAll { target });
        }
        if raw.tick.is_some() {
            actions.push(Action::Tick);
        }
        if let Some(args) = raw.query {
            actions.push(Action::Query(args));
        }
        if let Some(args) = raw.derate {
            actions.push(Action::Derate(args));
        }
        if let Some(args) = raw.classify {
            actions.push(Action::Classify(args));
        }

        match actions.len() {
            1 => Ok(Self { at: raw.at, action: actions.remove(0) }),
            0 => Err(format!("step at {}s has no action", raw.at)),
            n => Err(format!("step at {}s has {n} actions, expected one", raw.at)),
        }
    }
}

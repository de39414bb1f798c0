//! Scenario execution.
//!
//! Runs steps in order against an engine driven by a [`ManualClock`]. Each
//! step moves the clock to its `at` time, performs its action, and yields a
//! [`StepRecord`] listing the outcome and the capability calls the step
//! caused.

use std::collections::BTreeMap;

use serde::Serialize;
use tempora_core::testing::{CapabilityCall, RecordingCapabilities};
use tempora_core::{
    ApplyResult, BuildRisk, EngineConfig, HandlerRegistry, ManualClock, Modifier, ModifierEngine,
    TagCounts, TickReport, classify_build_risk, derate, secs,
};

use crate::error::ReplayError;
use crate::scenario::{Action, DerateArgs, QueryArgs, Step};

#[derive(Debug, Serialize)]
pub struct StepRecord {
    pub step: usize,
    pub at: f64,
    #[serde(flatten)]
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<CapabilityCall>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Outcome {
    Apply { target: String, id: String, result: ApplyResult },
    Remove { target: String, id: String, removed: bool },
    RemoveAll { target: String, removed: usize },
    Tick(TickReport),
    Query(QueryOutcome),
    Derate { value: f64, stacks: u32 },
    Classify { risk: BuildRisk },
}

#[derive(Debug, Serialize)]
pub struct QueryOutcome {
    pub target: String,
    pub modifiers: Vec<ModifierSummary>,
    pub movement_speed_factor: f64,
    pub outgoing_damage_multiplier: f64,
    pub incoming_damage_factor: f64,
}

#[derive(Debug, Serialize)]
pub struct ModifierSummary {
    pub id: String,
    pub category: String,
    pub stacks: u32,
    pub remaining_secs: f64,
    pub parameters: BTreeMap<String, f64>,
}

impl ModifierSummary {
    fn new(modifier: &Modifier, now: std::time::Duration) -> Self {
        Self {
            id: modifier.id().to_owned(),
            category: modifier.category().to_string(),
            stacks: modifier.current_stacks(),
            remaining_secs: modifier.remaining(now).as_secs_f64(),
            parameters: modifier.parameters().clone(),
        }
    }
}

pub struct Runner {
    engine: ModifierEngine,
    clock: ManualClock,
    capabilities: RecordingCapabilities,
    config: EngineConfig,
    last_at: f64,
}

impl Runner {
    pub fn new(config: EngineConfig) -> Result<Self, ReplayError> {
        let clock = ManualClock::new();
        let capabilities = RecordingCapabilities::new();
        let registry = HandlerRegistry::with_builtins()?;
        let engine = ModifierEngine::new(registry, clock.clone(), capabilities.clone(), config.clone());
        Ok(Self { engine, clock, capabilities, config, last_at: 0.0 })
    }

    pub fn run_step(&mut self, index: usize, step: &Step) -> Result<StepRecord, ReplayError> {
        if step.at < self.last_at {
            return Err(ReplayError::TimeWentBackwards { step: index, at: step.at, previous: self.last_at });
        }
        self.last_at = step.at;
        self.clock.set_secs(step.at);
        self.capabilities.clear_calls();

        let outcome = match &step.action {
            Action::Apply(args) => {
                let modifier = args
                    .build()
                    .map_err(|source| ReplayError::Modifier { step: index, source })?;
                let result = self.engine.apply(modifier);
                Outcome::Apply { target: args.target.clone(), id: args.id.clone(), result }
            }
            Action::Remove { target, id } => Outcome::Remove {
                target: target.clone(),
                id: id.clone(),
                removed: self.engine.remove(target, id),
            },
            Action::RemoveAll { target } => Outcome::RemoveAll {
                target: target.clone(),
                removed: self.engine.remove_all(target),
            },
            Action::Tick => Outcome::Tick(self.engine.tick(secs(step.at))),
            Action::Query(args) => Outcome::Query(self.query(args)),
            Action::Derate(args) => self.derate(index, args)?,
            Action::Classify(args) => {
                let counts: TagCounts = args.tags.iter().copied().collect();
                Outcome::Classify { risk: classify_build_risk(&self.config.build_risk, &counts) }
            }
        };

        tracing::debug!(step = index, at = step.at, "step complete");
        Ok(StepRecord { step: index, at: step.at, outcome, effects: self.capabilities.calls() })
    }

    fn query(&self, args: &QueryArgs) -> QueryOutcome {
        let now = self.engine.now();
        let target = args.target.as_str();
        QueryOutcome {
            target: args.target.clone(),
            modifiers: self
                .engine
                .query(target, args.category.as_ref())
                .into_iter()
                .map(|m| ModifierSummary::new(m, now))
                .collect(),
            movement_speed_factor: self.engine.movement_speed_factor(target),
            outgoing_damage_multiplier: self.engine.outgoing_damage_multiplier(target),
            incoming_damage_factor: self.engine.incoming_damage_factor(target),
        }
    }

    fn derate(&self, index: usize, args: &DerateArgs) -> Result<Outcome, ReplayError> {
        let stacks = match (&args.stacks, &args.target) {
            (Some(stacks), None) => *stacks,
            (None, Some(target)) => self.engine.stack_count(target, args.group),
            _ => {
                return Err(ReplayError::InvalidStep {
                    step: index,
                    reason: "derate needs exactly one of `stacks` or `target`".to_string(),
                });
            }
        };
        let value = derate(&self.config.diminishing, args.group, args.base, stacks);
        Ok(Outcome::Derate { value, stacks })
    }
}

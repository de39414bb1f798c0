//! Shared types for the tempora workspace.
//!
//! Everything here is plain data: the modifier vocabulary (categories and
//! combination policies), skill tag groups, and the tuning tables the engine
//! is composed with. All of it round-trips through serde so it can be loaded
//! from TOML config and scenario files.

mod config;
mod modifier;
mod tags;

pub use config::{
    BuildRiskThresholds, DiminishingConfig, EngineConfig, GroupDerating, MaxPolicyTimer,
    DEFAULT_MAX_REDUCTION, DEFAULT_MAX_STACKS,
};
pub use modifier::{CombinationPolicy, ModifierCategory};
pub use tags::{SkillTag, TagGroup};

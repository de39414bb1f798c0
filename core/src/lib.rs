//! Temporal modifier engine.
//!
//! Tracks timed effects (buffs, crowd control, shields, stealth, ultimates)
//! per target entity, resolves re-application through each modifier's
//! combination policy, and drives apply/tick/remove side effects exactly once
//! per lifecycle transition.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  apply/remove   ┌────────────────────────────────────┐
//! │ Ability code │ ──────────────▶ │ ModifierEngine                     │
//! └──────────────┘                 │  ├─ ModifierStore (live state)     │
//!                                  │  ├─ HandlerRegistry (per category) │
//!        host loop ── tick(now) ─▶ │  ├─ Clock                          │
//!                                  │  └─ EntityCapabilities (game glue) │
//!                                  └────────────────────────────────────┘
//! ```
//!
//! The engine is single-threaded by construction: it holds `Rc` handlers and
//! boxed collaborators, so it is neither `Send` nor `Sync` and every mutation
//! goes through `&mut self` on the simulation thread.

pub mod capabilities;
pub mod clock;
pub mod combat;
pub mod config;
pub mod diminishing;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod modifier;
pub mod skills;
pub mod store;
pub mod testing;

mod tick;


pub use capabilities::{EntityCapabilities, NoopCapabilities};
pub use clock::{Clock, GameTime, ManualClock, MatchClock, secs};
pub use config::{load_config, parse_config};
pub use diminishing::{BuildRisk, TagCounts, classify_build_risk, derate};
pub use engine::ModifierEngine;
pub use error::{ConfigError, ModifierError, RegistryError};
pub use handlers::{
    EmbeddedBehavior, HandlerRegistry, HookContext, ModifierHandler, RemovalReason,
};
pub use modifier::{Behavior, Modifier, ModifierBuilder, Parameters, TargetId, is_expired};
pub use skills::{BuildReport, Skill, SkillKind, tag_counts, validate_build};
pub use store::{ApplyResult, ModifierStore, ModifierView};
pub use tick::TickReport;

pub use tempora_types::{
    CombinationPolicy, EngineConfig, MaxPolicyTimer, ModifierCategory, SkillTag, TagGroup,
};

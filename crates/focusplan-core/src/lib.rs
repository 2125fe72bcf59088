//! # Focusplan Core Library
//!
//! This library provides the task prioritization and day scheduling engine
//! behind Focusplan. Every operation is available through the standalone
//! `focusplan-cli` binary, which is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Scoring**: ten per-task dimensions (decay-based urgency, energy
//!   alignment, dependency weight, batching affinity, ...) folded into a
//!   0-100 composite with a weighted geometric mean
//! - **Analysis**: blocking-graph critical path, Pareto frontier and
//!   k-medoids clustering of similar tasks
//! - **Scheduling**: a day skeleton built from calendar events, filled
//!   greedily with ranked tasks and context-switch awareness
//! - **Preferences**: TOML-backed user preferences with declarative presets
//!
//! The engine is stateless: each call takes a snapshot and an explicit
//! `now`, so identical inputs always produce identical output.
//!
//! ## Key Components
//!
//! - [`rank_tasks`]: ranked, explainable scores
//! - [`generate_day_schedule`]: full pipeline down to time blocks
//! - [`UserPreferences`]: weights, work hours and energy peaks

pub mod budget;
pub mod calendar;
pub mod cluster;
pub mod context_switch;
pub mod decay;
pub mod energy;
pub mod engine;
pub mod error;
pub mod graph;
pub mod pareto;
pub mod preferences;
pub mod scheduler;
pub mod scoring;
pub mod task;
pub mod timeline;

pub use budget::{CancelHandle, ComputeBudget};
pub use calendar::{CalendarEvent, EventCategory};
pub use cluster::{Cluster, Clustering, TaskClusterer};
pub use context_switch::{ContextSwitchScorer, SwitchContext, SwitchFactor};
pub use energy::EnergyCurveModel;
pub use engine::{
    generate_day_schedule, plan, plan_with_budget, rank_tasks, rank_tasks_with_budget, PlanOutput,
    PlanRequest, Ranking,
};
pub use error::{ComputationWarning, ConfigError, GraphError, InputError};
pub use graph::{CriticalPath, DependencyGraph};
pub use preferences::{UserPreferences, WeightPreferences};
pub use scheduler::{DaySchedule, Scheduler};
pub use scoring::{Dimension, DimensionVector, DimensionWeights, ScoreResult};
pub use task::{Task, TaskCategory, TaskIndex};
pub use timeline::{BlockType, Capacity, TimeBlock, TimeBlockGenerator};

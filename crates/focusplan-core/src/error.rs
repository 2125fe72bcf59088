//! Core error types for focusplan-core.
//!
//! Nothing in the planning pipeline is fatal to the caller: graph and input
//! errors are reported so the engine can degrade to a partial result, and
//! [`ComputationWarning`] records every degradation that happened.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while analyzing the blocking graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// The blocking relation contains a cycle; no critical path exists.
    #[error("Blocking cycle detected among tasks: {}", task_ids.join(", "))]
    Cycle { task_ids: Vec<String> },
}

/// Problems with the input snapshot handed to the engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    /// No tasks were supplied. Callers treat this as "empty output".
    #[error("Task set is empty")]
    EmptyTaskSet,

    /// Work day bounds are unparsable or inverted
    #[error("Invalid work hours: {start} - {end}")]
    InvalidWorkHours { start: String, end: String },

    /// UTC offset beyond +/-14 hours
    #[error("Invalid UTC offset: {minutes} minutes")]
    InvalidUtcOffset { minutes: i32 },

    /// Priority outside 1..=3
    #[error("Task '{task_id}' has priority {priority}, expected 1-3")]
    InvalidPriority { task_id: String, priority: u8 },

    /// Energy requirement outside 1..=5
    #[error("Task '{task_id}' has energy requirement {energy}, expected 1-5")]
    InvalidEnergyRequirement { task_id: String, energy: u8 },

    /// Event ends before it starts
    #[error("Event '{event_id}' ends before it starts: {start} > {end}")]
    InvalidTimeRange {
        event_id: String,
        start: chrono::DateTime<chrono::Utc>,
        end: chrono::DateTime<chrono::Utc>,
    },
}

/// Preferences file errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load preferences
    #[error("Failed to load preferences from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save preferences
    #[error("Failed to save preferences to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Key does not exist in the preferences tree
    #[error("Unknown preference key: {0}")]
    UnknownKey(String),

    /// Invalid value for a known key
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown preset name
    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    /// Failed to parse preferences
    #[error("Failed to parse preferences: {0}")]
    ParseFailed(String),
}

/// A degradation that happened during one computation pass.
///
/// Warnings never abort the pipeline; they are attached to the plan output
/// so callers can explain why a boost or affinity is missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComputationWarning {
    /// Fewer tasks than requested medoids; k was reduced to the task count.
    DegenerateCluster { requested: usize, actual: usize },
    /// Critical-path boost skipped because of a blocking cycle.
    DependencyCycle { task_ids: Vec<String> },
    /// The compute budget ran out during a quadratic stage.
    Cancelled { stage: String },
    /// A calendar event ends before it starts and was left out of the day.
    InvalidEvent { event_id: String },
}

impl std::fmt::Display for ComputationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComputationWarning::DegenerateCluster { requested, actual } => write!(
                f,
                "requested {requested} clusters but only {actual} tasks are available"
            ),
            ComputationWarning::DependencyCycle { task_ids } => write!(
                f,
                "blocking cycle among {}; critical-path boost skipped",
                task_ids.join(", ")
            ),
            ComputationWarning::Cancelled { stage } => {
                write!(f, "compute budget exhausted during {stage}")
            }
            ComputationWarning::InvalidEvent { event_id } => {
                write!(f, "event '{event_id}' ends before it starts; ignored")
            }
        }
    }
}

impl From<GraphError> for ComputationWarning {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::Cycle { task_ids } => ComputationWarning::DependencyCycle { task_ids },
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_message_lists_tasks() {
        let err = GraphError::Cycle {
            task_ids: vec!["a".into(), "b".into()],
        };
        assert_eq!(err.to_string(), "Blocking cycle detected among tasks: a, b");
    }

    #[test]
    fn graph_error_converts_to_warning() {
        let warning: ComputationWarning = GraphError::Cycle {
            task_ids: vec!["x".into()],
        }
        .into();
        assert_eq!(
            warning,
            ComputationWarning::DependencyCycle {
                task_ids: vec!["x".into()]
            }
        );
    }

    #[test]
    fn warning_serializes_with_kind_tag() {
        let warning = ComputationWarning::DegenerateCluster {
            requested: 2,
            actual: 1,
        };
        let json = serde_json::to_value(&warning).unwrap();
        assert_eq!(json["kind"], "degenerate_cluster");
        assert_eq!(json["requested"], 2);
    }
}

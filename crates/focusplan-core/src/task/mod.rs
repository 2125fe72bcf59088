//! Task records consumed by the prioritization engine.
//!
//! Tasks are read-only to the engine. Properties such as "blocked" or
//! "subtask" are never stored on the record; they are derived from the
//! task set through a [`TaskIndex`].

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// Category of work a task represents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    Creative,
    Administrative,
    Communication,
    Planning,
    Development,
    Learning,
    Personal,
    #[default]
    Other,
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TaskCategory::Creative => "creative",
            TaskCategory::Administrative => "administrative",
            TaskCategory::Communication => "communication",
            TaskCategory::Planning => "planning",
            TaskCategory::Development => "development",
            TaskCategory::Learning => "learning",
            TaskCategory::Personal => "personal",
            TaskCategory::Other => "other",
        };
        f.write_str(label)
    }
}

fn default_priority() -> u8 {
    2
}

fn default_estimated_minutes() -> u32 {
    30
}

/// A task as handed to the engine by the task store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    /// Opaque identifier
    pub id: String,
    /// Task title
    #[serde(default)]
    pub title: String,
    /// Optional due date
    #[serde(default)]
    pub due: Option<DateTime<Utc>>,
    /// Priority, 1 (highest) to 3 (lowest)
    #[serde(default = "default_priority")]
    pub priority: u8,
    /// Estimated duration in minutes
    #[serde(default = "default_estimated_minutes")]
    pub estimated_minutes: u32,
    /// Required energy level, 1 (trivial) to 5 (peak focus)
    #[serde(default)]
    pub energy_required: Option<u8>,
    /// Where/how the task can be done ("phone", "errand", ...)
    #[serde(default)]
    pub contexts: BTreeSet<String>,
    /// Work category
    #[serde(default)]
    pub category: TaskCategory,
    /// Free-form tags
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Stakeholder the task is done for
    #[serde(default)]
    pub who_for: Option<String>,
    /// Optional project ID
    #[serde(default)]
    pub project_id: Option<String>,
    /// Parent task ID when this is a subtask
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Completion timestamp
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// IDs of tasks that must complete before this one can proceed
    #[serde(default)]
    pub blocked_by: Vec<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Create a task with default attributes.
    pub fn new(id: impl Into<String>, title: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            due: None,
            priority: default_priority(),
            estimated_minutes: default_estimated_minutes(),
            energy_required: None,
            contexts: BTreeSet::new(),
            category: TaskCategory::default(),
            tags: BTreeSet::new(),
            who_for: None,
            project_id: None,
            parent_id: None,
            completed_at: None,
            blocked_by: Vec::new(),
            created_at,
        }
    }

    pub fn with_due(mut self, due: DateTime<Utc>) -> Self {
        self.due = Some(due);
        self
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_estimate(mut self, minutes: u32) -> Self {
        self.estimated_minutes = minutes;
        self
    }

    pub fn with_energy(mut self, energy: u8) -> Self {
        self.energy_required = Some(energy);
        self
    }

    pub fn with_category(mut self, category: TaskCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.contexts.insert(context.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn with_who_for(mut self, who: impl Into<String>) -> Self {
        self.who_for = Some(who.into());
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn blocked_by(mut self, blocker_id: impl Into<String>) -> Self {
        self.blocked_by.push(blocker_id.into());
        self
    }

    pub fn completed(mut self, at: DateTime<Utc>) -> Self {
        self.completed_at = Some(at);
        self
    }

    /// Check value ranges the scorer relies on.
    pub fn validate(&self) -> Result<(), InputError> {
        if !(1..=3).contains(&self.priority) {
            return Err(InputError::InvalidPriority {
                task_id: self.id.clone(),
                priority: self.priority,
            });
        }
        if let Some(energy) = self.energy_required {
            if !(1..=5).contains(&energy) {
                return Err(InputError::InvalidEnergyRequirement {
                    task_id: self.id.clone(),
                    energy,
                });
            }
        }
        Ok(())
    }
}

/// Whether the task has been completed.
pub fn is_completed(task: &Task) -> bool {
    task.completed_at.is_some()
}

/// Whether the task is a deep-focus task: long enough to need a deep-work
/// block, or demanding high energy.
pub fn is_deep_focus(task: &Task, deep_work_min_minutes: u32) -> bool {
    task.estimated_minutes >= deep_work_min_minutes || task.energy_required.unwrap_or(0) >= 4
}

/// Lookup structure over one task snapshot for derived properties.
#[derive(Debug, Clone)]
pub struct TaskIndex<'a> {
    by_id: HashMap<&'a str, &'a Task>,
    children: HashMap<&'a str, usize>,
}

impl<'a> TaskIndex<'a> {
    /// Build an index over the given tasks. Later duplicates of an ID win.
    pub fn new(tasks: &'a [Task]) -> Self {
        let mut by_id = HashMap::with_capacity(tasks.len());
        let mut children: HashMap<&str, usize> = HashMap::new();
        for task in tasks {
            by_id.insert(task.id.as_str(), task);
            if let Some(parent) = task.parent_id.as_deref() {
                *children.entry(parent).or_default() += 1;
            }
        }
        Self { by_id, children }
    }

    pub fn get(&self, id: &str) -> Option<&'a Task> {
        self.by_id.get(id).copied()
    }

    /// A task is blocked when any blocker resolves to an uncompleted task.
    /// Unknown blocker IDs are ignored.
    pub fn is_blocked(&self, task: &Task) -> bool {
        task.blocked_by
            .iter()
            .filter_map(|id| self.get(id))
            .any(|blocker| !is_completed(blocker))
    }

    /// Whether the task's parent exists in the snapshot.
    pub fn is_subtask(&self, task: &Task) -> bool {
        task.parent_id
            .as_deref()
            .is_some_and(|parent| self.by_id.contains_key(parent))
    }

    /// Whether any task in the snapshot names this task as its parent.
    pub fn has_subtasks(&self, task: &Task) -> bool {
        self.children.get(task.id.as_str()).copied().unwrap_or(0) > 0
    }

    /// The most recently completed task, ties broken by input order.
    pub fn most_recently_completed(tasks: &'a [Task]) -> Option<&'a Task> {
        tasks
            .iter()
            .filter(|t| is_completed(t))
            .fold(None, |best: Option<&Task>, t| match best {
                Some(b) if b.completed_at >= t.completed_at => Some(b),
                _ => Some(t),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, hour, 0, 0).unwrap()
    }

    #[test]
    fn blocked_only_by_uncompleted_tasks() {
        let tasks = vec![
            Task::new("a", "Blocker", at(8)),
            Task::new("b", "Waiting", at(8)).blocked_by("a"),
            Task::new("c", "Done blocker", at(8)).completed(at(9)),
            Task::new("d", "Unblocked", at(8)).blocked_by("c"),
            Task::new("e", "Dangling", at(8)).blocked_by("missing"),
        ];
        let index = TaskIndex::new(&tasks);

        assert!(!index.is_blocked(&tasks[0]));
        assert!(index.is_blocked(&tasks[1]));
        assert!(!index.is_blocked(&tasks[3]));
        assert!(!index.is_blocked(&tasks[4]));
    }

    #[test]
    fn subtask_relations_are_derived() {
        let tasks = vec![
            Task::new("parent", "Parent", at(8)),
            Task::new("child", "Child", at(8)).with_parent("parent"),
            Task::new("orphan", "Orphan", at(8)).with_parent("gone"),
        ];
        let index = TaskIndex::new(&tasks);

        assert!(index.has_subtasks(&tasks[0]));
        assert!(!index.has_subtasks(&tasks[1]));
        assert!(index.is_subtask(&tasks[1]));
        assert!(!index.is_subtask(&tasks[2]));
    }

    #[test]
    fn most_recently_completed_prefers_latest() {
        let tasks = vec![
            Task::new("a", "A", at(7)).completed(at(9)),
            Task::new("b", "B", at(7)).completed(at(11)),
            Task::new("c", "C", at(7)),
        ];
        let latest = TaskIndex::most_recently_completed(&tasks).unwrap();
        assert_eq!(latest.id, "b");
        assert!(TaskIndex::most_recently_completed(&tasks[2..]).is_none());
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let task = Task::new("a", "A", at(8)).with_priority(4);
        assert!(matches!(
            task.validate(),
            Err(InputError::InvalidPriority { priority: 4, .. })
        ));

        let task = Task::new("b", "B", at(8)).with_energy(6);
        assert!(task.validate().is_err());

        assert!(Task::new("c", "C", at(8)).with_energy(5).validate().is_ok());
    }

    #[test]
    fn deep_focus_by_length_or_energy() {
        let long = Task::new("a", "A", at(8)).with_estimate(90);
        let intense = Task::new("b", "B", at(8)).with_estimate(20).with_energy(4);
        let light = Task::new("c", "C", at(8)).with_estimate(20).with_energy(2);
        assert!(is_deep_focus(&long, 60));
        assert!(is_deep_focus(&intense, 60));
        assert!(!is_deep_focus(&light, 60));
    }

    #[test]
    fn task_deserializes_with_defaults() {
        let json = r#"{"id":"t1","created_at":"2025-03-10T08:00:00Z"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.priority, 2);
        assert_eq!(task.estimated_minutes, 30);
        assert_eq!(task.category, TaskCategory::Other);
        assert!(task.blocked_by.is_empty());
    }
}

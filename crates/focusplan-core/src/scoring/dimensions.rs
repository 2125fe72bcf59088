//! Per-task dimension scoring.

use chrono::{DateTime, Utc};
use rayon::prelude::*;

use super::DimensionVector;
use crate::cluster::{task_similarity, Clustering};
use crate::decay::{exponential, sigmoid, UrgencyCurve};
use crate::energy::EnergyCurveModel;
use crate::graph::DependencyGraph;
use crate::preferences::UserPreferences;
use crate::task::{is_completed, Task, TaskIndex};

const SECONDS_PER_DAY: f64 = 86_400.0;
const SECONDS_PER_HOUR: f64 = 3_600.0;

const EFFORT_HALF_LIFE_HOURS: f64 = 2.0;
const EFFORT_FLOOR: f64 = 0.05;
const STALENESS_HALF_LIFE_DAYS: f64 = 14.0;
const MOMENTUM_WINDOW_HOURS: f64 = 24.0;
const MOMENTUM_HALF_LIFE_HOURS: f64 = 4.0;
const MOMENTUM_BASE: f64 = 0.2;
const DEPENDENCY_BASE: f64 = 0.2;
const DEPENDENCY_SCALE: f64 = 2.0;
const UNDATED_OPPORTUNITY_COST: f64 = 0.1;
/// Work-day length assumed when the configured hours are unusable.
const FALLBACK_WORKDAY_MINUTES: f64 = 480.0;

fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_seconds() as f64 / SECONDS_PER_DAY
}

/// Computes the ten dimensions for tasks in one snapshot.
///
/// Everything that depends on the snapshot as a whole (dependency graph,
/// clusters, recent completions, energy at `now`) is resolved once when the
/// scorer is built; scoring a task afterwards is a pure function of it.
pub struct DimensionScorer<'a> {
    prefs: &'a UserPreferences,
    now: DateTime<Utc>,
    energy_level: u8,
    index: TaskIndex<'a>,
    graph: &'a DependencyGraph,
    clustering: &'a Clustering,
    anchor_id: Option<&'a str>,
    recent_completions: Vec<&'a Task>,
}

impl<'a> DimensionScorer<'a> {
    pub fn new(
        tasks: &'a [Task],
        prefs: &'a UserPreferences,
        now: DateTime<Utc>,
        graph: &'a DependencyGraph,
        clustering: &'a Clustering,
    ) -> Self {
        let energy_level = EnergyCurveModel::from_preferences(prefs).level_at(now);
        let recent_completions = tasks
            .iter()
            .filter(|t| {
                t.completed_at.is_some_and(|at| {
                    let hours = (now - at).num_seconds() as f64 / SECONDS_PER_HOUR;
                    (0.0..=MOMENTUM_WINDOW_HOURS).contains(&hours)
                })
            })
            .collect();

        Self {
            prefs,
            now,
            energy_level,
            index: TaskIndex::new(tasks),
            graph,
            clustering,
            anchor_id: TaskIndex::most_recently_completed(tasks).map(|t| t.id.as_str()),
            recent_completions,
        }
    }

    /// Energy level (1-5) the scorer evaluates alignment against.
    pub fn energy_level(&self) -> u8 {
        self.energy_level
    }

    /// Score every task, in parallel. Output order matches input order.
    pub fn score_all(&self, tasks: &[&Task]) -> Vec<DimensionVector> {
        tasks.par_iter().map(|task| self.score(task)).collect()
    }

    pub fn score(&self, task: &Task) -> DimensionVector {
        DimensionVector {
            urgency: self.urgency(task),
            importance: self.importance(task),
            effort: self.effort(task),
            context_fit: self.context_fit(task),
            energy_alignment: self.energy_alignment(task),
            momentum: self.momentum(task),
            dependency: self.dependency(task),
            staleness: self.staleness(task),
            opportunity_cost: self.opportunity_cost(task),
            batching_affinity: self.clustering.batching_affinity(&task.id, self.anchor_id),
        }
    }

    fn days_until_due(&self, task: &Task) -> Option<f64> {
        task.due.map(|due| days_between(self.now, due))
    }

    fn age_days(&self, task: &Task) -> f64 {
        days_between(task.created_at, self.now).max(0.0)
    }

    fn urgency(&self, task: &Task) -> f64 {
        UrgencyCurve::select(self.days_until_due(task), self.age_days(task)).urgency()
    }

    fn importance(&self, task: &Task) -> f64 {
        let base = match task.priority {
            0 | 1 => 1.0,
            2 => 0.6,
            _ => 0.3,
        };
        let weights = &self.prefs.weights;
        let stakeholder = if task.who_for.as_deref().is_some_and(|w| !w.trim().is_empty()) {
            0.2 * weights.stakeholder as f64 / 100.0
        } else {
            0.0
        };
        let tagged = self
            .prefs
            .priority_tags
            .iter()
            .any(|tag| task.tags.contains(tag));
        let tag = if tagged {
            0.15 * weights.tag as f64 / 100.0
        } else {
            0.0
        };
        (base + stakeholder + tag).min(1.0)
    }

    fn effort(&self, task: &Task) -> f64 {
        let hours = task.estimated_minutes as f64 / 60.0;
        exponential(hours, EFFORT_HALF_LIFE_HOURS).max(EFFORT_FLOOR)
    }

    fn context_fit(&self, task: &Task) -> f64 {
        if self.prefs.active_contexts.is_empty() {
            return 0.5;
        }
        if task.contexts.is_empty() {
            return 0.7;
        }
        let overlaps = self
            .prefs
            .active_contexts
            .iter()
            .any(|ctx| task.contexts.contains(ctx));
        if overlaps {
            1.0
        } else {
            0.2
        }
    }

    fn energy_alignment(&self, task: &Task) -> f64 {
        match task.energy_required {
            Some(required) => {
                let gap = (required as f64 - self.energy_level as f64).abs();
                (1.0 - gap / 4.0).clamp(0.0, 1.0)
            }
            None => 0.7,
        }
    }

    fn momentum(&self, task: &Task) -> f64 {
        let best = self
            .recent_completions
            .iter()
            .filter(|done| done.id != task.id)
            .filter_map(|done| {
                let at = done.completed_at?;
                let hours = (self.now - at).num_seconds() as f64 / SECONDS_PER_HOUR;
                Some(task_similarity(task, done) * exponential(hours, MOMENTUM_HALF_LIFE_HOURS))
            })
            .fold(0.0, f64::max);
        MOMENTUM_BASE + (1.0 - MOMENTUM_BASE) * best
    }

    fn dependency(&self, task: &Task) -> f64 {
        let waiting = self.graph.downstream_count(&task.id) as f64;
        let score = DEPENDENCY_BASE + (1.0 - DEPENDENCY_BASE) * waiting / (waiting + DEPENDENCY_SCALE);
        if !is_completed(task) && self.index.is_blocked(task) {
            let penalty = self.prefs.weights.blocked_penalty.min(100) as f64 / 100.0;
            score * (1.0 - penalty)
        } else {
            score
        }
    }

    fn staleness(&self, task: &Task) -> f64 {
        1.0 - exponential(self.age_days(task), STALENESS_HALF_LIFE_DAYS)
    }

    fn opportunity_cost(&self, task: &Task) -> f64 {
        let Some(days) = self.days_until_due(task) else {
            return UNDATED_OPPORTUNITY_COST;
        };
        let workday = match self.prefs.workday_minutes() {
            m if m > 0 => m as f64,
            _ => FALLBACK_WORKDAY_MINUTES,
        };
        let slack = days - task.estimated_minutes as f64 / workday;
        sigmoid(slack, 1.0, 1.5)
    }
}

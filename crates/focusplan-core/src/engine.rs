//! Planning entry points.
//!
//! One call consumes an immutable snapshot (tasks, events, preferences and
//! an explicit `now`) and returns ranked scores plus a day plan. Nothing
//! here reads the wall clock or keeps state between calls.
//!
//! Pipeline:
//! 1. Filter eligible tasks (active, and not blocked when the blocked
//!    penalty excludes them)
//! 2. Dependency graph and critical path
//! 3. Clustering for batching affinity
//! 4. Dimension scoring, adaptive weights, Pareto frontier
//! 5. Composite scores and ranking
//! 6. Day skeleton and greedy assignment

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::budget::ComputeBudget;
use crate::calendar::CalendarEvent;
use crate::cluster::{Clustering, TaskClusterer};
use crate::error::ComputationWarning;
use crate::graph::{CriticalPath, DependencyGraph};
use crate::pareto::{self, ParetoPoint};
use crate::preferences::UserPreferences;
use crate::scheduler::Scheduler;
use crate::scoring::{
    apply_adaptive_rules, compare_ranked, DimensionScorer, DimensionWeights, FinalScoreCombiner,
    ScoreResult, WeightContext,
};
use crate::task::{is_completed, Task, TaskIndex};
use crate::timeline::{TimeBlock, TimeBlockGenerator};

/// Input snapshot for one planning pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRequest {
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub events: Vec<CalendarEvent>,
    #[serde(default)]
    pub preferences: UserPreferences,
    pub now: DateTime<Utc>,
    pub target_date: NaiveDate,
}

/// Result of one planning pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanOutput {
    /// One per eligible task, best first
    pub scores: Vec<ScoreResult>,
    /// Chronological, non-overlapping day plan
    pub schedule: Vec<TimeBlock>,
    /// Eligible tasks that did not fit into the day
    #[serde(default)]
    pub unscheduled: Vec<String>,
    #[serde(default)]
    pub critical_path: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<ComputationWarning>,
}

/// Scores plus everything learned while computing them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ranking {
    pub scores: Vec<ScoreResult>,
    pub critical_path: Vec<String>,
    /// Weights after adaptive rules
    pub weights: Option<DimensionWeights>,
    pub warnings: Vec<ComputationWarning>,
}

/// Rank tasks without building a schedule.
pub fn rank_tasks(tasks: &[Task], prefs: &UserPreferences, now: DateTime<Utc>) -> Vec<ScoreResult> {
    rank_tasks_with_budget(tasks, prefs, now, &ComputeBudget::unlimited()).scores
}

/// Full pipeline for one day, returning just the blocks.
pub fn generate_day_schedule(
    tasks: &[Task],
    events: &[CalendarEvent],
    prefs: &UserPreferences,
    now: DateTime<Utc>,
    date: NaiveDate,
) -> Vec<TimeBlock> {
    let request = PlanRequest {
        tasks: tasks.to_vec(),
        events: events.to_vec(),
        preferences: prefs.clone(),
        now,
        target_date: date,
    };
    plan(&request).schedule
}

pub fn plan(request: &PlanRequest) -> PlanOutput {
    plan_with_budget(request, &ComputeBudget::unlimited())
}

/// Full pipeline under a compute budget. Exhausting the budget degrades
/// the quadratic stages and records a warning; it never fails the plan.
pub fn plan_with_budget(request: &PlanRequest, budget: &ComputeBudget) -> PlanOutput {
    let prefs = &request.preferences;
    if let Err(err) = prefs.validate() {
        warn!(error = %err, "invalid preferences, schedule will be empty");
    }

    let mut ranking = rank_tasks_with_budget(&request.tasks, prefs, request.now, budget);

    let mut events = Vec::with_capacity(request.events.len());
    for event in &request.events {
        match event.validate() {
            Ok(()) => events.push(event.clone()),
            Err(err) => {
                warn!(error = %err, "skipping invalid event");
                ranking.warnings.push(ComputationWarning::InvalidEvent {
                    event_id: event.id.clone(),
                });
            }
        }
    }

    let skeleton = TimeBlockGenerator::new(prefs).generate(&events, request.target_date);
    let day = Scheduler::new(prefs).assign(&skeleton, &ranking.scores, &request.tasks);

    info!(
        date = %request.target_date,
        ranked = ranking.scores.len(),
        blocks = day.blocks.len(),
        unscheduled = day.unscheduled.len(),
        warnings = ranking.warnings.len(),
        "planned day"
    );

    PlanOutput {
        scores: ranking.scores,
        schedule: day.blocks,
        unscheduled: day.unscheduled,
        critical_path: ranking.critical_path,
        warnings: ranking.warnings,
    }
}

/// Rank tasks under a compute budget.
pub fn rank_tasks_with_budget(
    tasks: &[Task],
    prefs: &UserPreferences,
    now: DateTime<Utc>,
    budget: &ComputeBudget,
) -> Ranking {
    for task in tasks {
        if let Err(err) = task.validate() {
            warn!(error = %err, "task failed validation, scoring anyway");
        }
    }

    let index = TaskIndex::new(tasks);
    let excludes_blocked = prefs.excludes_blocked();
    let eligible: Vec<(usize, &Task)> = tasks
        .iter()
        .enumerate()
        .filter(|(_, t)| !is_completed(t))
        .filter(|(_, t)| !(excludes_blocked && index.is_blocked(t)))
        .collect();

    if eligible.is_empty() {
        debug!("no eligible tasks, nothing to rank");
        return Ranking::default();
    }

    let mut warnings = Vec::new();

    let graph = DependencyGraph::build(tasks);
    let critical_path = match graph.critical_path() {
        Ok(path) => path,
        Err(err) => {
            warnings.push(ComputationWarning::from(err));
            CriticalPath::default()
        }
    };

    let clustering = cluster(tasks, &eligible, budget, &mut warnings);

    let eligible_tasks: Vec<&Task> = eligible.iter().map(|(_, t)| *t).collect();
    let scorer = DimensionScorer::new(tasks, prefs, now, &graph, &clustering);
    let dimensions = scorer.score_all(&eligible_tasks);

    let base = DimensionWeights::from_preferences(prefs);
    let weights = apply_adaptive_rules(&base, &WeightContext::observe(tasks, prefs, now));

    let entries: Vec<(&str, ParetoPoint)> = eligible_tasks
        .iter()
        .zip(dimensions.iter())
        .map(|(task, dims)| (task.id.as_str(), ParetoPoint::from(dims)))
        .collect();
    let frontier: HashSet<&str> = match pareto::frontier_ids(&entries, budget) {
        Ok(ids) => ids,
        Err(_) => {
            warnings.push(ComputationWarning::Cancelled {
                stage: "pareto".to_string(),
            });
            HashSet::new()
        }
    };

    let combiner = FinalScoreCombiner::default();
    let mut scores: Vec<ScoreResult> = eligible
        .iter()
        .zip(dimensions)
        .map(|(&(input_order, task), dims)| {
            let on_critical_path = critical_path.contains(&task.id);
            let is_pareto_optimal = frontier.contains(task.id.as_str());
            ScoreResult {
                task_id: task.id.clone(),
                final_score: combiner.combine(&dims, &weights, on_critical_path, is_pareto_optimal),
                dimensions: dims,
                on_critical_path,
                is_pareto_optimal,
                cluster_id: clustering.cluster_id(&task.id),
                due: task.due,
                input_order,
            }
        })
        .collect();

    if weights.total() > 0.0 {
        scores.sort_by(compare_ranked);
    } else {
        warn!("all dimension weights are zero, keeping input order");
    }

    debug!(
        ranked = scores.len(),
        critical_path = critical_path.len(),
        pareto = frontier.len(),
        "ranked tasks"
    );

    Ranking {
        scores,
        critical_path: critical_path.task_ids,
        weights: Some(weights),
        warnings,
    }
}

/// Cluster the eligible tasks plus the most recently completed one.
fn cluster(
    tasks: &[Task],
    eligible: &[(usize, &Task)],
    budget: &ComputeBudget,
    warnings: &mut Vec<ComputationWarning>,
) -> Clustering {
    let mut population: Vec<&Task> = eligible.iter().map(|(_, t)| *t).collect();
    if let Some(anchor) = TaskIndex::most_recently_completed(tasks) {
        population.push(anchor);
    }

    match TaskClusterer::new().cluster(&population, budget) {
        Ok(mut clustering) => {
            if let Some(warning) = clustering.warning.take() {
                warnings.push(warning);
            }
            clustering
        }
        Err(_) => {
            warn!(tasks = population.len(), "budget exhausted during clustering");
            warnings.push(ComputationWarning::Cancelled {
                stage: "clustering".to_string(),
            });
            Clustering::singletons(&population)
        }
    }
}

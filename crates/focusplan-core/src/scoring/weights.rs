//! Base dimension weights and the adaptive rule table.
//!
//! Weights start from the user's 0-100 sliders and are then scaled by a
//! fixed set of context rules. Every matching rule multiplies its
//! adjustments in, so rules compound and their order never matters.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Dimension;
use crate::energy::EnergyCurveModel;
use crate::preferences::{parse_hhmm, UserPreferences};
use crate::task::{is_completed, Task};

/// Hour at which the deep-work window closes.
const DEEP_WORK_WINDOW_END_HOUR: u32 = 12;
/// Hour from which the day counts as winding down.
const END_OF_DAY_HOUR: u32 = 16;

/// One weight per dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionWeights {
    pub urgency: f64,
    pub importance: f64,
    pub effort: f64,
    pub context_fit: f64,
    pub energy_alignment: f64,
    pub momentum: f64,
    pub dependency: f64,
    pub staleness: f64,
    pub opportunity_cost: f64,
    pub batching_affinity: f64,
}

impl DimensionWeights {
    /// All weights set to `value`.
    pub fn uniform(value: f64) -> Self {
        Self {
            urgency: value,
            importance: value,
            effort: value,
            context_fit: value,
            energy_alignment: value,
            momentum: value,
            dependency: value,
            staleness: value,
            opportunity_cost: value,
            batching_affinity: value,
        }
    }

    /// Base weights from the user's sliders.
    pub fn from_preferences(prefs: &UserPreferences) -> Self {
        let w = &prefs.weights;
        Self {
            urgency: w.urgency as f64,
            importance: w.importance as f64,
            effort: w.effort as f64,
            context_fit: w.context as f64,
            energy_alignment: w.energy as f64,
            momentum: w.momentum as f64,
            dependency: w.dependency as f64,
            staleness: w.staleness as f64,
            opportunity_cost: w.opportunity_cost as f64,
            batching_affinity: w.similar_work as f64,
        }
    }

    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Urgency => self.urgency,
            Dimension::Importance => self.importance,
            Dimension::Effort => self.effort,
            Dimension::ContextFit => self.context_fit,
            Dimension::EnergyAlignment => self.energy_alignment,
            Dimension::Momentum => self.momentum,
            Dimension::Dependency => self.dependency,
            Dimension::Staleness => self.staleness,
            Dimension::OpportunityCost => self.opportunity_cost,
            Dimension::BatchingAffinity => self.batching_affinity,
        }
    }

    fn slot(&mut self, dimension: Dimension) -> &mut f64 {
        match dimension {
            Dimension::Urgency => &mut self.urgency,
            Dimension::Importance => &mut self.importance,
            Dimension::Effort => &mut self.effort,
            Dimension::ContextFit => &mut self.context_fit,
            Dimension::EnergyAlignment => &mut self.energy_alignment,
            Dimension::Momentum => &mut self.momentum,
            Dimension::Dependency => &mut self.dependency,
            Dimension::Staleness => &mut self.staleness,
            Dimension::OpportunityCost => &mut self.opportunity_cost,
            Dimension::BatchingAffinity => &mut self.batching_affinity,
        }
    }

    /// Copy with one weight multiplied by `factor`.
    pub fn scaled(mut self, dimension: Dimension, factor: f64) -> Self {
        *self.slot(dimension) *= factor;
        self
    }

    pub fn total(&self) -> f64 {
        Dimension::ALL.iter().map(|&d| self.get(d)).sum()
    }
}

impl Default for DimensionWeights {
    fn default() -> Self {
        Self::from_preferences(&UserPreferences::default())
    }
}

/// Aggregate signals the rule table reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightContext {
    /// Active tasks due within the urgent window, overdue ones included
    pub urgent_task_count: usize,
    /// Modeled energy at `now`, 1-5
    pub energy_level: u8,
    /// Number of active tasks
    pub backlog_size: usize,
    pub is_deep_work_window: bool,
    pub is_end_of_day: bool,
}

impl WeightContext {
    /// Derive the signals from a task snapshot.
    pub fn observe(tasks: &[Task], prefs: &UserPreferences, now: DateTime<Utc>) -> Self {
        let window_secs = prefs.urgent_window_days as i64 * 86_400;
        let active = tasks.iter().filter(|t| !is_completed(t));
        let (backlog_size, urgent_task_count) = active.fold((0, 0), |(backlog, urgent), task| {
            let is_urgent = task
                .due
                .is_some_and(|due| (due - now).num_seconds() <= window_secs);
            (backlog + 1, urgent + usize::from(is_urgent))
        });

        let hour = prefs.local_hour(now);
        let work_start_hour = parse_hhmm(&prefs.work_start).map_or(0, |t| t.hour());

        Self {
            urgent_task_count,
            energy_level: EnergyCurveModel::from_preferences(prefs).level_at(now),
            backlog_size,
            is_deep_work_window: hour >= work_start_hour && hour < DEEP_WORK_WINDOW_END_HOUR,
            is_end_of_day: hour >= END_OF_DAY_HOUR,
        }
    }
}

/// One row of the rule table: when `applies` holds, each listed dimension
/// weight is multiplied by its factor.
#[derive(Debug, Clone, Copy)]
pub struct AdaptiveRule {
    pub name: &'static str,
    pub applies: fn(&WeightContext) -> bool,
    pub adjustments: &'static [(Dimension, f64)],
}

pub const ADAPTIVE_RULES: &[AdaptiveRule] = &[
    AdaptiveRule {
        name: "many_urgent_tasks",
        applies: |ctx| ctx.urgent_task_count >= 3,
        adjustments: &[
            (Dimension::Urgency, 1.5),
            (Dimension::Effort, 1.3),
            (Dimension::BatchingAffinity, 0.7),
        ],
    },
    AdaptiveRule {
        name: "low_energy",
        applies: |ctx| ctx.energy_level <= 2,
        adjustments: &[(Dimension::EnergyAlignment, 1.5), (Dimension::Effort, 1.2)],
    },
    AdaptiveRule {
        name: "large_backlog",
        applies: |ctx| ctx.backlog_size > 50,
        adjustments: &[
            (Dimension::Importance, 1.2),
            (Dimension::Urgency, 1.1),
            (Dimension::Staleness, 0.8),
        ],
    },
    AdaptiveRule {
        name: "deep_work_window",
        applies: |ctx| ctx.is_deep_work_window,
        adjustments: &[
            (Dimension::Importance, 1.3),
            (Dimension::Effort, 0.8),
            (Dimension::Momentum, 1.2),
        ],
    },
    AdaptiveRule {
        name: "end_of_day",
        applies: |ctx| ctx.is_end_of_day,
        adjustments: &[(Dimension::Effort, 1.4), (Dimension::Urgency, 1.2)],
    },
];

/// Names of the rules matching `ctx`, in table order.
pub fn matching_rules(ctx: &WeightContext) -> Vec<&'static str> {
    ADAPTIVE_RULES
        .iter()
        .filter(|rule| (rule.applies)(ctx))
        .map(|rule| rule.name)
        .collect()
}

/// Apply every matching rule to `base` and return the adjusted weights.
pub fn apply_adaptive_rules(base: &DimensionWeights, ctx: &WeightContext) -> DimensionWeights {
    let adjusted = ADAPTIVE_RULES
        .iter()
        .filter(|rule| (rule.applies)(ctx))
        .flat_map(|rule| rule.adjustments.iter())
        .fold(*base, |weights, &(dimension, factor)| weights.scaled(dimension, factor));
    debug!(rules = ?matching_rules(ctx), "applied adaptive weight rules");
    adjusted
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn calm() -> WeightContext {
        WeightContext {
            urgent_task_count: 0,
            energy_level: 4,
            backlog_size: 10,
            is_deep_work_window: false,
            is_end_of_day: false,
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn no_rules_keep_base_weights() {
        let base = DimensionWeights::default();
        assert_eq!(apply_adaptive_rules(&base, &calm()), base);
        assert!(matching_rules(&calm()).is_empty());
    }

    #[test]
    fn time_of_day_signals_use_local_hours() {
        let prefs = UserPreferences {
            utc_offset_minutes: -300,
            ..UserPreferences::default()
        };
        // 16:00Z is 11:00 at UTC-5
        let morning = WeightContext::observe(&[], &prefs, Utc.with_ymd_and_hms(2025, 3, 10, 16, 0, 0).unwrap());
        assert!(morning.is_deep_work_window);
        assert!(!morning.is_end_of_day);

        let evening = WeightContext::observe(&[], &prefs, Utc.with_ymd_and_hms(2025, 3, 10, 21, 30, 0).unwrap());
        assert!(!evening.is_deep_work_window);
        assert!(evening.is_end_of_day);
    }

    #[test]
    fn default_weights_follow_sliders() {
        let base = DimensionWeights::default();
        assert_eq!(base.urgency, 70.0);
        assert_eq!(base.energy_alignment, 50.0);
        assert_eq!(base.batching_affinity, 50.0);
    }

    #[test]
    fn urgent_rule_scales_three_dimensions() {
        let base = DimensionWeights::uniform(10.0);
        let ctx = WeightContext {
            urgent_task_count: 3,
            ..calm()
        };
        let adjusted = apply_adaptive_rules(&base, &ctx);
        assert!(close(adjusted.urgency, 15.0));
        assert!(close(adjusted.effort, 13.0));
        assert!(close(adjusted.batching_affinity, 7.0));
        assert!(close(adjusted.importance, 10.0));
    }

    #[test]
    fn rules_compound() {
        let base = DimensionWeights::uniform(1.0);
        let ctx = WeightContext {
            urgent_task_count: 5,
            energy_level: 1,
            backlog_size: 80,
            is_deep_work_window: true,
            is_end_of_day: true,
        };
        let adjusted = apply_adaptive_rules(&base, &ctx);
        assert!(close(adjusted.urgency, 1.5 * 1.1 * 1.2));
        assert!(close(adjusted.effort, 1.3 * 1.2 * 0.8 * 1.4));
        assert!(close(adjusted.importance, 1.2 * 1.3));
        assert_eq!(matching_rules(&ctx).len(), 5);
    }

    #[test]
    fn observe_counts_urgent_and_backlog() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 9, 30, 0).unwrap();
        let created = now - chrono::Duration::days(3);
        let tasks = vec![
            Task::new("overdue", "o", created).with_due(now - chrono::Duration::days(1)),
            Task::new("tomorrow", "t", created).with_due(now + chrono::Duration::days(1)),
            Task::new("later", "l", created).with_due(now + chrono::Duration::days(9)),
            Task::new("done", "d", created)
                .with_due(now)
                .completed(now),
        ];
        let ctx = WeightContext::observe(&tasks, &UserPreferences::default(), now);
        assert_eq!(ctx.urgent_task_count, 2);
        assert_eq!(ctx.backlog_size, 3);
        assert!(ctx.is_deep_work_window);
        assert!(!ctx.is_end_of_day);
    }

    #[test]
    fn late_afternoon_is_end_of_day() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 16, 15, 0).unwrap();
        let ctx = WeightContext::observe(&[], &UserPreferences::default(), now);
        assert!(ctx.is_end_of_day);
        assert!(!ctx.is_deep_work_window);
    }
}

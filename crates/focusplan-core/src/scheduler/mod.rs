//! Greedy day scheduler.
//!
//! Walks the skeleton's `available` blocks in chronological order. For each
//! one it repeatedly picks the unassigned task maximizing
//!
//! ```text
//! final_score + context_switch_score (+ deep_work / 10 for a deep-focus
//! task in a deep-work-viable span)
//! ```
//!
//! among tasks whose estimate fits the remaining span. A chosen task becomes
//! a work block at the front of the span; the rest stays available and is
//! filled the same way while it is at least the minimum usable block.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calendar::EventCategory;
use crate::context_switch::{ContextSwitchScorer, SwitchContext};
use crate::preferences::UserPreferences;
use crate::scoring::{compare_ranked, ScoreResult};
use crate::task::{is_deep_focus, Task, TaskCategory, TaskIndex};
use crate::timeline::{BlockType, Capacity, TimeBlock, TimeBlockGenerator};

/// Final plan for one day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DaySchedule {
    /// Chronological, non-overlapping blocks
    pub blocks: Vec<TimeBlock>,
    /// Ranked tasks that did not fit anywhere, in rank order
    pub unscheduled: Vec<String>,
}

impl DaySchedule {
    pub fn scheduled_task_ids(&self) -> impl Iterator<Item = &str> {
        self.blocks
            .iter()
            .flat_map(|b| b.task_ids.iter().map(String::as_str))
    }
}

struct Candidate<'a> {
    result: &'a ScoreResult,
    task: &'a Task,
    assigned: bool,
}

/// Assigns ranked tasks into a day skeleton.
pub struct Scheduler<'a> {
    prefs: &'a UserPreferences,
    generator: TimeBlockGenerator<'a>,
    switch: ContextSwitchScorer,
}

impl<'a> Scheduler<'a> {
    pub fn new(prefs: &'a UserPreferences) -> Self {
        Self {
            prefs,
            generator: TimeBlockGenerator::new(prefs),
            switch: ContextSwitchScorer::new(prefs.deep_work_min_minutes),
        }
    }

    /// Work block kind for a task.
    pub fn block_type_for(&self, task: &Task) -> BlockType {
        if task.category == TaskCategory::Administrative {
            BlockType::Admin
        } else if is_deep_focus(task, self.prefs.deep_work_min_minutes) {
            BlockType::DeepWork
        } else {
            BlockType::ShallowWork
        }
    }

    /// Fill `skeleton` with the `ranked` tasks.
    ///
    /// Ranked results whose task is missing from `tasks` are ignored, as are
    /// blocked tasks when the blocked penalty excludes them.
    pub fn assign(&self, skeleton: &[TimeBlock], ranked: &[ScoreResult], tasks: &[Task]) -> DaySchedule {
        let index = TaskIndex::new(tasks);
        let excludes_blocked = self.prefs.excludes_blocked();
        let mut candidates: Vec<Candidate<'_>> = ranked
            .iter()
            .filter_map(|result| {
                let task = index.get(&result.task_id)?;
                if excludes_blocked && index.is_blocked(task) {
                    return None;
                }
                Some(Candidate {
                    result,
                    task,
                    assigned: false,
                })
            })
            .collect();

        let mut blocks = Vec::with_capacity(skeleton.len() + candidates.len());
        let mut previous: Option<&Task> = None;

        for (i, block) in skeleton.iter().enumerate() {
            if !block.is_available() {
                blocks.push(block.clone());
                continue;
            }

            let mut span = block.clone();

            loop {
                let remaining = span.duration_minutes();
                let meeting = adjacent_meeting(skeleton, i, &span);
                let Some(chosen) = self.pick(&candidates, &span, previous, meeting, remaining) else {
                    blocks.push(span);
                    break;
                };

                let candidate = &mut candidates[chosen];
                candidate.assigned = true;
                let task = candidate.task;
                let end = span.start + Duration::minutes(task_minutes(task));
                blocks.push(
                    TimeBlock::new(self.block_type_for(task), span.start, end)
                        .with_task(task.id.clone()),
                );
                previous = Some(task);

                if end >= span.end {
                    break;
                }
                let residual = self.generator.available_block(end, span.end);
                if residual.duration_minutes() < self.prefs.min_block_minutes as i64 {
                    blocks.push(residual);
                    break;
                }
                span = residual;
            }
        }

        let unscheduled: Vec<String> = candidates
            .iter()
            .filter(|c| !c.assigned)
            .map(|c| c.task.id.clone())
            .collect();
        debug!(
            blocks = blocks.len(),
            unscheduled = unscheduled.len(),
            "assigned tasks to day"
        );

        DaySchedule { blocks, unscheduled }
    }

    fn pick(
        &self,
        candidates: &[Candidate<'_>],
        span: &TimeBlock,
        previous: Option<&Task>,
        adjacent_meeting: Option<EventCategory>,
        remaining: i64,
    ) -> Option<usize> {
        let ctx = SwitchContext {
            previous,
            adjacent_meeting,
            block_energy_level: span.energy_level,
        };
        let deep_viable = span.capacity == Some(Capacity::DeepWorkViable);
        let deep_bonus = self.prefs.weights.deep_work as f64 / 10.0;

        candidates
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.assigned && task_minutes(c.task) <= remaining)
            .map(|(i, c)| {
                let mut objective = c.result.final_score + self.switch.score(c.task, &ctx) as f64;
                if deep_viable && is_deep_focus(c.task, self.prefs.deep_work_min_minutes) {
                    objective += deep_bonus;
                }
                (i, objective)
            })
            .max_by(|(a, oa), (b, ob)| {
                oa.total_cmp(ob)
                    .then_with(|| compare_ranked(candidates[*b].result, candidates[*a].result))
            })
            .map(|(i, _)| i)
    }
}

fn task_minutes(task: &Task) -> i64 {
    task.estimated_minutes.max(1) as i64
}

/// Category of the event-derived block touching `span`, a piece of
/// `skeleton[i]`, preferring the one ending where the span starts.
///
/// Once the front of the block is filled, only the neighbour after it can
/// still touch the span.
fn adjacent_meeting(skeleton: &[TimeBlock], i: usize, span: &TimeBlock) -> Option<EventCategory> {
    let before = i
        .checked_sub(1)
        .and_then(|j| skeleton.get(j))
        .filter(|b| b.end == span.start && b.block_type.is_meeting_related())
        .and_then(|b| b.source_category);
    before.or_else(|| {
        skeleton
            .get(i + 1)
            .filter(|b| b.start == span.end && b.block_type.is_meeting_related())
            .and_then(|b| b.source_category)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::CalendarEvent;
    use crate::scoring::DimensionVector;
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, hour, minute, 0).unwrap()
    }

    fn task(id: &str, minutes: u32) -> Task {
        Task::new(id, id, at(8, 0)).with_estimate(minutes)
    }

    fn ranked(ids_scores: &[(&str, f64)]) -> Vec<ScoreResult> {
        ids_scores
            .iter()
            .enumerate()
            .map(|(order, (id, score))| ScoreResult {
                task_id: id.to_string(),
                dimensions: DimensionVector::default(),
                final_score: *score,
                on_critical_path: false,
                is_pareto_optimal: false,
                cluster_id: None,
                due: None,
                input_order: order,
            })
            .collect()
    }

    fn work_blocks(schedule: &DaySchedule) -> Vec<(&str, DateTime<Utc>, DateTime<Utc>)> {
        schedule
            .blocks
            .iter()
            .filter(|b| b.block_type.is_work())
            .map(|b| (b.task_ids[0].as_str(), b.start, b.end))
            .collect()
    }

    #[test]
    fn fills_day_in_rank_order() {
        let prefs = UserPreferences::default();
        let skeleton = TimeBlockGenerator::new(&prefs).generate(&[], date());
        let tasks = vec![task("b", 30), task("a", 30)];
        let schedule = Scheduler::new(&prefs).assign(&skeleton, &ranked(&[("a", 80.0), ("b", 60.0)]), &tasks);

        assert_eq!(
            work_blocks(&schedule),
            vec![("a", at(9, 0), at(9, 30)), ("b", at(9, 30), at(10, 0))]
        );
        let last = schedule.blocks.last().unwrap();
        assert!(last.is_available());
        assert_eq!((last.start, last.end), (at(10, 0), at(17, 0)));
        assert!(schedule.unscheduled.is_empty());
    }

    #[test]
    fn tasks_too_long_for_any_block_stay_unscheduled() {
        let prefs = UserPreferences::default();
        let skeleton = TimeBlockGenerator::new(&prefs).generate(&[], date());
        let tasks = vec![task("huge", 600)];
        let schedule = Scheduler::new(&prefs).assign(&skeleton, &ranked(&[("huge", 90.0)]), &tasks);
        assert_eq!(schedule.unscheduled, vec!["huge"]);
        assert_eq!(schedule.blocks, skeleton);
    }

    #[test]
    fn short_leftover_stays_available() {
        let mut prefs = UserPreferences::default();
        prefs.work_end = "09:40".into();
        let skeleton = TimeBlockGenerator::new(&prefs).generate(&[], date());
        let tasks = vec![task("a", 30)];
        let schedule = Scheduler::new(&prefs).assign(&skeleton, &ranked(&[("a", 50.0)]), &tasks);

        assert_eq!(schedule.blocks.len(), 2);
        assert_eq!(schedule.blocks[1].block_type, BlockType::Available);
        assert_eq!(schedule.blocks[1].duration_minutes(), 10);
    }

    #[test]
    fn meetings_are_kept_and_work_avoids_them() {
        let prefs = UserPreferences::default();
        let events = [CalendarEvent::new(
            "m",
            "Client sync",
            at(10, 0),
            at(11, 0),
            EventCategory::ClientMeeting,
        )];
        let skeleton = TimeBlockGenerator::new(&prefs).generate(&events, date());
        let tasks = vec![task("a", 45), task("b", 60)];
        let schedule =
            Scheduler::new(&prefs).assign(&skeleton, &ranked(&[("a", 70.0), ("b", 65.0)]), &tasks);

        for pair in schedule.blocks.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
        assert!(schedule
            .blocks
            .iter()
            .any(|b| b.block_type == BlockType::Meeting));
        assert_eq!(work_blocks(&schedule)[0], ("a", at(9, 0), at(9, 45)));
    }

    #[test]
    fn related_meeting_pulls_task_forward() {
        let prefs = UserPreferences::default();
        let events = [CalendarEvent::new(
            "m",
            "Client sync",
            at(9, 0),
            at(9, 30),
            EventCategory::ClientMeeting,
        )];
        let skeleton = TimeBlockGenerator::new(&prefs).generate(&events, date());
        let tasks = vec![
            task("code", 30).with_category(TaskCategory::Development),
            task("reply", 30).with_category(TaskCategory::Communication),
        ];
        let schedule = Scheduler::new(&prefs).assign(
            &skeleton,
            &ranked(&[("code", 60.0), ("reply", 55.0)]),
            &tasks,
        );
        // +8 for following the client meeting outweighs the 5 point gap
        assert_eq!(work_blocks(&schedule)[0].0, "reply");
    }

    #[test]
    fn meeting_bonus_ends_once_the_span_moves_away() {
        let prefs = UserPreferences::default();
        let events = [CalendarEvent::new(
            "m",
            "Client sync",
            at(9, 0),
            at(9, 30),
            EventCategory::ClientMeeting,
        )];
        let skeleton = TimeBlockGenerator::new(&prefs).generate(&events, date());
        let tasks = vec![
            task("code", 30).with_category(TaskCategory::Development),
            task("reply", 30).with_category(TaskCategory::Communication),
            task("plan", 30).with_category(TaskCategory::Planning),
        ];
        let schedule = Scheduler::new(&prefs).assign(
            &skeleton,
            &ranked(&[("code", 60.0), ("reply", 55.0), ("plan", 55.0)]),
            &tasks,
        );
        assert_eq!(
            work_blocks(&schedule),
            vec![
                ("reply", at(9, 40), at(10, 10)),
                ("code", at(10, 10), at(10, 40)),
                ("plan", at(10, 40), at(11, 10)),
            ]
        );
    }

    #[test]
    fn residual_span_sees_only_the_following_meeting() {
        let prefs = UserPreferences::default();
        let events = [
            CalendarEvent::new("a", "Standup", at(9, 0), at(9, 30), EventCategory::ClientMeeting),
            CalendarEvent::new("b", "Review", at(11, 0), at(12, 0), EventCategory::OneOnOne),
        ];
        let skeleton = TimeBlockGenerator::new(&prefs).generate(&events, date());
        let i = skeleton
            .iter()
            .position(|b| b.is_available() && b.start == at(9, 40))
            .unwrap();
        assert_eq!(
            adjacent_meeting(&skeleton, i, &skeleton[i]),
            Some(EventCategory::ClientMeeting)
        );

        let residual = TimeBlockGenerator::new(&prefs).available_block(at(10, 10), skeleton[i].end);
        assert_eq!(
            adjacent_meeting(&skeleton, i, &residual),
            Some(EventCategory::OneOnOne)
        );
    }

    #[test]
    fn blocked_tasks_are_excluded_at_full_penalty() {
        let prefs = UserPreferences::default();
        let skeleton = TimeBlockGenerator::new(&prefs).generate(&[], date());
        let tasks = vec![task("blocker", 30), task("waiting", 30).blocked_by("blocker")];
        let schedule = Scheduler::new(&prefs).assign(
            &skeleton,
            &ranked(&[("waiting", 90.0), ("blocker", 40.0)]),
            &tasks,
        );
        assert_eq!(schedule.scheduled_task_ids().collect::<Vec<_>>(), vec!["blocker"]);
        assert!(schedule.unscheduled.is_empty());
    }

    #[test]
    fn work_block_kinds() {
        let prefs = UserPreferences::default();
        let scheduler = Scheduler::new(&prefs);
        assert_eq!(
            scheduler.block_type_for(&task("a", 20).with_category(TaskCategory::Administrative)),
            BlockType::Admin
        );
        assert_eq!(scheduler.block_type_for(&task("d", 90)), BlockType::DeepWork);
        assert_eq!(scheduler.block_type_for(&task("s", 20)), BlockType::ShallowWork);
    }
}

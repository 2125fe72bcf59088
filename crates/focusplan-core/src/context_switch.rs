//! Context-switch compatibility scoring for schedule assembly.
//!
//! Scores how smoothly a candidate task follows what came before it: the
//! previously scheduled task, the meeting next to the block, and the
//! block's modeled energy. Positive is a smooth transition, negative a
//! costly one. The score is a pure function of its inputs.

use serde::{Deserialize, Serialize};

use crate::calendar::EventCategory;
use crate::task::{is_deep_focus, Task, TaskCategory};

/// Energy gap (levels) beyond which a task and block are mismatched.
const ENERGY_MISMATCH_LEVELS: i32 = 2;

/// One rule that fired for a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchFactor {
    SameCategory,
    SharedContext,
    RelatedMeeting,
    DeepAfterShallow,
    CreativeToAdministrative,
    EnergyMismatch,
}

impl SwitchFactor {
    /// Score delta for this factor.
    pub fn delta(&self) -> i32 {
        match self {
            Self::SameCategory => 10,
            Self::SharedContext => 5,
            Self::RelatedMeeting => 8,
            Self::DeepAfterShallow => -5,
            Self::CreativeToAdministrative => -3,
            Self::EnergyMismatch => -4,
        }
    }
}

/// What a candidate task would follow.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwitchContext<'a> {
    /// Task scheduled immediately before, if any
    pub previous: Option<&'a Task>,
    /// Category of the meeting adjacent to the block
    pub adjacent_meeting: Option<EventCategory>,
    /// Modeled energy level (1-5) of the block
    pub block_energy_level: Option<u8>,
}

/// Scores candidate transitions.
#[derive(Debug, Clone, Copy)]
pub struct ContextSwitchScorer {
    deep_work_min_minutes: u32,
}

impl ContextSwitchScorer {
    pub fn new(deep_work_min_minutes: u32) -> Self {
        Self {
            deep_work_min_minutes,
        }
    }

    /// Factors that apply to placing `candidate` in `ctx`.
    pub fn factors(&self, candidate: &Task, ctx: &SwitchContext<'_>) -> Vec<SwitchFactor> {
        let mut factors = Vec::new();

        if let Some(previous) = ctx.previous {
            if previous.category == candidate.category {
                factors.push(SwitchFactor::SameCategory);
            }
            if previous.contexts.intersection(&candidate.contexts).next().is_some() {
                factors.push(SwitchFactor::SharedContext);
            }
        }

        if ctx
            .adjacent_meeting
            .is_some_and(|meeting| meeting.relates_to(candidate.category))
        {
            factors.push(SwitchFactor::RelatedMeeting);
        }

        if let Some(previous) = ctx.previous {
            if is_deep_focus(candidate, self.deep_work_min_minutes)
                && !is_deep_focus(previous, self.deep_work_min_minutes)
            {
                factors.push(SwitchFactor::DeepAfterShallow);
            }
            if previous.category == TaskCategory::Creative
                && candidate.category == TaskCategory::Administrative
            {
                factors.push(SwitchFactor::CreativeToAdministrative);
            }
        }

        if let (Some(required), Some(level)) = (candidate.energy_required, ctx.block_energy_level) {
            if (required as i32 - level as i32).abs() > ENERGY_MISMATCH_LEVELS {
                factors.push(SwitchFactor::EnergyMismatch);
            }
        }

        factors
    }

    /// Sum of the factor deltas.
    pub fn score(&self, candidate: &Task, ctx: &SwitchContext<'_>) -> i32 {
        self.factors(candidate, ctx).iter().map(SwitchFactor::delta).sum()
    }
}

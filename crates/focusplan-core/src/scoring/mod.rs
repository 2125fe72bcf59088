//! Multi-dimensional task scoring.
//!
//! Every eligible task gets a [`DimensionVector`] of ten independent scores.
//! The vector is folded into a single 0-100 composite with a weighted
//! geometric mean, where the weights come from user sliders adjusted by the
//! current context:
//!
//! | Dimension         | Range   | Slider           |
//! |-------------------|---------|------------------|
//! | urgency           | 0..=1.5 | urgency          |
//! | importance        | 0..=1   | importance       |
//! | effort            | 0..=1   | effort           |
//! | context fit       | 0..=1   | context          |
//! | energy alignment  | 0..=1   | energy           |
//! | momentum          | 0..=1   | momentum         |
//! | dependency        | 0..=1   | dependency       |
//! | staleness         | 0..=1   | staleness        |
//! | opportunity cost  | 0..=1   | opportunity_cost |
//! | batching affinity | 0..=1   | similar_work     |

mod combiner;
mod dimensions;
mod weights;

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use combiner::{FinalScoreCombiner, CRITICAL_PATH_BOOST, PARETO_BOOST, SCORE_FLOOR};
pub use dimensions::DimensionScorer;
pub use weights::{
    apply_adaptive_rules, matching_rules, AdaptiveRule, DimensionWeights, WeightContext,
    ADAPTIVE_RULES,
};

/// One scoring axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Urgency,
    Importance,
    Effort,
    ContextFit,
    EnergyAlignment,
    Momentum,
    Dependency,
    Staleness,
    OpportunityCost,
    BatchingAffinity,
}

impl Dimension {
    pub const ALL: [Dimension; 10] = [
        Dimension::Urgency,
        Dimension::Importance,
        Dimension::Effort,
        Dimension::ContextFit,
        Dimension::EnergyAlignment,
        Dimension::Momentum,
        Dimension::Dependency,
        Dimension::Staleness,
        Dimension::OpportunityCost,
        Dimension::BatchingAffinity,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Dimension::Urgency => "urgency",
            Dimension::Importance => "importance",
            Dimension::Effort => "effort",
            Dimension::ContextFit => "context_fit",
            Dimension::EnergyAlignment => "energy_alignment",
            Dimension::Momentum => "momentum",
            Dimension::Dependency => "dependency",
            Dimension::Staleness => "staleness",
            Dimension::OpportunityCost => "opportunity_cost",
            Dimension::BatchingAffinity => "batching_affinity",
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Ten per-task scores. Urgency may exceed 1 for overdue tasks; every other
/// dimension is in [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DimensionVector {
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

impl DimensionVector {
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

    /// Dimensions paired with their values, in [`Dimension::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Dimension, f64)> + '_ {
        Dimension::ALL.iter().map(move |&d| (d, self.get(d)))
    }
}

/// Scored task, the unit of ranking output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub task_id: String,
    pub dimensions: DimensionVector,
    /// Composite score in [0, 100]
    pub final_score: f64,
    pub on_critical_path: bool,
    pub is_pareto_optimal: bool,
    /// Cluster the task was assigned to, if clustering ran
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<usize>,
    #[serde(skip)]
    pub(crate) due: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub(crate) input_order: usize,
}

impl ScoreResult {
    /// The dimension contributing most to the score, weighted by `weights`.
    pub fn top_dimension(&self, weights: &DimensionWeights) -> Option<Dimension> {
        self.dimensions
            .iter()
            .map(|(d, value)| (d, weights.get(d) * value.max(SCORE_FLOOR).ln()))
            .filter(|(d, _)| weights.get(*d) > 0.0)
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(d, _)| d)
    }
}

/// Ranking order: higher score first, then earlier due date (undated last),
/// then input order.
pub fn compare_ranked(a: &ScoreResult, b: &ScoreResult) -> Ordering {
    b.final_score
        .total_cmp(&a.final_score)
        .then_with(|| match (a.due, b.due) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.input_order.cmp(&b.input_order))
}

//! Weighted geometric mean over the dimension vector.
//!
//! ```text
//! log_score   = Σ w_i · ln(max(0.001, d_i))
//! final_score = exp(log_score / Σ w_i) · 100
//! ```
//!
//! A near-zero dimension drags the composite down hard but never to zero.
//! Critical-path and Pareto membership then multiply the result before it
//! is clamped to [0, 100].

use super::{Dimension, DimensionVector, DimensionWeights};

/// Lower bound applied to each dimension before taking its log.
pub const SCORE_FLOOR: f64 = 0.001;
pub const CRITICAL_PATH_BOOST: f64 = 1.20;
pub const PARETO_BOOST: f64 = 1.15;

const MAX_SCORE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinalScoreCombiner {
    pub critical_path_boost: f64,
    pub pareto_boost: f64,
}

impl Default for FinalScoreCombiner {
    fn default() -> Self {
        Self {
            critical_path_boost: CRITICAL_PATH_BOOST,
            pareto_boost: PARETO_BOOST,
        }
    }
}

impl FinalScoreCombiner {
    /// Weighted geometric mean scaled to 100, before boosts and clamping.
    /// `None` when the weights sum to zero.
    pub fn base_score(&self, dims: &DimensionVector, weights: &DimensionWeights) -> Option<f64> {
        let total = weights.total();
        if total <= 0.0 || !total.is_finite() {
            return None;
        }
        let log_score: f64 = Dimension::ALL
            .iter()
            .map(|&d| weights.get(d) * dims.get(d).max(SCORE_FLOOR).ln())
            .sum();
        Some((log_score / total).exp() * MAX_SCORE)
    }

    /// Final composite in [0, 100]. Zero total weight scores 0.
    pub fn combine(
        &self,
        dims: &DimensionVector,
        weights: &DimensionWeights,
        on_critical_path: bool,
        is_pareto_optimal: bool,
    ) -> f64 {
        let Some(mut score) = self.base_score(dims, weights) else {
            return 0.0;
        };
        if on_critical_path {
            score *= self.critical_path_boost;
        }
        if is_pareto_optimal {
            score *= self.pareto_boost;
        }
        if score.is_nan() {
            return 0.0;
        }
        score.clamp(0.0, MAX_SCORE)
    }
}

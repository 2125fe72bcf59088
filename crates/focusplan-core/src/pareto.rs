//! Pareto dominance over the five core scoring dimensions.
//!
//! The frontier is computed by pairwise comparison, O(n²) in the number of
//! tasks. That is fine for lists in the low thousands; for larger inputs the
//! scan polls a [`ComputeBudget`] per row and gives up early.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::budget::{ComputeBudget, Exhausted};
use crate::scoring::DimensionVector;

/// The dimension subset dominance is evaluated over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParetoPoint {
    pub urgency: f64,
    pub importance: f64,
    pub effort: f64,
    pub context_fit: f64,
    pub energy_alignment: f64,
}

impl ParetoPoint {
    fn values(&self) -> [f64; 5] {
        [
            self.urgency,
            self.importance,
            self.effort,
            self.context_fit,
            self.energy_alignment,
        ]
    }
}

impl From<&DimensionVector> for ParetoPoint {
    fn from(dims: &DimensionVector) -> Self {
        Self {
            urgency: dims.urgency,
            importance: dims.importance,
            effort: dims.effort,
            context_fit: dims.context_fit,
            energy_alignment: dims.energy_alignment,
        }
    }
}

/// `a` dominates `b` when it is at least as good everywhere and strictly
/// better somewhere. Irreflexive and asymmetric.
pub fn dominates(a: &ParetoPoint, b: &ParetoPoint) -> bool {
    let mut strictly_better = false;
    for (x, y) in a.values().iter().zip(b.values().iter()) {
        if x < y {
            return false;
        }
        if x > y {
            strictly_better = true;
        }
    }
    strictly_better
}

/// Indices of points not dominated by any other point, in input order.
pub fn frontier(points: &[ParetoPoint], budget: &ComputeBudget) -> Result<Vec<usize>, Exhausted> {
    let mut result = Vec::new();
    for (i, candidate) in points.iter().enumerate() {
        budget.check()?;
        let dominated = points
            .iter()
            .enumerate()
            .any(|(j, other)| j != i && dominates(other, candidate));
        if !dominated {
            result.push(i);
        }
    }
    Ok(result)
}

/// Pareto frontier as a set of task IDs.
pub fn frontier_ids<'a>(
    entries: &[(&'a str, ParetoPoint)],
    budget: &ComputeBudget,
) -> Result<HashSet<&'a str>, Exhausted> {
    let points: Vec<ParetoPoint> = entries.iter().map(|(_, p)| *p).collect();
    match frontier(&points, budget) {
        Ok(indices) => {
            debug!(size = indices.len(), of = points.len(), "computed pareto frontier");
            Ok(indices.into_iter().map(|i| entries[i].0).collect())
        }
        Err(Exhausted) => {
            warn!(tasks = points.len(), "budget exhausted during pareto analysis");
            Err(Exhausted)
        }
    }
}

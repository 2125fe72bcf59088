//! Pairwise task similarity.
//!
//! Similarity is a fixed weighted average of
//! Jaccard(contexts) 0.35, Jaccard(tags) 0.35, same category 0.15 and
//! same project 0.15. The weights sum to 1, so similarity is in [0, 1].

use std::collections::BTreeSet;

use rayon::prelude::*;

use crate::budget::{ComputeBudget, Exhausted};
use crate::task::Task;

pub const CONTEXT_WEIGHT: f64 = 0.35;
pub const TAG_WEIGHT: f64 = 0.35;
pub const CATEGORY_WEIGHT: f64 = 0.15;
pub const PROJECT_WEIGHT: f64 = 0.15;

/// Jaccard coefficient. Two empty sets share no evidence and score 0.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Similarity between two tasks in [0, 1].
pub fn task_similarity(a: &Task, b: &Task) -> f64 {
    let same_category = if a.category == b.category { 1.0 } else { 0.0 };
    let same_project = match (&a.project_id, &b.project_id) {
        (Some(x), Some(y)) if x == y => 1.0,
        _ => 0.0,
    };
    CONTEXT_WEIGHT * jaccard(&a.contexts, &b.contexts)
        + TAG_WEIGHT * jaccard(&a.tags, &b.tags)
        + CATEGORY_WEIGHT * same_category
        + PROJECT_WEIGHT * same_project
}

/// Dense symmetric similarity matrix with a unit diagonal.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    size: usize,
    values: Vec<f64>,
}

impl SimilarityMatrix {
    /// Build the matrix, one row per task. Rows are computed in parallel and
    /// the budget is polled once per row.
    pub fn build(tasks: &[&Task], budget: &ComputeBudget) -> Result<Self, Exhausted> {
        let size = tasks.len();
        let rows: Vec<Vec<f64>> = (0..size)
            .into_par_iter()
            .map(|i| -> Result<Vec<f64>, Exhausted> {
                budget.check()?;
                Ok((0..size)
                    .map(|j| if i == j { 1.0 } else { task_similarity(tasks[i], tasks[j]) })
                    .collect())
            })
            .collect::<Result<_, Exhausted>>()?;

        Ok(Self {
            size,
            values: rows.into_iter().flatten().collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn similarity(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.size + j]
    }

    pub fn distance(&self, i: usize, j: usize) -> f64 {
        1.0 - self.similarity(i, j)
    }

    /// Sum of similarities from `i` to every other task.
    pub fn centrality(&self, i: usize) -> f64 {
        (0..self.size)
            .filter(|&j| j != i)
            .map(|j| self.similarity(i, j))
            .sum()
    }
}

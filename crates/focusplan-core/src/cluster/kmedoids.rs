//! k-medoids (PAM) clustering for batching affinity.
//!
//! One greedy pass: maximin medoid initialization followed by
//! nearest-medoid assignment. There is no iterative medoid swap phase; a
//! single pass is stable, deterministic and good enough to spot batches.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::similarity::SimilarityMatrix;
use crate::budget::{ComputeBudget, Exhausted};
use crate::error::ComputationWarning;
use crate::task::Task;

/// A group of similar tasks around a medoid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: usize,
    pub medoid: String,
    pub members: Vec<String>,
    /// Average pairwise similarity among members (0 for singletons)
    pub cohesion: f64,
}

/// Result of one clustering pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clustering {
    pub clusters: Vec<Cluster>,
    assignment: HashMap<String, usize>,
    pub warning: Option<ComputationWarning>,
}

impl Clustering {
    pub fn cluster_id(&self, task_id: &str) -> Option<usize> {
        self.assignment.get(task_id).copied()
    }

    pub fn cluster_of(&self, task_id: &str) -> Option<&Cluster> {
        self.cluster_id(task_id).and_then(|id| self.clusters.get(id))
    }

    /// Cohesion of the anchor's cluster when `task_id` shares it, else 0.
    pub fn batching_affinity(&self, task_id: &str, anchor_id: Option<&str>) -> f64 {
        let Some(anchor) = anchor_id else {
            return 0.0;
        };
        if task_id == anchor {
            return 0.0;
        }
        match (self.cluster_id(task_id), self.cluster_id(anchor)) {
            (Some(a), Some(b)) if a == b => self.clusters[a].cohesion,
            _ => 0.0,
        }
    }

    /// Every task in its own cluster.
    pub fn singletons(tasks: &[&Task]) -> Self {
        let clusters: Vec<Cluster> = tasks
            .iter()
            .enumerate()
            .map(|(id, task)| Cluster {
                id,
                medoid: task.id.clone(),
                members: vec![task.id.clone()],
                cohesion: 0.0,
            })
            .collect();
        let assignment = clusters.iter().map(|c| (c.medoid.clone(), c.id)).collect();
        Self {
            clusters,
            assignment,
            warning: None,
        }
    }
}

/// Desired medoid count for a backlog of `n` tasks: `max(2, floor(sqrt(n / 2)))`.
pub fn desired_k(n: usize) -> usize {
    ((n as f64 / 2.0).sqrt().floor() as usize).max(2)
}

/// Greedy PAM clusterer.
#[derive(Debug, Clone, Default)]
pub struct TaskClusterer {
    k: Option<usize>,
}

impl TaskClusterer {
    /// Clusterer choosing k from the backlog size
    pub fn new() -> Self {
        Self::default()
    }

    /// Clusterer with a fixed medoid count
    pub fn with_k(k: usize) -> Self {
        Self { k: Some(k.max(1)) }
    }

    /// Cluster the tasks. Fewer tasks than medoids yields singleton clusters
    /// and a [`ComputationWarning::DegenerateCluster`].
    pub fn cluster(&self, tasks: &[&Task], budget: &ComputeBudget) -> Result<Clustering, Exhausted> {
        let n = tasks.len();
        if n == 0 {
            return Ok(Clustering::default());
        }

        let k = self.k.unwrap_or_else(|| desired_k(n));
        if n < k {
            warn!(requested = k, actual = n, "fewer tasks than medoids, using singletons");
            let mut clustering = Clustering::singletons(tasks);
            clustering.warning = Some(ComputationWarning::DegenerateCluster {
                requested: k,
                actual: n,
            });
            return Ok(clustering);
        }

        let matrix = SimilarityMatrix::build(tasks, budget)?;
        let medoids = select_medoids(&matrix, k);
        let labels = assign(&matrix, &medoids);

        let clusters: Vec<Cluster> = medoids
            .iter()
            .enumerate()
            .map(|(cluster_id, &medoid)| {
                let member_idx: Vec<usize> = (0..n).filter(|&i| labels[i] == cluster_id).collect();
                Cluster {
                    id: cluster_id,
                    medoid: tasks[medoid].id.clone(),
                    members: member_idx.iter().map(|&i| tasks[i].id.clone()).collect(),
                    cohesion: cohesion(&matrix, &member_idx),
                }
            })
            .collect();

        let assignment = tasks
            .iter()
            .zip(labels.iter())
            .map(|(task, &label)| (task.id.clone(), label))
            .collect();

        debug!(k, tasks = n, "clustered tasks");
        Ok(Clustering {
            clusters,
            assignment,
            warning: None,
        })
    }
}

/// Maximin selection: start from the most central task, then repeatedly add
/// the task farthest from its nearest chosen medoid. Ties go to the lower index.
fn select_medoids(matrix: &SimilarityMatrix, k: usize) -> Vec<usize> {
    let n = matrix.len();
    let mut medoids = Vec::with_capacity(k);

    let first = (0..n)
        .max_by(|&a, &b| {
            matrix
                .centrality(a)
                .total_cmp(&matrix.centrality(b))
                .then(b.cmp(&a))
        })
        .unwrap_or(0);
    medoids.push(first);

    while medoids.len() < k {
        let next = (0..n)
            .filter(|i| !medoids.contains(i))
            .map(|i| {
                let nearest = medoids
                    .iter()
                    .map(|&m| matrix.distance(i, m))
                    .fold(f64::INFINITY, f64::min);
                (i, nearest)
            })
            .max_by(|(a, da), (b, db)| da.total_cmp(db).then(b.cmp(a)));
        match next {
            Some((i, _)) => medoids.push(i),
            None => break,
        }
    }

    medoids
}

/// Label each task with the index of its most similar medoid. Medoids
/// always label themselves.
fn assign(matrix: &SimilarityMatrix, medoids: &[usize]) -> Vec<usize> {
    (0..matrix.len())
        .map(|i| {
            if let Some(own) = medoids.iter().position(|&m| m == i) {
                return own;
            }
            medoids
                .iter()
                .enumerate()
                .max_by(|(ca, &ma), (cb, &mb)| {
                    matrix
                        .similarity(i, ma)
                        .total_cmp(&matrix.similarity(i, mb))
                        .then(cb.cmp(ca))
                })
                .map(|(cluster, _)| cluster)
                .unwrap_or(0)
        })
        .collect()
}

fn cohesion(matrix: &SimilarityMatrix, members: &[usize]) -> f64 {
    if members.len() < 2 {
        return 0.0;
    }
    let mut total = 0.0;
    let mut pairs = 0usize;
    for (pos, &i) in members.iter().enumerate() {
        for &j in &members[pos + 1..] {
            total += matrix.similarity(i, j);
            pairs += 1;
        }
    }
    total / pairs as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskCategory;
    use chrono::{TimeZone, Utc};

    fn task(id: &str) -> Task {
        Task::new(id, id, Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap())
    }

    fn phone(id: &str) -> Task {
        task(id)
            .with_context("phone")
            .with_tag("calls")
            .with_category(TaskCategory::Communication)
    }

    fn code(id: &str) -> Task {
        task(id)
            .with_context("computer")
            .with_tag("backend")
            .with_category(TaskCategory::Development)
    }

    #[test]
    fn desired_k_grows_with_backlog() {
        assert_eq!(desired_k(0), 2);
        assert_eq!(desired_k(8), 2);
        assert_eq!(desired_k(18), 3);
        assert_eq!(desired_k(200), 10);
    }

    #[test]
    fn fewer_tasks_than_medoids_gives_singletons() {
        let tasks = [task("only")];
        let refs: Vec<&Task> = tasks.iter().collect();
        let clustering = TaskClusterer::new()
            .cluster(&refs, &ComputeBudget::unlimited())
            .unwrap();

        assert_eq!(clustering.clusters.len(), 1);
        assert_eq!(clustering.clusters[0].cohesion, 0.0);
        assert_eq!(
            clustering.warning,
            Some(ComputationWarning::DegenerateCluster {
                requested: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn separates_obvious_groups() {
        let tasks = [phone("p1"), code("c1"), phone("p2"), code("c2"), phone("p3")];
        let refs: Vec<&Task> = tasks.iter().collect();
        let clustering = TaskClusterer::with_k(2)
            .cluster(&refs, &ComputeBudget::unlimited())
            .unwrap();

        assert_eq!(clustering.clusters.len(), 2);
        assert_eq!(clustering.cluster_id("p1"), clustering.cluster_id("p2"));
        assert_eq!(clustering.cluster_id("p1"), clustering.cluster_id("p3"));
        assert_eq!(clustering.cluster_id("c1"), clustering.cluster_id("c2"));
        assert_ne!(clustering.cluster_id("p1"), clustering.cluster_id("c1"));

        let phone_cluster = clustering.cluster_of("p1").unwrap();
        assert!((phone_cluster.cohesion - 1.0).abs() < 1e-9);
    }

    #[test]
    fn batching_affinity_follows_anchor_cluster() {
        let tasks = [phone("p1"), code("c1"), phone("p2"), code("c2")];
        let refs: Vec<&Task> = tasks.iter().collect();
        let clustering = TaskClusterer::with_k(2)
            .cluster(&refs, &ComputeBudget::unlimited())
            .unwrap();

        assert!(clustering.batching_affinity("p2", Some("p1")) > 0.9);
        assert_eq!(clustering.batching_affinity("c1", Some("p1")), 0.0);
        assert_eq!(clustering.batching_affinity("p2", None), 0.0);
        assert_eq!(clustering.batching_affinity("p1", Some("p1")), 0.0);
    }

    #[test]
    fn clustering_is_deterministic() {
        let tasks = [phone("p1"), code("c1"), task("x"), phone("p2"), code("c2"), task("y")];
        let refs: Vec<&Task> = tasks.iter().collect();
        let clusterer = TaskClusterer::with_k(3);
        let first = clusterer.cluster(&refs, &ComputeBudget::unlimited()).unwrap();
        let second = clusterer.cluster(&refs, &ComputeBudget::unlimited()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn every_task_is_assigned_once() {
        let tasks = [phone("p1"), code("c1"), task("x"), phone("p2"), code("c2")];
        let refs: Vec<&Task> = tasks.iter().collect();
        let clustering = TaskClusterer::with_k(3)
            .cluster(&refs, &ComputeBudget::unlimited())
            .unwrap();
        let total: usize = clustering.clusters.iter().map(|c| c.members.len()).sum();
        assert_eq!(total, tasks.len());
        assert!(clustering.clusters.iter().all(|c| c.members.contains(&c.medoid)));
    }
}

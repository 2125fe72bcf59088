//! Blocking-relation graph and critical-path analysis.
//!
//! An edge `A -> B` means "A blocks B". Only uncompleted tasks are nodes;
//! blockers that are unknown or already completed contribute no edge.
//! Node order follows input order, which makes every traversal here
//! deterministic.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::GraphError;
use crate::task::{is_completed, Task};

/// Directed blocking graph over the active tasks.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: Vec<String>,
    index: HashMap<String, usize>,
    successors: Vec<Vec<usize>>,
    predecessors: Vec<Vec<usize>>,
}

/// The longest chain of blocking tasks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CriticalPath {
    /// Task IDs from the first blocker to the last blocked task
    pub task_ids: Vec<String>,
    /// Longest chain (in tasks) ending at each node
    pub longest_path: HashMap<String, usize>,
}

impl CriticalPath {
    pub fn contains(&self, task_id: &str) -> bool {
        self.task_ids.iter().any(|id| id == task_id)
    }

    /// Number of tasks on the path.
    pub fn len(&self) -> usize {
        self.task_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.task_ids.is_empty()
    }
}

impl DependencyGraph {
    /// Build the graph from a task snapshot.
    pub fn build(tasks: &[Task]) -> Self {
        let mut graph = Self::default();
        for task in tasks.iter().filter(|t| !is_completed(t)) {
            if graph.index.contains_key(&task.id) {
                continue;
            }
            graph.index.insert(task.id.clone(), graph.nodes.len());
            graph.nodes.push(task.id.clone());
        }
        graph.successors = vec![Vec::new(); graph.nodes.len()];
        graph.predecessors = vec![Vec::new(); graph.nodes.len()];

        for task in tasks.iter().filter(|t| !is_completed(t)) {
            let Some(&to) = graph.index.get(&task.id) else {
                continue;
            };
            for blocker in &task.blocked_by {
                let Some(&from) = graph.index.get(blocker) else {
                    continue;
                };
                if !graph.successors[from].contains(&to) {
                    graph.successors[from].push(to);
                    graph.predecessors[to].push(from);
                }
            }
        }

        debug!(
            nodes = graph.nodes.len(),
            edges = graph.edge_count(),
            "built dependency graph"
        );
        graph
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.successors.iter().map(Vec::len).sum()
    }

    pub fn contains(&self, task_id: &str) -> bool {
        self.index.contains_key(task_id)
    }

    /// Topological order via Kahn's algorithm.
    ///
    /// Returns [`GraphError::Cycle`] naming every node that could not be
    /// ordered (cycle members and everything downstream of them).
    pub fn topological_order(&self) -> Result<Vec<usize>, GraphError> {
        let mut in_degree: Vec<usize> = self.predecessors.iter().map(Vec::len).collect();
        let mut queue: VecDeque<usize> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, &deg)| deg == 0)
            .map(|(node, _)| node)
            .collect();

        let mut sorted = Vec::with_capacity(self.nodes.len());
        while let Some(node) = queue.pop_front() {
            sorted.push(node);
            for &next in &self.successors[node] {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    queue.push_back(next);
                }
            }
        }

        if sorted.len() != self.nodes.len() {
            let task_ids: Vec<String> = in_degree
                .iter()
                .enumerate()
                .filter(|(_, &deg)| deg > 0)
                .map(|(node, _)| self.nodes[node].clone())
                .collect();
            warn!(tasks = ?task_ids, "blocking cycle detected");
            return Err(GraphError::Cycle { task_ids });
        }

        Ok(sorted)
    }

    /// Longest blocking chain. Chain length counts tasks, so a lone task has
    /// length 1; a path is only reported when it spans at least two tasks.
    pub fn critical_path(&self) -> Result<CriticalPath, GraphError> {
        let order = self.topological_order()?;

        let mut longest = vec![1usize; self.nodes.len()];
        let mut via: Vec<Option<usize>> = vec![None; self.nodes.len()];
        for &node in &order {
            let best_pred = self.predecessors[node]
                .iter()
                .copied()
                .max_by(|&a, &b| longest[a].cmp(&longest[b]).then(b.cmp(&a)));
            if let Some(pred) = best_pred {
                longest[node] = longest[pred] + 1;
                via[node] = Some(pred);
            }
        }

        let longest_path = self
            .nodes
            .iter()
            .cloned()
            .zip(longest.iter().copied())
            .collect();

        let end = (0..self.nodes.len()).max_by(|&a, &b| longest[a].cmp(&longest[b]).then(b.cmp(&a)));
        let mut task_ids = Vec::new();
        if let Some(end) = end.filter(|&end| longest[end] >= 2) {
            let mut cursor = Some(end);
            while let Some(node) = cursor {
                task_ids.push(self.nodes[node].clone());
                cursor = via[node];
            }
            task_ids.reverse();
        }

        debug!(length = task_ids.len(), "computed critical path");
        Ok(CriticalPath {
            task_ids,
            longest_path,
        })
    }

    /// Number of tasks transitively waiting on `task_id`. Safe on cyclic
    /// graphs; the task itself is never counted.
    pub fn downstream_count(&self, task_id: &str) -> usize {
        let Some(&start) = self.index.get(task_id) else {
            return 0;
        };
        let mut visited = vec![false; self.nodes.len()];
        visited[start] = true;
        let mut queue = VecDeque::from([start]);
        let mut count = 0;
        while let Some(node) = queue.pop_front() {
            for &next in &self.successors[node] {
                if !visited[next] {
                    visited[next] = true;
                    count += 1;
                    queue.push_back(next);
                }
            }
        }
        count
    }
}

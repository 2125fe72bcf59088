//! Task clustering for batching similar work.

mod kmedoids;
mod similarity;

pub use kmedoids::{desired_k, Cluster, Clustering, TaskClusterer};
pub use similarity::{jaccard, task_similarity, SimilarityMatrix};

//! Cooperative cancellation for the quadratic stages.
//!
//! Similarity-matrix construction and Pareto dominance are O(n²). Both poll
//! a [`ComputeBudget`] once per row and degrade to an empty/neutral result
//! when it is exhausted. An unlimited budget never changes results.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Marker returned when the budget is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exhausted;

/// Deadline plus shared cancel flag.
#[derive(Debug, Clone, Default)]
pub struct ComputeBudget {
    deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

impl ComputeBudget {
    /// A budget that never runs out unless cancelled.
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// A budget that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now().checked_add(timeout),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle that cancels this budget (and its clones) from elsewhere.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            cancelled: Arc::clone(&self.cancelled),
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// `Err(Exhausted)` once cancelled or past the deadline.
    pub fn check(&self) -> Result<(), Exhausted> {
        if self.is_exhausted() {
            Err(Exhausted)
        } else {
            Ok(())
        }
    }
}

/// Cancels the budget it was taken from.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlimited_never_expires() {
        let budget = ComputeBudget::unlimited();
        assert!(budget.check().is_ok());
    }

    #[test]
    fn cancel_propagates_to_clones() {
        let budget = ComputeBudget::unlimited();
        let clone = budget.clone();
        budget.cancel_handle().cancel();
        assert_eq!(clone.check(), Err(Exhausted));
    }

    #[test]
    fn zero_timeout_is_exhausted() {
        let budget = ComputeBudget::with_timeout(Duration::ZERO);
        assert!(budget.is_exhausted());
    }
}

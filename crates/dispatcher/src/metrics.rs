//! Coordinator metrics for observability

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// In-flight accounting for one run
#[derive(Debug, Default)]
pub struct CoordinatorMetrics {
    /// Dispatches currently holding a permit
    in_flight: AtomicUsize,
    /// Highest in-flight count observed
    peak_in_flight: AtomicUsize,
    /// Dispatches scheduled so far
    scheduled: AtomicU64,
    /// Dispatches finished (outcome or abort)
    completed: AtomicU64,
}

impl CoordinatorMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark one dispatch as started; the returned guard marks it finished on drop
    pub fn enter(self: &Arc<Self>) -> InFlightGuard {
        self.scheduled.fetch_add(1, Ordering::Relaxed);
        let now = self.in_flight.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::AcqRel);
        observability::record_in_flight(now);

        InFlightGuard {
            metrics: Arc::clone(self),
        }
    }

    /// Get current in-flight count
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Get peak in-flight count
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::Acquire)
    }

    pub fn scheduled(&self) -> u64 {
        self.scheduled.load(Ordering::Relaxed)
    }

    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            in_flight: self.in_flight(),
            peak_in_flight: self.peak_in_flight(),
            scheduled: self.scheduled(),
            completed: self.completed(),
        }
    }
}

/// Held by a dispatch task for as long as it is in flight
#[derive(Debug)]
pub struct InFlightGuard {
    metrics: Arc<CoordinatorMetrics>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let now = self.metrics.in_flight.fetch_sub(1, Ordering::AcqRel) - 1;
        self.metrics.completed.fetch_add(1, Ordering::Relaxed);
        observability::record_in_flight(now);
    }
}

/// Snapshot of coordinator metrics (for reporting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub in_flight: usize,
    pub peak_in_flight: usize,
    pub scheduled: u64,
    pub completed: u64,
}

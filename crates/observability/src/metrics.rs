//! Forwarding metrics
//!
//! Prometheus-facing counters plus an in-process latency accumulator.

use std::time::Duration;

use contracts::{LatencyStats, RunSummary};
use metrics::{counter, gauge, histogram};

/// Record one line that produced an error record
pub fn record_record_matched() {
    counter!("errlog_forwarder_records_matched_total").increment(1);
}

/// Record one finished dispatch
///
/// `outcome` is the outcome label (`delivered`, `transport_failed`, ...).
pub fn record_dispatch(sink_name: &str, outcome: &'static str, elapsed: Duration) {
    counter!(
        "errlog_forwarder_dispatches_total",
        "sink" => sink_name.to_string(),
        "outcome" => outcome
    )
    .increment(1);

    histogram!(
        "errlog_forwarder_dispatch_latency_ms",
        "sink" => sink_name.to_string()
    )
    .record(elapsed.as_secs_f64() * 1000.0);
}

/// Record the current number of dispatches in flight
pub fn record_in_flight(in_flight: usize) {
    gauge!("errlog_forwarder_dispatches_in_flight").set(in_flight as f64);
}

/// Record the totals of a finished run
pub fn record_run_summary(summary: &RunSummary) {
    counter!("errlog_forwarder_runs_total").increment(1);
    gauge!("errlog_forwarder_last_run_matched").set(summary.matched as f64);
    gauge!("errlog_forwarder_last_run_delivered").set(summary.delivered as f64);
    gauge!("errlog_forwarder_last_run_failed").set(summary.failed as f64);
    gauge!("errlog_forwarder_last_run_peak_in_flight").set(summary.peak_in_flight as f64);

    if summary.source_failure.is_some() {
        counter!("errlog_forwarder_source_failures_total").increment(1);
    }
    if summary.deadline_exceeded {
        counter!("errlog_forwarder_deadline_exceeded_total").increment(1);
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a sample
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// Add a duration sample in milliseconds
    pub fn push_duration(&mut self, elapsed: Duration) {
        self.push(elapsed.as_secs_f64() * 1000.0);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Snapshot as summary latency stats (samples in milliseconds)
    pub fn to_latency_stats(&self) -> LatencyStats {
        LatencyStats {
            count: self.count,
            mean_ms: self.mean(),
            min_ms: self.min,
            max_ms: self.max,
            std_dev_ms: self.std_dev(),
        }
    }
}

//! Outcome aggregation
//!
//! Dispatch tasks never touch the summary. Each task holds a `ReportGuard`
//! and sends exactly one `Report` over the channel; a single aggregator
//! task owns the counters.

use std::time::Duration;

use contracts::{DispatchOutcome, RunSummary};
use observability::RunningStats;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// One dispatch result, as seen by the aggregator
#[derive(Debug)]
pub enum Report {
    /// Dispatch finished with an outcome
    Outcome {
        line: u64,
        outcome: DispatchOutcome,
        elapsed: Duration,
    },
    /// Dispatch task ended before producing an outcome
    Aborted { line: u64 },
}

/// Reports `Aborted` on drop unless `complete` was called first
#[derive(Debug)]
pub struct ReportGuard {
    tx: Option<mpsc::UnboundedSender<Report>>,
    line: u64,
}

impl ReportGuard {
    pub fn new(tx: mpsc::UnboundedSender<Report>, line: u64) -> Self {
        Self { tx: Some(tx), line }
    }

    /// Report the outcome of this dispatch
    pub fn complete(mut self, outcome: DispatchOutcome, elapsed: Duration) {
        if let Some(tx) = self.tx.take() {
            let report = Report::Outcome {
                line: self.line,
                outcome,
                elapsed,
            };
            if tx.send(report).is_err() {
                warn!(line = self.line, "Aggregator gone, outcome dropped");
            }
        }
    }
}

impl Drop for ReportGuard {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            warn!(line = self.line, "Dispatch ended without an outcome");
            let _ = tx.send(Report::Aborted { line: self.line });
        }
    }
}

/// Fold reports into a summary until every sender is dropped
///
/// Only `delivered`, `failed`, `failures` and `latency` are filled in here;
/// the coordinator owns the remaining fields.
pub async fn aggregate(mut rx: mpsc::UnboundedReceiver<Report>, max_causes: usize) -> RunSummary {
    let mut summary = RunSummary::new();
    let mut latency = RunningStats::default();

    while let Some(report) = rx.recv().await {
        match report {
            Report::Outcome {
                line,
                outcome,
                elapsed,
            } => {
                latency.push_duration(elapsed);
                summary.record_outcome(line, &outcome, max_causes);
            }
            Report::Aborted { line } => summary.record_aborted(line, max_causes),
        }
    }

    summary.latency = latency.to_latency_stats();
    debug!(
        delivered = summary.delivered,
        failed = summary.failed,
        "Aggregation finished"
    );
    summary
}

//! RunSummary - Coordinator output, Reporter input

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{DispatchOutcome, FailureCause, FailureKind};

/// Why the source stopped producing lines early
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceFailure {
    /// Source path does not exist
    NotFound { path: String },

    /// Source could not be opened or read
    Read { line: Option<u64>, message: String },
}

impl fmt::Display for SourceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { path } => write!(f, "source not found: {path}"),
            Self::Read {
                line: Some(line),
                message,
            } => write!(f, "source read error at line {line}: {message}"),
            Self::Read {
                line: None,
                message,
            } => write!(f, "source read error: {message}"),
        }
    }
}

/// Aggregate outcome of one forwarding run
///
/// Invariant: `matched == delivered + failed` once the run has finished.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Lines consumed from the source
    pub lines_read: u64,

    /// Lines that produced a record and were scheduled for dispatch
    pub matched: u64,

    /// Records accepted by the sink
    pub delivered: u64,

    /// Records that failed (encoding, transport, rejection, aborted)
    pub failed: u64,

    /// Failure causes in arrival order, bounded
    pub failures: Vec<FailureCause>,

    /// Causes not kept because the bound was reached
    pub failures_truncated: u64,

    /// Set when the source could not be opened or read to the end
    pub source_failure: Option<SourceFailure>,

    /// Set when the run deadline stopped scheduling
    pub deadline_exceeded: bool,

    /// Highest number of dispatches observed in flight at once
    pub peak_in_flight: usize,

    /// Dispatch latency over all completed dispatches
    pub latency: LatencyStats,
}

/// Dispatch latency statistics in milliseconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencyStats {
    pub count: u64,
    pub mean_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub std_dev_ms: f64,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Summary for a run whose source could not be opened
    pub fn source_unavailable(failure: SourceFailure) -> Self {
        let mut summary = Self::new();
        summary.record_source_failure(failure, 1);
        summary
    }

    /// Fold one dispatch outcome into the counters
    pub fn record_outcome(&mut self, line: u64, outcome: &DispatchOutcome, max_causes: usize) {
        match FailureCause::from_outcome(line, outcome) {
            None => self.delivered += 1,
            Some(cause) => {
                self.failed += 1;
                self.push_cause(cause, max_causes);
            }
        }
    }

    /// Count a dispatch that ended without an outcome
    pub fn record_aborted(&mut self, line: u64, max_causes: usize) {
        self.failed += 1;
        self.push_cause(
            FailureCause::new(
                Some(line),
                FailureKind::Aborted,
                "dispatch ended without an outcome",
            ),
            max_causes,
        );
    }

    /// Record the source-level failure as a distinguished cause
    pub fn record_source_failure(&mut self, failure: SourceFailure, max_causes: usize) {
        let line = match &failure {
            SourceFailure::NotFound { .. } => None,
            SourceFailure::Read { line, .. } => *line,
        };
        self.push_cause(
            FailureCause::new(line, FailureKind::SourceRead, failure.to_string()),
            max_causes,
        );
        self.source_failure = Some(failure);
    }

    /// Check the count invariant
    pub fn is_consistent(&self) -> bool {
        self.matched == self.delivered + self.failed
    }

    /// Count failures of one kind among the kept causes
    pub fn failures_of(&self, kind: FailureKind) -> usize {
        self.failures.iter().filter(|c| c.kind == kind).count()
    }

    fn push_cause(&mut self, cause: FailureCause, max_causes: usize) {
        if self.failures.len() < max_causes {
            self.failures.push(cause);
        } else {
            self.failures_truncated += 1;
        }
    }
}

//! DispatchOutcome - Dispatcher output
//!
//! Produced exactly once per `ErrorRecord` and consumed by the coordinator.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of sending one record to the sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// Sink answered with the success status
    Delivered { status: u16, body: String },

    /// Record could not be encoded
    EncodingFailed { cause: String },

    /// Request never produced a readable response
    TransportFailed { cause: String },

    /// Sink answered with any other status
    RejectedByServer { status: u16, body: String },
}

impl DispatchOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }

    /// Failure classification, `None` for delivered records
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Delivered { .. } => None,
            Self::EncodingFailed { .. } => Some(FailureKind::Encoding),
            Self::TransportFailed { .. } => Some(FailureKind::Transport),
            Self::RejectedByServer { .. } => Some(FailureKind::Rejected),
        }
    }

    /// Short human-readable description of a failure
    pub fn failure_detail(&self) -> Option<String> {
        match self {
            Self::Delivered { .. } => None,
            Self::EncodingFailed { cause } | Self::TransportFailed { cause } => Some(cause.clone()),
            Self::RejectedByServer { status, body } if body.is_empty() => {
                Some(format!("status {status}"))
            }
            Self::RejectedByServer { status, body } => Some(format!("status {status}: {body}")),
        }
    }

    /// Metric / log label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Delivered { .. } => "delivered",
            Self::EncodingFailed { .. } => FailureKind::Encoding.as_str(),
            Self::TransportFailed { .. } => FailureKind::Transport.as_str(),
            Self::RejectedByServer { .. } => FailureKind::Rejected.as_str(),
        }
    }
}

/// Failure taxonomy recorded in the run summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Record encoding failed
    Encoding,
    /// Connection, DNS, timeout or body read failure
    Transport,
    /// Non-success status from the sink
    Rejected,
    /// Dispatch task ended without reporting an outcome
    Aborted,
    /// Source stopped producing lines because of an I/O error
    SourceRead,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Encoding => "encoding_failed",
            Self::Transport => "transport_failed",
            Self::Rejected => "rejected_by_server",
            Self::Aborted => "aborted",
            Self::SourceRead => "source_read_error",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One diagnosable failure: which line, which kind, what happened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureCause {
    /// Source line index, if the failure is tied to one
    pub line: Option<u64>,
    pub kind: FailureKind,
    pub detail: String,
}

impl FailureCause {
    pub fn new(line: Option<u64>, kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            line,
            kind,
            detail: detail.into(),
        }
    }

    /// Build a cause from a failed outcome, `None` if it was delivered
    pub fn from_outcome(line: u64, outcome: &DispatchOutcome) -> Option<Self> {
        let kind = outcome.failure_kind()?;
        let detail = outcome.failure_detail().unwrap_or_default();
        Some(Self::new(Some(line), kind, detail))
    }
}

//! Run Reporter - maps a finished run onto a process outcome

use std::fmt;

use contracts::{RunSummary, SourceFailure};
use serde::Serialize;

/// Terminal outcome of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalOutcome {
    /// No source failure; dispatch failures are allowed
    ///
    /// Also covers a run cut short by the deadline, where
    /// `summary.deadline_exceeded` is the only signal.
    Completed,
    /// Source path absent
    SourceNotFound,
    /// Source could not be opened or read to the end
    SourceReadError,
}

impl TerminalOutcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Completed => 0,
            Self::SourceNotFound => 1,
            Self::SourceReadError => 2,
        }
    }

    /// Whether the run failed at the source level
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Completed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::SourceNotFound => "source_not_found",
            Self::SourceReadError => "source_read_error",
        }
    }
}

impl fmt::Display for TerminalOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the process reports and exits with
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessResult {
    pub outcome: TerminalOutcome,
    pub exit_code: u8,
    pub summary: RunSummary,
}

/// Map a finished run onto its terminal outcome
pub fn report(summary: RunSummary) -> ProcessResult {
    let outcome = match &summary.source_failure {
        None => TerminalOutcome::Completed,
        Some(SourceFailure::NotFound { .. }) => TerminalOutcome::SourceNotFound,
        Some(SourceFailure::Read { .. }) => TerminalOutcome::SourceReadError,
    };

    ProcessResult {
        outcome,
        exit_code: outcome.exit_code(),
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completed_even_when_every_dispatch_failed() {
        let summary = RunSummary {
            matched: 4,
            failed: 4,
            ..RunSummary::new()
        };
        let result = report(summary);
        assert_eq!(result.outcome, TerminalOutcome::Completed);
        assert_eq!(result.exit_code, 0);
        assert!(!result.outcome.is_fatal());
    }

    #[test]
    fn test_deadline_truncated_run_is_completed() {
        let summary = RunSummary {
            lines_read: 2,
            matched: 1,
            delivered: 1,
            deadline_exceeded: true,
            ..RunSummary::new()
        };
        let result = report(summary);
        assert_eq!(result.outcome, TerminalOutcome::Completed);
        assert_eq!(result.exit_code, 0);
        assert!(result.summary.deadline_exceeded);
    }

    #[test]
    fn test_source_failures_map_to_exit_codes() {
        let missing = report(RunSummary::source_unavailable(SourceFailure::NotFound {
            path: "x.log".to_string(),
        }));
        assert_eq!(missing.outcome, TerminalOutcome::SourceNotFound);
        assert_eq!(missing.exit_code, 1);

        let unreadable = report(RunSummary::source_unavailable(SourceFailure::Read {
            line: Some(3),
            message: "invalid UTF-8".to_string(),
        }));
        assert_eq!(unreadable.outcome, TerminalOutcome::SourceReadError);
        assert_eq!(unreadable.exit_code, 2);
    }

    #[test]
    fn test_process_result_json() {
        let json = serde_json::to_value(report(RunSummary::new())).unwrap();
        assert_eq!(json["outcome"], "completed");
        assert_eq!(json["exit_code"], 0);
        assert_eq!(json["summary"]["matched"], 0);
    }
}

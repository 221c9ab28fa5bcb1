//! Record extraction
//!
//! A line is an error event iff it has the exact shape
//! `[<timestamp>] ERROR <message>`. Lines that merely contain `ERROR`
//! somewhere do not match.

use std::sync::LazyLock;

use contracts::{ContractError, ErrorRecord, LogLine};
use regex::Regex;

/// Anchored default pattern: bracketed timestamp, literal `ERROR `, message
pub const DEFAULT_PATTERN: &str = r"^\[(?P<timestamp>[^\]]*)\] ERROR (?P<message>.*)$";

const TIMESTAMP_GROUP: &str = "timestamp";
const MESSAGE_GROUP: &str = "message";

static DEFAULT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEFAULT_PATTERN).expect("default pattern is valid"));

/// Extract a record using the default pattern
pub fn extract(line: &LogLine) -> Option<ErrorRecord> {
    capture(&DEFAULT_REGEX, &line.text)
}

/// Line matcher producing `ErrorRecord`s
#[derive(Debug, Clone)]
pub struct RecordExtractor {
    regex: Regex,
}

impl Default for RecordExtractor {
    fn default() -> Self {
        Self {
            regex: DEFAULT_REGEX.clone(),
        }
    }
}

impl RecordExtractor {
    /// Build an extractor from a custom pattern
    ///
    /// # Errors
    /// The pattern must compile and define the `timestamp` and `message`
    /// named groups.
    pub fn with_pattern(pattern: &str) -> Result<Self, ContractError> {
        let regex = Regex::new(pattern).map_err(|e| {
            ContractError::config_validation("extract.pattern", format!("invalid pattern: {e}"))
        })?;

        for group in [TIMESTAMP_GROUP, MESSAGE_GROUP] {
            if !regex.capture_names().flatten().any(|name| name == group) {
                return Err(ContractError::config_validation(
                    "extract.pattern",
                    format!("pattern must define the named group '{group}'"),
                ));
            }
        }

        Ok(Self { regex })
    }

    /// Build from an optional custom pattern, falling back to the default
    pub fn from_pattern(pattern: Option<&str>) -> Result<Self, ContractError> {
        match pattern {
            Some(p) => Self::with_pattern(p),
            None => Ok(Self::default()),
        }
    }

    /// Pattern source text
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Extract a record from one line
    pub fn extract(&self, line: &LogLine) -> Option<ErrorRecord> {
        capture(&self.regex, &line.text)
    }
}

fn capture(regex: &Regex, text: &str) -> Option<ErrorRecord> {
    let caps = regex.captures(text)?;
    let timestamp = caps.name(TIMESTAMP_GROUP).map_or("", |m| m.as_str());
    let message = caps.name(MESSAGE_GROUP).map_or("", |m| m.as_str());
    Some(ErrorRecord::new(timestamp, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str) -> LogLine {
        LogLine::new(0, text)
    }

    #[test]
    fn test_matching_line() {
        let record = extract(&line("[2024-01-01T00:00:00] ERROR disk full")).unwrap();
        assert_eq!(record.timestamp, "2024-01-01T00:00:00");
        assert_eq!(record.message, "disk full");
    }

    #[test]
    fn test_message_keeps_rest_of_line() {
        let record = extract(&line("[t1] ERROR failed: [code 5] ERROR again")).unwrap();
        assert_eq!(record.timestamp, "t1");
        assert_eq!(record.message, "failed: [code 5] ERROR again");
    }

    #[test]
    fn test_substring_error_does_not_match() {
        for text in [
            "ERRORS happened",
            "foo ERROR",
            "ERROR no brackets",
            "plain line",
            "",
            "[2024-01-01] INFO all good",
            "[2024-01-01] ERRORdisk full",
            "[2024-01-01]ERROR disk full",
            "prefix [2024-01-01] ERROR disk full",
            "[2024-01-01] error disk full",
        ] {
            assert!(extract(&line(text)).is_none(), "should not match: {text:?}");
        }
    }

    #[test]
    fn test_timestamp_stops_at_first_bracket() {
        // A `]` inside the first bracket pair is not part of a timestamp
        assert!(extract(&line("[a]b] ERROR x")).is_none());
    }

    #[test]
    fn test_empty_captures_still_emit() {
        let record = extract(&line("[] ERROR ")).unwrap();
        assert_eq!(record.timestamp, "");
        assert_eq!(record.message, "");

        let record = extract(&line("[] ERROR boom")).unwrap();
        assert_eq!(record.timestamp, "");
        assert_eq!(record.message, "boom");
    }

    #[test]
    fn test_default_extractor_matches_free_function() {
        let extractor = RecordExtractor::default();
        let l = line("[ts] ERROR msg");
        assert_eq!(extractor.extract(&l), extract(&l));
        assert_eq!(extractor.pattern(), DEFAULT_PATTERN);
    }

    #[test]
    fn test_custom_pattern() {
        let extractor =
            RecordExtractor::with_pattern(r"^(?P<timestamp>\S+) \[error\] (?P<message>.*)$")
                .unwrap();
        let record = extractor
            .extract(&line("2024-01-01T00:00:00Z [error] out of memory"))
            .unwrap();
        assert_eq!(record.timestamp, "2024-01-01T00:00:00Z");
        assert_eq!(record.message, "out of memory");
    }

    #[test]
    fn test_custom_pattern_requires_named_groups() {
        let err = RecordExtractor::with_pattern(r"^\[(.*)\] ERROR (.*)$").unwrap_err();
        assert!(err.to_string().contains("timestamp"));

        let err = RecordExtractor::with_pattern(r"^(?P<timestamp>\S+)$").unwrap_err();
        assert!(err.to_string().contains("message"));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let err = RecordExtractor::with_pattern("([unclosed").unwrap_err();
        assert!(matches!(err, ContractError::ConfigValidation { .. }));
    }

    #[test]
    fn test_from_pattern_none_uses_default() {
        let extractor = RecordExtractor::from_pattern(None).unwrap();
        assert_eq!(extractor.pattern(), DEFAULT_PATTERN);
    }
}

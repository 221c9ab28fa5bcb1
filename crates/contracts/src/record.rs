//! LogLine / ErrorRecord - Source output and sink input

use serde::{Deserialize, Serialize};

/// A raw line read from the log source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    /// 0-based position in the source
    pub index: u64,

    /// Line text without the trailing line terminator
    pub text: String,
}

impl LogLine {
    pub fn new(index: u64, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }
}

/// Structured error event extracted from a log line
///
/// Wire shape: `{"timestamp": <string>, "message": <string>}`.
/// Either field may be empty when the line matched with an empty capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub timestamp: String,
    pub message: String,
}

impl ErrorRecord {
    pub fn new(timestamp: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            message: message.into(),
        }
    }
}

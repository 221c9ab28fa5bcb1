//! # Ingestion
//!
//! Log source reading and record extraction.
//!
//! Responsibilities:
//! - Open the log file, distinguishing "absent" from other failures
//! - Produce `LogLine`s one at a time, never buffering the whole file
//! - Turn matching lines into `ErrorRecord`s
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{LogSource, RecordExtractor};
//!
//! let mut source = LogSource::open(Path::new("server.log")).await?;
//! let extractor = RecordExtractor::default();
//! while let Some(line) = source.next_line().await? {
//!     if let Some(record) = extractor.extract(&line) {
//!         // dispatch record
//!     }
//! }
//! ```

mod error;
mod extractor;
mod source;

// Re-exports
pub use contracts::{ErrorRecord, LogLine};
pub use error::{Result, SourceError};
pub use extractor::{extract, RecordExtractor, DEFAULT_PATTERN};
pub use source::LogSource;

//! # Contracts
//!
//! Shared data model and interface contracts for the forwarder.
//! All business crates depend on this crate, reverse dependencies are prohibited.
//!
//! ## Record Model
//! - `LogLine` is read from the source, carries its 0-based position
//! - `ErrorRecord` is what gets encoded and sent to the sink
//! - `DispatchOutcome` is produced exactly once per record
//! - `RunSummary` aggregates outcomes and survives to the reporter

mod config;
mod error;
mod outcome;
mod record;
mod sink;
mod summary;

pub use config::*;
pub use error::*;
pub use outcome::*;
pub use record::*;
pub use sink::*;
pub use summary::*;

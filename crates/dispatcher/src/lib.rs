//! # Dispatcher
//!
//! Record dispatch and fan-out coordination.
//!
//! Responsibilities:
//! - Encode `ErrorRecord`s and send them to the sink, classifying the outcome
//! - Fan out one dispatch per matching line under a concurrency cap
//! - Aggregate outcomes into a `RunSummary` through a single channel
//! - Map the summary onto a terminal process outcome

pub mod aggregate;
pub mod coordinator;
pub mod dispatch;
pub mod error;
pub mod metrics;
pub mod report;
pub mod sinks;

pub use contracts::{DispatchOutcome, ErrorRecord, RecordSink, RunSummary};
pub use coordinator::{Coordinator, CoordinatorConfig};
pub use dispatch::{classify, dispatch, encode, DispatchSettings};
pub use error::DispatcherError;
pub use metrics::{CoordinatorMetrics, InFlightGuard, MetricsSnapshot};
pub use report::{report, ProcessResult, TerminalOutcome};
pub use sinks::{create_sink, ConfiguredSink, HttpSink, HttpSinkConfig, LogSink};

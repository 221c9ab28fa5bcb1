//! RecordSink trait - Dispatcher output interface
//!
//! Defines the abstract interface for the remote ingestion endpoint.

use std::time::Duration;

use crate::ContractError;

/// Content type for JSON-encoded records
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Encoded record plus the content type that declares its encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Payload {
    pub fn json(body: Vec<u8>) -> Self {
        Self {
            content_type: JSON_CONTENT_TYPE,
            body,
        }
    }
}

/// Status and fully drained body returned by the sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkResponse {
    pub status: u16,
    pub body: String,
}

/// Record output trait
///
/// All sink implementations must implement this trait. Sinks are shared
/// between concurrent dispatches, so `send` takes `&self`.
#[trait_variant::make(RecordSink: Send)]
pub trait LocalRecordSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Send one payload and wait at most `timeout` for the full response
    ///
    /// # Errors
    /// Returns a transport error when no readable response was obtained.
    /// A response with any status code is `Ok`.
    async fn send(&self, payload: Payload, timeout: Duration)
        -> Result<SinkResponse, ContractError>;
}

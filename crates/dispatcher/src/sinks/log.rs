//! LogSink - logs payloads via tracing, for dry runs

use std::collections::HashMap;
use std::time::Duration;

use contracts::{ContractError, Payload, RecordSink, SinkResponse};
use tracing::{info, instrument};

const DEFAULT_STATUS: u16 = 201;

/// Sink that logs payloads instead of sending them
pub struct LogSink {
    name: String,
    status: u16,
}

impl LogSink {
    /// Create a new LogSink answering with 201
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: DEFAULT_STATUS,
        }
    }

    /// Answer with `status` instead of 201
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Create from params map (`status` optional)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let status = match params.get("status") {
            Some(s) => s.parse().map_err(|e| {
                ContractError::config_validation(
                    format!("sink[{name}].params.status"),
                    format!("invalid status '{s}': {e}"),
                )
            })?,
            None => DEFAULT_STATUS,
        };
        Ok(Self { name, status })
    }
}

impl RecordSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "log_sink_send", skip(self, payload, _timeout), fields(sink = %self.name))]
    async fn send(
        &self,
        payload: Payload,
        _timeout: Duration,
    ) -> Result<SinkResponse, ContractError> {
        info!(
            sink = %self.name,
            content_type = payload.content_type,
            payload = %String::from_utf8_lossy(&payload.body),
            "Record payload"
        );
        Ok(SinkResponse {
            status: self.status,
            body: String::new(),
        })
    }
}

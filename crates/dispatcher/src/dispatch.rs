//! Single-record dispatch: encode, send, classify

use std::time::Duration;

use contracts::{
    ContractError, DispatchConfig, DispatchOutcome, ErrorRecord, Payload, RecordSink,
    SinkResponse,
};
use tracing::instrument;

/// Per-dispatch settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSettings {
    /// Deadline for one send including the response body
    pub timeout: Duration,
    /// The one status that denotes acceptance
    pub success_status: u16,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self::from(&DispatchConfig::default())
    }
}

impl From<&DispatchConfig> for DispatchSettings {
    fn from(config: &DispatchConfig) -> Self {
        Self {
            timeout: config.timeout(),
            success_status: config.success_status,
        }
    }
}

/// Encode a record as a JSON payload
pub fn encode(record: &ErrorRecord) -> Result<Payload, ContractError> {
    serde_json::to_vec(record)
        .map(Payload::json)
        .map_err(|e| ContractError::encoding(e.to_string()))
}

/// Classify a sink response against the success status
pub fn classify(response: SinkResponse, success_status: u16) -> DispatchOutcome {
    let SinkResponse { status, body } = response;
    if status == success_status {
        DispatchOutcome::Delivered { status, body }
    } else {
        DispatchOutcome::RejectedByServer { status, body }
    }
}

/// Send one record to the sink
///
/// Never fails: every error is folded into the returned outcome. The send
/// is bounded by `settings.timeout` even if the sink ignores its own
/// timeout argument.
#[instrument(name = "dispatch_record", skip_all, fields(sink = %sink.name()))]
pub async fn dispatch<S: RecordSink + Sync>(
    record: ErrorRecord,
    sink: &S,
    settings: &DispatchSettings,
) -> DispatchOutcome {
    let payload = match encode(&record) {
        Ok(payload) => payload,
        Err(e) => {
            return DispatchOutcome::EncodingFailed {
                cause: e.to_string(),
            }
        }
    };

    match tokio::time::timeout(settings.timeout, sink.send(payload, settings.timeout)).await {
        Ok(Ok(response)) => classify(response, settings.success_status),
        Ok(Err(e)) => DispatchOutcome::TransportFailed {
            cause: e.to_string(),
        },
        Err(_) => DispatchOutcome::TransportFailed {
            cause: format!(
                "no response from sink '{}' within {}ms",
                sink.name(),
                settings.timeout.as_millis()
            ),
        },
    }
}

//! Sink implementations
//!
//! Contains HttpSink and LogSink, plus the config-driven `ConfiguredSink`.

mod http;
mod log;

use std::time::Duration;

use contracts::{ContractError, Payload, RecordSink, SinkConfig, SinkResponse, SinkType};
use tracing::instrument;

use crate::error::DispatcherError;

pub use self::http::{HttpSink, HttpSinkConfig};
pub use self::log::LogSink;

/// Sink selected by configuration
pub enum ConfiguredSink {
    Http(HttpSink),
    Log(LogSink),
}

impl RecordSink for ConfiguredSink {
    fn name(&self) -> &str {
        match self {
            Self::Http(sink) => sink.name(),
            Self::Log(sink) => sink.name(),
        }
    }

    async fn send(&self, payload: Payload, timeout: Duration) -> Result<SinkResponse, ContractError> {
        match self {
            Self::Http(sink) => sink.send(payload, timeout).await,
            Self::Log(sink) => sink.send(payload, timeout).await,
        }
    }
}

/// Create a sink from configuration
#[instrument(
    name = "dispatcher_create_sink",
    skip(config),
    fields(sink = %config.name, sink_type = ?config.sink_type)
)]
pub fn create_sink(config: &SinkConfig) -> Result<ConfiguredSink, DispatcherError> {
    match config.sink_type {
        SinkType::Http => {
            let sink = HttpSink::from_params(&config.name, &config.params)
                .map_err(|e| DispatcherError::sink_creation(&config.name, e.to_string()))?;
            Ok(ConfiguredSink::Http(sink))
        }
        SinkType::Log => {
            let sink = LogSink::from_params(&config.name, &config.params)
                .map_err(|e| DispatcherError::sink_creation(&config.name, e.to_string()))?;
            Ok(ConfiguredSink::Log(sink))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_http_sink() {
        let config = SinkConfig::http("ingest", "http://127.0.0.1:8080/posts");
        let sink = create_sink(&config).unwrap();
        assert!(matches!(sink, ConfiguredSink::Http(_)));
        assert_eq!(sink.name(), "ingest");
    }

    #[test]
    fn test_create_http_sink_without_url_fails() {
        let mut config = SinkConfig::http("ingest", "");
        config.params.clear();
        let err = create_sink(&config).err().unwrap();
        assert!(err.to_string().contains("url"));
    }

    #[tokio::test]
    async fn test_configured_log_sink_delegates() {
        let sink = create_sink(&SinkConfig::log("dry")).unwrap();
        let response = sink
            .send(Payload::json(b"{}".to_vec()), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(response.status, 201);
    }
}

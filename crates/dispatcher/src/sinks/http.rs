//! HttpSink - JSON records over HTTP POST

use std::collections::HashMap;
use std::time::Duration;

use contracts::{ContractError, Payload, RecordSink, SinkResponse};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};
use tracing::{debug, instrument};

const DEFAULT_USER_AGENT: &str = concat!("errlog-forwarder/", env!("CARGO_PKG_VERSION"));

/// Configuration for HttpSink
#[derive(Debug, Clone)]
pub struct HttpSinkConfig {
    /// Endpoint receiving one POST per record
    pub url: Url,
    /// User-Agent header value
    pub user_agent: String,
}

impl HttpSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, String> {
        let url_str = params
            .get("url")
            .ok_or_else(|| "missing 'url' parameter".to_string())?;

        let url: Url = url_str
            .parse()
            .map_err(|e| format!("invalid url '{}': {}", url_str, e))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(format!("unsupported url scheme '{}'", url.scheme()));
        }

        let user_agent = params
            .get("user_agent")
            .cloned()
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        Ok(Self { url, user_agent })
    }
}

/// Sink that POSTs each payload to an HTTP endpoint
pub struct HttpSink {
    name: String,
    config: HttpSinkConfig,
    client: Client,
}

impl HttpSink {
    /// Create a new HttpSink
    pub fn new(name: impl Into<String>, config: HttpSinkConfig) -> Result<Self, ContractError> {
        let name = name.into();
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ContractError::sink_connection(&name, e.to_string()))?;

        debug!(sink = %name, url = %config.url, "HttpSink created");

        Ok(Self {
            name,
            config,
            client,
        })
    }

    /// Create from params (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let config = HttpSinkConfig::from_params(params)
            .map_err(|e| ContractError::sink_connection(&name, e))?;
        Self::new(name, config)
    }

    /// Target endpoint
    pub fn url(&self) -> &Url {
        &self.config.url
    }

    fn transport_error(&self, err: &reqwest::Error) -> ContractError {
        let message = if err.is_timeout() {
            format!("request timed out: {err}")
        } else if err.is_connect() {
            format!("connection failed: {err}")
        } else {
            err.to_string()
        };
        ContractError::sink_transport(&self.name, message)
    }
}

impl RecordSink for HttpSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "http_sink_send",
        skip(self, payload),
        fields(sink = %self.name, bytes = payload.body.len())
    )]
    async fn send(&self, payload: Payload, timeout: Duration) -> Result<SinkResponse, ContractError> {
        let response = self
            .client
            .post(self.config.url.clone())
            .timeout(timeout)
            .header(CONTENT_TYPE, payload.content_type)
            .body(payload.body)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status().as_u16();

        // Read the body to the end on every status so the connection can be reused
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(&e))?;

        debug!(sink = %self.name, status, body_len = body.len(), "Response received");
        Ok(SinkResponse { status, body })
    }
}

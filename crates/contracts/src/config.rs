//! ForwarderConfig - Config Loader output
//!
//! Describes one forwarding run: where to read, where to send, how hard to push.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use validator::Validate;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete forwarder configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ForwarderConfig {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Log source
    #[validate(nested)]
    pub source: SourceConfig,

    /// Remote ingestion endpoint
    #[validate(nested)]
    pub sink: SinkConfig,

    /// Per-record dispatch settings
    #[serde(default)]
    #[validate(nested)]
    pub dispatch: DispatchConfig,

    /// Run-level settings
    #[serde(default)]
    #[validate(nested)]
    pub run: RunConfig,

    /// Record extraction settings
    #[serde(default)]
    pub extract: ExtractConfig,
}

impl ForwarderConfig {
    /// Configuration with default dispatch, run and extract settings
    pub fn new(path: impl Into<PathBuf>, sink: SinkConfig) -> Self {
        Self {
            version: ConfigVersion::V1,
            source: SourceConfig { path: path.into() },
            sink,
            dispatch: DispatchConfig::default(),
            run: RunConfig::default(),
            extract: ExtractConfig::default(),
        }
    }
}

/// Log source configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SourceConfig {
    /// Path to a finite, line-oriented text log
    #[validate(custom(function = "validate_non_empty_path"))]
    pub path: PathBuf,
}

fn validate_non_empty_path(path: &PathBuf) -> Result<(), validator::ValidationError> {
    if path.as_os_str().is_empty() {
        return Err(validator::ValidationError::new("empty_path"));
    }
    Ok(())
}

/// Sink configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SinkConfig {
    /// Sink name (used for logging/metrics)
    #[validate(length(min = 1))]
    pub name: String,

    /// Sink implementation
    pub sink_type: SinkType,

    /// Sink-specific parameters (`url`, `user_agent`, `status`)
    #[serde(default)]
    pub params: HashMap<String, String>,
}

impl SinkConfig {
    /// HTTP sink pointing at `url`
    pub fn http(name: impl Into<String>, url: impl Into<String>) -> Self {
        let mut params = HashMap::new();
        params.insert("url".to_string(), url.into());
        Self {
            name: name.into(),
            sink_type: SinkType::Http,
            params,
        }
    }

    /// Dry-run sink that only logs payloads
    pub fn log(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sink_type: SinkType::Log,
            params: HashMap::new(),
        }
    }
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// JSON over HTTP POST
    Http,
    /// Log payloads via tracing, answer with a fixed status
    Log,
}

/// Per-record dispatch settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DispatchConfig {
    /// Deadline for a single send, including reading the response body
    #[serde(default = "default_timeout_ms")]
    #[validate(range(min = 1, max = 600_000))]
    pub timeout_ms: u64,

    /// The one status that denotes acceptance
    #[serde(default = "default_success_status")]
    #[validate(range(min = 100, max = 599))]
    pub success_status: u16,
}

impl DispatchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            success_status: default_success_status(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_success_status() -> u16 {
    201
}

/// Run-level settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RunConfig {
    /// Maximum number of dispatches in flight
    #[serde(default = "default_concurrency_limit")]
    #[validate(range(min = 1, max = 4096))]
    pub concurrency_limit: usize,

    /// Overall deadline after which no new dispatch is scheduled
    #[serde(default)]
    #[validate(range(min = 1, max = 31_536_000))]
    pub deadline_secs: Option<u64>,

    /// Bound on the failure causes kept in the summary
    #[serde(default = "default_max_failure_causes")]
    pub max_failure_causes: usize,
}

impl RunConfig {
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: default_concurrency_limit(),
            deadline_secs: None,
            max_failure_causes: default_max_failure_causes(),
        }
    }
}

fn default_concurrency_limit() -> usize {
    16
}

fn default_max_failure_causes() -> usize {
    100
}

/// Record extraction settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Custom pattern with `timestamp` and `message` named groups
    #[serde(default)]
    pub pattern: Option<String>,
}

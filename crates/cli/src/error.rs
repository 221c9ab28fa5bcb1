//! Error types for CLI operations.

use thiserror::Error;

/// Exit code for configuration and usage errors
pub const USAGE_EXIT_CODE: u8 = 3;

/// Exit code after Ctrl+C / SIGTERM
pub const INTERRUPTED_EXIT_CODE: u8 = 130;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration could not be read or parsed
    #[error("Failed to load configuration from {path}: {message}")]
    ConfigLoad { path: String, message: String },

    /// Configuration validation error
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String },

    /// Required flag absent without a configuration file
    #[error("Missing required argument {name} (or pass --config)")]
    MissingArgument { name: &'static str },

    /// Forwarding components could not be built
    #[error("Failed to build forwarder: {message}")]
    Setup { message: String },

    /// Run stopped by a shutdown signal
    #[error("Interrupted by shutdown signal")]
    Interrupted,
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn config_load(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigLoad {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    pub fn setup(message: impl Into<String>) -> Self {
        Self::Setup {
            message: message.into(),
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Interrupted => INTERRUPTED_EXIT_CODE,
            _ => USAGE_EXIT_CODE,
        }
    }
}

/// Exit code for any command error
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<CliError>()
        .map(CliError::exit_code)
        .unwrap_or(USAGE_EXIT_CODE)
}

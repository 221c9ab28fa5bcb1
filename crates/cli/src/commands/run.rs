//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::{ForwarderConfig, SinkConfig, SinkType};
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::Pipeline;

const DEFAULT_SINK_NAME: &str = "endpoint";

/// Execute the `run` command, returning the process exit code
pub async fn run_forwarder(args: &RunArgs) -> Result<u8> {
    let config = resolve_config(args)?;

    info!(
        source = %config.source.path.display(),
        sink = %config.sink.name,
        sink_type = ?config.sink.sink_type,
        concurrency_limit = config.run.concurrency_limit,
        timeout_ms = config.dispatch.timeout_ms,
        success_status = config.dispatch.success_status,
        "Configuration loaded"
    );

    let pipeline = Pipeline::new(config);

    // Setup graceful shutdown handler
    let shutdown_signal = setup_shutdown_signal();

    tokio::select! {
        result = pipeline.run() => {
            let stats = result?;
            if args.json {
                let json = serde_json::to_string_pretty(&stats)
                    .context("Failed to serialize run report")?;
                println!("{json}");
            } else {
                stats.print_summary();
            }
            Ok(stats.result.exit_code)
        }
        _ = shutdown_signal => {
            warn!("Received shutdown signal, in-flight requests abandoned");
            Err(CliError::Interrupted.into())
        }
    }
}

/// Build the run configuration from the config file (if any) and flags
fn resolve_config(args: &RunArgs) -> Result<ForwarderConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::config_not_found(path.display().to_string()));
            }
            config_loader::ConfigLoader::load_from_path(path)
                .map_err(|e| CliError::config_load(path.display().to_string(), e.to_string()))?
        }
        None => {
            let log = args
                .log
                .clone()
                .ok_or(CliError::MissingArgument { name: "--log" })?;
            let sink = match &args.endpoint {
                Some(url) => SinkConfig::http(DEFAULT_SINK_NAME, url.clone()),
                None if args.dry_run => SinkConfig::log(DEFAULT_SINK_NAME),
                None => return Err(CliError::MissingArgument { name: "--endpoint" }),
            };
            ForwarderConfig::new(log, sink)
        }
    };

    apply_overrides(&mut config, args);

    config_loader::ConfigLoader::validate(&config)
        .map_err(|e| CliError::config_validation(e.to_string()))?;
    Ok(config)
}

/// Apply CLI overrides on top of the loaded configuration
fn apply_overrides(config: &mut ForwarderConfig, args: &RunArgs) {
    if let Some(ref log) = args.log {
        info!(path = %log.display(), "Overriding source path from CLI");
        config.source.path = log.clone();
    }
    if let Some(ref url) = args.endpoint {
        info!(url = %url, "Overriding endpoint from CLI");
        config.sink = SinkConfig::http(config.sink.name.clone(), url.clone());
    }
    if let Some(limit) = args.concurrency {
        config.run.concurrency_limit = limit;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.dispatch.timeout_ms = timeout_ms;
    }
    if let Some(secs) = args.deadline_secs {
        config.run.deadline_secs = Some(secs);
    }
    if let Some(status) = args.success_status {
        config.dispatch.success_status = status;
    }

    // Dry run keeps the source and extraction, answers every send with the success status
    if args.dry_run {
        info!("Dry run mode - payloads will be logged, not sent");
        if config.sink.sink_type != SinkType::Log {
            config.sink = SinkConfig::log(config.sink.name.clone());
        }
        config.sink.params.insert(
            "status".to_string(),
            config.dispatch.success_status.to_string(),
        );
    }
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn test_flags_only_config() {
        let args = RunArgs {
            log: Some(PathBuf::from("server.log")),
            endpoint: Some("http://localhost:3000/posts".to_string()),
            concurrency: Some(4),
            deadline_secs: Some(30),
            ..Default::default()
        };
        let config = resolve_config(&args).unwrap();

        assert_eq!(config.source.path, PathBuf::from("server.log"));
        assert_eq!(config.sink.sink_type, SinkType::Http);
        assert_eq!(
            config.sink.params.get("url").map(String::as_str),
            Some("http://localhost:3000/posts")
        );
        assert_eq!(config.run.concurrency_limit, 4);
        assert_eq!(config.run.deadline_secs, Some(30));
        assert_eq!(config.dispatch.success_status, 201);
    }

    #[test]
    fn test_missing_flags_without_config() {
        let err = resolve_config(&RunArgs::default()).unwrap_err();
        assert!(matches!(err, CliError::MissingArgument { name: "--log" }));

        let args = RunArgs {
            log: Some(PathBuf::from("server.log")),
            ..Default::default()
        };
        let err = resolve_config(&args).unwrap_err();
        assert!(matches!(err, CliError::MissingArgument { name: "--endpoint" }));
    }

    #[test]
    fn test_dry_run_swaps_sink() {
        let args = RunArgs {
            log: Some(PathBuf::from("server.log")),
            endpoint: Some("http://localhost:3000/posts".to_string()),
            success_status: Some(200),
            dry_run: true,
            ..Default::default()
        };
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.sink.sink_type, SinkType::Log);
        assert_eq!(
            config.sink.params.get("status").map(String::as_str),
            Some("200")
        );

        // No endpoint needed for a dry run
        let args = RunArgs {
            log: Some(PathBuf::from("server.log")),
            dry_run: true,
            ..Default::default()
        };
        assert!(resolve_config(&args).is_ok());
    }

    #[test]
    fn test_overrides_apply_to_config_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            r#"
[source]
path = "from-file.log"

[sink]
name = "ingest"
sink_type = "http"
[sink.params]
url = "http://localhost:3000/posts"
"#
        )
        .unwrap();

        let args = RunArgs {
            config: Some(file.path().to_path_buf()),
            timeout_ms: Some(750),
            ..Default::default()
        };
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.source.path, PathBuf::from("from-file.log"));
        assert_eq!(config.sink.name, "ingest");
        assert_eq!(config.dispatch.timeout_ms, 750);
    }

    #[test]
    fn test_dry_run_resyncs_configured_log_sink() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            r#"
[source]
path = "from-file.log"

[sink]
name = "dry"
sink_type = "log"
[sink.params]
status = "201"

[dispatch]
success_status = 200
"#
        )
        .unwrap();

        let args = RunArgs {
            config: Some(file.path().to_path_buf()),
            dry_run: true,
            ..Default::default()
        };
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.sink.name, "dry");
        assert_eq!(config.sink.sink_type, SinkType::Log);
        assert_eq!(
            config.sink.params.get("status").map(String::as_str),
            Some("200")
        );
    }

    #[test]
    fn test_invalid_override_rejected() {
        let args = RunArgs {
            log: Some(PathBuf::from("server.log")),
            endpoint: Some("http://localhost:3000/posts".to_string()),
            concurrency: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            resolve_config(&args),
            Err(CliError::ConfigValidation { .. })
        ));
    }

    #[test]
    fn test_missing_config_file() {
        let args = RunArgs {
            config: Some(PathBuf::from("/nonexistent/forwarder.toml")),
            ..Default::default()
        };
        assert!(matches!(
            resolve_config(&args),
            Err(CliError::ConfigNotFound { .. })
        ));
    }
}

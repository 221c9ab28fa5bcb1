//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{ForwarderConfig, SinkType};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;
use crate::error::CliError;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    source_path: String,
    sink_name: String,
    sink_type: SinkType,
    #[serde(skip_serializing_if = "Option::is_none")]
    endpoint: Option<String>,
    concurrency_limit: usize,
    timeout_ms: u64,
    success_status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    deadline_secs: Option<u64>,
    custom_pattern: bool,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(0)
    } else {
        Err(CliError::config_validation(result.error.unwrap_or_default()).into())
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", config.version),
                    source_path: config.source.path.display().to_string(),
                    sink_name: config.sink.name.clone(),
                    sink_type: config.sink.sink_type,
                    endpoint: config.sink.params.get("url").cloned(),
                    concurrency_limit: config.run.concurrency_limit,
                    timeout_ms: config.dispatch.timeout_ms,
                    success_status: config.dispatch.success_status,
                    deadline_secs: config.run.deadline_secs,
                    custom_pattern: config.extract.pattern.is_some(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &ForwarderConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if !config.source.path.exists() {
        warnings.push(format!(
            "Source {} does not exist yet - a run now would end with SourceNotFound",
            config.source.path.display()
        ));
    }

    if config.sink.sink_type == SinkType::Log {
        warnings.push("Sink type is 'log' - records will be logged, not sent".to_string());
    }

    if !(200..300).contains(&config.dispatch.success_status) {
        warnings.push(format!(
            "success_status {} is outside 2xx",
            config.dispatch.success_status
        ));
    }

    if config.run.max_failure_causes == 0 {
        warnings.push("run.max_failure_causes is 0 - no failure causes will be reported".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Source: {}", summary.source_path);
            println!("  Sink: {} ({:?})", summary.sink_name, summary.sink_type);
            if let Some(ref endpoint) = summary.endpoint {
                println!("  Endpoint: {}", endpoint);
            }
            println!("  Concurrency limit: {}", summary.concurrency_limit);
            println!("  Timeout: {}ms", summary.timeout_ms);
            println!("  Success status: {}", summary.success_status);
            if let Some(deadline) = summary.deadline_secs {
                println!("  Deadline: {}s", deadline);
            }
            if summary.custom_pattern {
                println!("  Pattern: custom");
            }
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

//! # errlog-forwarder CLI
//!
//! 命令行接口入口点。
//!
//! 提供：
//! - 配置加载与验证
//! - 转发运行与退出码映射
//! - 优雅关闭处理

mod cli;
mod commands;
mod error;
mod pipeline;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use observability::ObservabilityConfig;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_forwarder, run_validate};
use error::{exit_code_for, USAGE_EXIT_CODE};

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // clap's own exit code for usage errors collides with the run outcomes
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(USAGE_EXIT_CODE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    if let Err(e) = init_observability(&cli) {
        eprintln!("error: {e:#}");
        return ExitCode::from(USAGE_EXIT_CODE);
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "errlog-forwarder starting"
    );

    // Execute command
    let result = match &cli.command {
        Commands::Run(args) => run_forwarder(args).await,
        Commands::Validate(args) => run_validate(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "Command failed");
            eprintln!("error: {e:#}");
            ExitCode::from(exit_code_for(&e))
        }
    }
}

/// Initialize tracing (and metrics, if requested) based on CLI options
fn init_observability(cli: &Cli) -> Result<()> {
    let (default_log_level, ignore_env) = if cli.quiet {
        ("warn", true)
    } else {
        let level = match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        (level, false)
    };

    observability::init_with_config(ObservabilityConfig {
        log_format: cli.log_format.into(),
        metrics_port: cli.metrics_port,
        default_log_level: default_log_level.to_string(),
        ignore_env,
    })
}

//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// errlog-forwarder - forward error records from a log file to an HTTP endpoint
#[derive(Parser, Debug)]
#[command(
    name = "errlog-forwarder",
    author,
    version,
    about = "Forward error log records to an HTTP endpoint",
    long_about = "Reads a line-oriented log file, extracts every `[timestamp] ERROR message` \n\
                  line and POSTs it as JSON to an ingestion endpoint, with a bounded \n\
                  number of requests in flight."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "ERRLOG_FORWARDER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose", env = "ERRLOG_FORWARDER_QUIET")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "ERRLOG_FORWARDER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    /// Expose Prometheus metrics on this port
    #[arg(long, global = true, env = "ERRLOG_FORWARDER_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Forward error records from the log file to the endpoint
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone, Default)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, env = "ERRLOG_FORWARDER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log file to read (overrides source.path)
    #[arg(short, long, env = "ERRLOG_FORWARDER_LOG")]
    pub log: Option<PathBuf>,

    /// Ingestion endpoint URL (overrides sink.params.url)
    #[arg(short, long, env = "ERRLOG_FORWARDER_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Maximum requests in flight (overrides run.concurrency_limit)
    #[arg(long, env = "ERRLOG_FORWARDER_CONCURRENCY")]
    pub concurrency: Option<usize>,

    /// Per-request timeout in milliseconds (overrides dispatch.timeout_ms)
    #[arg(long, env = "ERRLOG_FORWARDER_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Stop scheduling new requests after this many seconds
    #[arg(long, env = "ERRLOG_FORWARDER_DEADLINE_SECS")]
    pub deadline_secs: Option<u64>,

    /// Status code that counts as delivered (overrides dispatch.success_status)
    #[arg(long, env = "ERRLOG_FORWARDER_SUCCESS_STATUS")]
    pub success_status: Option<u16>,

    /// Log payloads instead of sending them
    #[arg(long, env = "ERRLOG_FORWARDER_DRY_RUN")]
    pub dry_run: bool,

    /// Print the run report as JSON
    #[arg(long, env = "ERRLOG_FORWARDER_JSON")]
    pub json: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, env = "ERRLOG_FORWARDER_CONFIG")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_flags() {
        let cli = Cli::try_parse_from([
            "errlog-forwarder",
            "-v",
            "run",
            "--log",
            "server.log",
            "--endpoint",
            "http://localhost:3000/posts",
            "--concurrency",
            "8",
            "--json",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 1);
        let Commands::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.log, Some(PathBuf::from("server.log")));
        assert_eq!(args.concurrency, Some(8));
        assert!(args.json);
        assert!(!args.dry_run);
    }

    #[test]
    fn test_validate_requires_config() {
        assert!(Cli::try_parse_from(["errlog-forwarder", "validate"]).is_err());
    }
}

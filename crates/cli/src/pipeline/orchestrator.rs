//! Pipeline orchestrator - builds the sink and coordinator, runs one pass.

use std::sync::Arc;
use std::time::Instant;

use contracts::ForwarderConfig;
use dispatcher::{create_sink, report, Coordinator};
use tracing::{info, instrument};

use super::RunStats;
use crate::error::CliError;

/// Main pipeline orchestrator
pub struct Pipeline {
    config: ForwarderConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: ForwarderConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline to completion
    ///
    /// Source and dispatch failures end up in the returned report; only
    /// a sink or coordinator that cannot be built is an error.
    #[instrument(name = "pipeline_run", skip(self), fields(source = %self.config.source.path.display()))]
    pub async fn run(self) -> Result<RunStats, CliError> {
        let start_time = Instant::now();

        let sink = create_sink(&self.config.sink).map_err(|e| CliError::setup(e.to_string()))?;
        let coordinator =
            Coordinator::from_config(&self.config).map_err(|e| CliError::setup(e.to_string()))?;

        info!(sink = %self.config.sink.name, "Forwarding started");

        let summary = coordinator
            .run_path(&self.config.source.path, Arc::new(sink))
            .await;
        let result = report(summary);

        info!(
            outcome = %result.outcome,
            exit_code = result.exit_code,
            "Forwarding finished"
        );

        Ok(RunStats {
            result,
            duration: start_time.elapsed(),
        })
    }
}

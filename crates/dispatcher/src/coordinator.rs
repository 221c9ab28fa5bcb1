//! Coordinator - bounded fan-out of dispatches over one log source
//!
//! One sequential reader feeds matching records to independently spawned
//! dispatch tasks. A semaphore caps the number of tasks in flight; every
//! task reports through the aggregation channel exactly once.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use contracts::{DispatchOutcome, ForwarderConfig, RecordSink, RunConfig, RunSummary};
use ingestion::{LogSource, RecordExtractor};
use tokio::io::AsyncRead;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::{JoinError, JoinSet};
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use crate::aggregate::{aggregate, ReportGuard};
use crate::dispatch::{dispatch, DispatchSettings};
use crate::error::DispatcherError;
use crate::metrics::CoordinatorMetrics;

/// Coordinator configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Maximum dispatches in flight at once
    pub concurrency_limit: usize,
    /// Settings applied to every dispatch
    pub dispatch: DispatchSettings,
    /// Stop scheduling after this long
    pub deadline: Option<Duration>,
    /// Bound on failure causes kept in the summary
    pub max_failure_causes: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        let run = RunConfig::default();
        Self {
            concurrency_limit: run.concurrency_limit,
            dispatch: DispatchSettings::default(),
            deadline: run.deadline(),
            max_failure_causes: run.max_failure_causes,
        }
    }
}

impl From<&ForwarderConfig> for CoordinatorConfig {
    fn from(config: &ForwarderConfig) -> Self {
        Self {
            concurrency_limit: config.run.concurrency_limit,
            dispatch: DispatchSettings::from(&config.dispatch),
            deadline: config.run.deadline(),
            max_failure_causes: config.run.max_failure_causes,
        }
    }
}

/// Fan-out coordinator
#[derive(Debug, Clone)]
pub struct Coordinator {
    config: CoordinatorConfig,
    extractor: RecordExtractor,
}

impl Coordinator {
    /// Create a coordinator using the default extraction pattern
    pub fn new(config: CoordinatorConfig) -> Result<Self, DispatcherError> {
        if config.concurrency_limit == 0 {
            return Err(DispatcherError::invalid_config(
                "concurrency_limit must be at least 1",
            ));
        }
        Ok(Self {
            config,
            extractor: RecordExtractor::default(),
        })
    }

    /// Create a coordinator from a full forwarder configuration
    pub fn from_config(config: &ForwarderConfig) -> Result<Self, DispatcherError> {
        let extractor = RecordExtractor::from_pattern(config.extract.pattern.as_deref())?;
        Ok(Self::new(CoordinatorConfig::from(config))?.with_extractor(extractor))
    }

    /// Replace the extractor
    pub fn with_extractor(mut self, extractor: RecordExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Open `path` and run over it
    ///
    /// An open failure is folded into the summary; nothing is dispatched.
    #[instrument(name = "coordinator_run_path", skip_all, fields(path = %path.display()))]
    pub async fn run_path<S>(&self, path: &Path, sink: Arc<S>) -> RunSummary
    where
        S: RecordSink + Send + Sync + 'static,
    {
        match LogSource::open(path).await {
            Ok(source) => self.run(source, sink).await,
            Err(e) => {
                error!(error = %e, "Log source unavailable");
                let summary = RunSummary::source_unavailable(e.to_failure());
                observability::record_run_summary(&summary);
                summary
            }
        }
    }

    /// Read `source` to the end and dispatch every error record to `sink`
    ///
    /// Returns once the source is consumed (or failed, or the deadline
    /// expired) and every scheduled dispatch has reported.
    #[instrument(
        name = "coordinator_run",
        skip_all,
        fields(
            origin = %source.origin(),
            sink = %sink.name(),
            concurrency_limit = self.config.concurrency_limit
        )
    )]
    pub async fn run<R, S>(&self, mut source: LogSource<R>, sink: Arc<S>) -> RunSummary
    where
        R: AsyncRead + Unpin,
        S: RecordSink + Send + Sync + 'static,
    {
        let deadline = self.config.deadline.and_then(|d| {
            let at = Instant::now().checked_add(d);
            if at.is_none() {
                warn!(deadline_secs = d.as_secs(), "Run deadline out of range, ignored");
            }
            at
        });
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency_limit));
        let metrics = Arc::new(CoordinatorMetrics::new());
        let settings = Arc::new(self.config.dispatch.clone());

        let (report_tx, report_rx) = mpsc::unbounded_channel();
        let aggregator = tokio::spawn(aggregate(report_rx, self.config.max_failure_causes));
        let mut tasks = JoinSet::new();

        let mut matched: u64 = 0;
        let mut source_failure = None;
        let mut deadline_exceeded = false;

        info!("Run started");

        loop {
            let line = match within(deadline, source.next_line()).await {
                Some(Ok(Some(line))) => line,
                Some(Ok(None)) => break,
                Some(Err(e)) => {
                    error!(error = %e, "Source read failed, scheduling stopped");
                    source_failure = Some(e.to_failure());
                    break;
                }
                None => {
                    deadline_exceeded = true;
                    break;
                }
            };

            let Some(record) = self.extractor.extract(&line) else {
                continue;
            };

            // Suspends the reader while the limit is saturated
            let permit = match within(deadline, Arc::clone(&semaphore).acquire_owned()).await {
                Some(Ok(permit)) => permit,
                Some(Err(e)) => {
                    error!(error = %e, "Dispatch semaphore closed");
                    break;
                }
                None => {
                    deadline_exceeded = true;
                    break;
                }
            };

            matched += 1;
            observability::record_record_matched();
            debug!(
                line = line.index,
                timestamp = %record.timestamp,
                message = %record.message,
                "Error record extracted"
            );

            let index = line.index;
            let report = ReportGuard::new(report_tx.clone(), index);
            let in_flight = metrics.enter();
            let sink = Arc::clone(&sink);
            let settings = Arc::clone(&settings);

            tasks.spawn(async move {
                // Dropped in reverse order: in-flight count falls before the permit is released
                let _permit = permit;
                let _in_flight = in_flight;

                let started = Instant::now();
                let outcome = dispatch(record, sink.as_ref(), &settings).await;
                let elapsed = started.elapsed();

                observability::record_dispatch(sink.name(), outcome.label(), elapsed);
                log_outcome(index, &outcome, elapsed);
                report.complete(outcome, elapsed);
            });

            while let Some(joined) = tasks.try_join_next() {
                log_join_error(joined);
            }
        }

        if deadline_exceeded {
            warn!(matched, "Run deadline expired, scheduling stopped");
        }

        // Aggregator ends once the last task's guard drops its sender
        drop(report_tx);
        while let Some(joined) = tasks.join_next().await {
            log_join_error(joined);
        }

        let mut summary = match aggregator.await {
            Ok(summary) => summary,
            Err(e) => {
                error!(error = %e, "Aggregator task failed");
                // Outcomes are lost, count every scheduled dispatch as failed
                RunSummary {
                    failed: matched,
                    ..RunSummary::new()
                }
            }
        };

        summary.lines_read = source.lines_read();
        summary.matched = matched;
        summary.deadline_exceeded = deadline_exceeded;
        summary.peak_in_flight = metrics.peak_in_flight();
        if let Some(failure) = source_failure {
            summary.record_source_failure(failure, self.config.max_failure_causes);
        }

        if !summary.is_consistent() {
            error!(
                matched = summary.matched,
                delivered = summary.delivered,
                failed = summary.failed,
                "Run summary counts disagree"
            );
        }

        observability::record_run_summary(&summary);
        info!(
            lines_read = summary.lines_read,
            matched = summary.matched,
            delivered = summary.delivered,
            failed = summary.failed,
            peak_in_flight = summary.peak_in_flight,
            "Run finished"
        );

        summary
    }
}

/// Await `fut` unless the deadline passes first
async fn within<F: Future>(deadline: Option<Instant>, fut: F) -> Option<F::Output> {
    match deadline {
        Some(deadline) => tokio::time::timeout_at(deadline, fut).await.ok(),
        None => Some(fut.await),
    }
}

fn log_outcome(line: u64, outcome: &DispatchOutcome, elapsed: Duration) {
    let elapsed_ms = elapsed.as_millis() as u64;
    match outcome {
        DispatchOutcome::Delivered { status, .. } => {
            info!(line, status, elapsed_ms, "Record delivered");
        }
        DispatchOutcome::RejectedByServer { status, body } => {
            warn!(line, status, body = %body, elapsed_ms, "Record rejected by server");
        }
        DispatchOutcome::TransportFailed { cause } => {
            warn!(line, cause = %cause, elapsed_ms, "Record transport failed");
        }
        DispatchOutcome::EncodingFailed { cause } => {
            warn!(line, cause = %cause, "Record encoding failed");
        }
    }
}

fn log_join_error(joined: Result<(), JoinError>) {
    if let Err(e) = joined {
        if e.is_panic() {
            error!(error = %e, "Dispatch task panicked");
        } else {
            warn!(error = %e, "Dispatch task cancelled");
        }
    }
}

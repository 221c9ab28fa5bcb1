//! Run report printing.

use std::time::Duration;

use contracts::FailureKind;
use dispatcher::ProcessResult;
use serde::Serialize;

/// Result of one run plus its wall-clock duration
#[derive(Debug, Clone, Serialize)]
pub struct RunStats {
    #[serde(flatten)]
    pub result: ProcessResult,

    #[serde(rename = "duration_secs", serialize_with = "as_secs_f64")]
    pub duration: Duration,
}

fn as_secs_f64<S: serde::Serializer>(duration: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(duration.as_secs_f64())
}

impl RunStats {
    /// Records dispatched per second
    pub fn throughput(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.result.summary.matched as f64 / secs
        } else {
            0.0
        }
    }

    /// Delivered share of dispatched records as percentage
    pub fn delivery_rate(&self) -> f64 {
        let summary = &self.result.summary;
        if summary.matched > 0 {
            (summary.delivered as f64 / summary.matched as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        let summary = &self.result.summary;

        println!("\n=== Forwarding Report ===\n");
        println!("Outcome: {} (exit code {})", self.result.outcome, self.result.exit_code);
        if let Some(ref failure) = summary.source_failure {
            println!("  {failure}");
        }

        println!("\nOverview");
        println!("  Duration: {:.2}s", self.duration.as_secs_f64());
        println!("  Lines read: {}", summary.lines_read);
        println!("  Error records: {}", summary.matched);
        println!(
            "  Delivered: {} ({:.1}%)",
            summary.delivered,
            self.delivery_rate()
        );
        println!("  Failed: {}", summary.failed);
        println!("  Throughput: {:.2} records/s", self.throughput());
        println!("  Peak in flight: {}", summary.peak_in_flight);
        if summary.deadline_exceeded {
            println!("  Deadline expired before the source was exhausted");
        }

        if summary.latency.count > 0 {
            let latency = &summary.latency;
            println!("\nLatency (ms)");
            println!(
                "  mean {:.2}  min {:.2}  max {:.2}  std dev {:.2}",
                latency.mean_ms, latency.min_ms, latency.max_ms, latency.std_dev_ms
            );
        }

        if !summary.failures.is_empty() {
            println!("\nFailures by kind");
            for kind in [
                FailureKind::Transport,
                FailureKind::Rejected,
                FailureKind::Encoding,
                FailureKind::Aborted,
                FailureKind::SourceRead,
            ] {
                let count = summary.failures_of(kind);
                if count > 0 {
                    println!("  {kind}: {count}");
                }
            }

            println!("\nFailure causes");
            for cause in &summary.failures {
                match cause.line {
                    Some(line) => println!("  - line {line} [{}] {}", cause.kind, cause.detail),
                    None => println!("  - [{}] {}", cause.kind, cause.detail),
                }
            }
            if summary.failures_truncated > 0 {
                println!("  ... {} more not shown", summary.failures_truncated);
            }
        }

        println!();
    }
}

//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试 (记录的 JSON 形态)
//! - 端到端测试：配置 -> 日志文件 -> 提取 -> HTTP 分发 -> 报告
//! - 并发上限与失败路径

#[cfg(test)]
mod contract_tests {
    use contracts::{DispatchOutcome, ErrorRecord};

    #[test]
    fn test_record_wire_shape() {
        let record = ErrorRecord::new("2024-01-01T00:00:00", "disk full");
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"timestamp":"2024-01-01T00:00:00","message":"disk full"}"#
        );
    }

    #[test]
    fn test_extract_then_encode() {
        let line = contracts::LogLine::new(0, "[] ERROR ");
        let record = ingestion::extract(&line).unwrap();
        let payload = dispatcher::encode(&record).unwrap();
        assert_eq!(payload.body, br#"{"timestamp":"","message":""}"#.to_vec());
    }

    #[test]
    fn test_outcome_labels() {
        let outcome = DispatchOutcome::TransportFailed {
            cause: "timeout".to_string(),
        };
        assert_eq!(outcome.label(), "transport_failed");
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::io::Write;
    use std::path::Path;
    use std::sync::Arc;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{FailureKind, ForwarderConfig};
    use dispatcher::{create_sink, report, Coordinator, ProcessResult, TerminalOutcome};
    use mockito::{Matcher, Server};
    use tempfile::NamedTempFile;

    const SCENARIO: [&str; 3] = [
        "[2024-01-01T00:00:00] ERROR disk full",
        "plain line",
        "ERROR no brackets",
    ];

    fn log_file(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file
    }

    fn config(source: &Path, url: &str, extra: &str) -> ForwarderConfig {
        let content = format!(
            r#"
[source]
path = "{}"

[sink]
name = "ingest"
sink_type = "http"
[sink.params]
url = "{url}"

{extra}
"#,
            source.display()
        );
        ConfigLoader::load_from_str(&content, ConfigFormat::Toml).unwrap()
    }

    /// Config -> sink + coordinator -> run -> report, as the binary does it
    async fn forward(config: &ForwarderConfig) -> ProcessResult {
        let sink = create_sink(&config.sink).unwrap();
        let coordinator = Coordinator::from_config(config).unwrap();
        let summary = coordinator
            .run_path(&config.source.path, Arc::new(sink))
            .await;
        report(summary)
    }

    fn closed_port_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}/posts")
    }

    #[tokio::test]
    async fn test_e2e_single_record_delivered() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/posts")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(serde_json::json!({
                "timestamp": "2024-01-01T00:00:00",
                "message": "disk full"
            })))
            .with_status(201)
            .with_body(r#"{"id":101}"#)
            .expect(1)
            .create_async()
            .await;

        let log = log_file(&SCENARIO);
        let result = forward(&config(log.path(), &format!("{}/posts", server.url()), "")).await;

        assert_eq!(result.outcome, TerminalOutcome::Completed);
        assert_eq!(result.exit_code, 0);
        let summary = &result.summary;
        assert_eq!(summary.lines_read, 3);
        assert_eq!(
            (summary.matched, summary.delivered, summary.failed),
            (1, 1, 0)
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_e2e_transport_failure() {
        let log = log_file(&SCENARIO);
        let result = forward(&config(log.path(), &closed_port_url(), "")).await;

        assert_eq!(result.outcome, TerminalOutcome::Completed);
        let summary = &result.summary;
        assert_eq!(
            (summary.matched, summary.delivered, summary.failed),
            (1, 0, 1)
        );
        assert_eq!(summary.failures[0].kind, FailureKind::Transport);
    }

    #[tokio::test]
    async fn test_e2e_missing_source_sends_nothing() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/posts")
            .with_status(201)
            .expect(0)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let result = forward(&config(
            &dir.path().join("absent.log"),
            &format!("{}/posts", server.url()),
            "",
        ))
        .await;

        assert_eq!(result.outcome, TerminalOutcome::SourceNotFound);
        assert_eq!(result.exit_code, 1);
        assert_eq!(result.summary.matched, 0);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_e2e_every_dispatch_rejected() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/posts")
            .with_status(500)
            .with_body("Internal Server Error")
            .expect(3)
            .create_async()
            .await;

        let log = log_file(&[
            "[t1] ERROR one",
            "[t2] ERROR two",
            "noise",
            "[t3] ERROR three",
        ]);
        let result = forward(&config(log.path(), &format!("{}/posts", server.url()), "")).await;

        assert_eq!(result.outcome, TerminalOutcome::Completed);
        let summary = &result.summary;
        assert_eq!(summary.matched, 3);
        assert_eq!(summary.failed, 3);
        assert_eq!(summary.failures_of(FailureKind::Rejected), 3);
        assert!(summary
            .failures
            .iter()
            .all(|c| c.detail == "status 500: Internal Server Error"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_e2e_concurrency_limit_respected() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/posts")
            .with_status(201)
            .expect(40)
            .create_async()
            .await;

        let lines: Vec<String> = (0..40).map(|i| format!("[t{i}] ERROR failure {i}")).collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let log = log_file(&refs);

        let result = forward(&config(
            log.path(),
            &format!("{}/posts", server.url()),
            "[run]\nconcurrency_limit = 4\n",
        ))
        .await;

        let summary = &result.summary;
        assert_eq!(summary.delivered, 40);
        assert!(summary.peak_in_flight >= 1);
        assert!(summary.peak_in_flight <= 4);
        assert!(summary.is_consistent());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_e2e_success_status_is_exact() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/posts")
            .with_status(201)
            .create_async()
            .await;

        let log = log_file(&SCENARIO);
        let result = forward(&config(
            log.path(),
            &format!("{}/posts", server.url()),
            "[dispatch]\nsuccess_status = 200\n",
        ))
        .await;

        let summary = &result.summary;
        assert_eq!(summary.delivered, 0);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.failures[0].detail, "status 201");
    }

    #[tokio::test]
    async fn test_e2e_invalid_utf8_mid_stream() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/posts")
            .with_status(201)
            .expect(1)
            .create_async()
            .await;

        let mut log = NamedTempFile::new().unwrap();
        log.write_all(b"[t1] ERROR before\n\xff\xfe broken\n[t2] ERROR after\n")
            .unwrap();

        let result = forward(&config(log.path(), &format!("{}/posts", server.url()), "")).await;

        assert_eq!(result.outcome, TerminalOutcome::SourceReadError);
        assert_eq!(result.exit_code, 2);
        assert_eq!(result.summary.delivered, 1);
        assert_eq!(result.summary.failures_of(FailureKind::SourceRead), 1);
        mock.assert_async().await;
    }
}

//! LogSource - sequential line reader over a byte stream

use std::io::ErrorKind;
use std::path::Path;

use contracts::LogLine;
use metrics::counter;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};
use tracing::{debug, instrument};

use crate::error::{Result, SourceError};

/// Single-pass line source
///
/// Holds at most one line in memory, so arbitrarily large logs are fine.
/// Line terminators (`\n` and `\r\n`) are stripped.
pub struct LogSource<R> {
    origin: String,
    lines: Lines<BufReader<R>>,
    next_index: u64,
}

impl LogSource<File> {
    /// Open a log file
    ///
    /// # Errors
    /// `SourceError::NotFound` if the path does not exist,
    /// `SourceError::Open` for any other open failure.
    #[instrument(name = "log_source_open", skip(path), fields(path = %path.display()))]
    pub async fn open(path: &Path) -> Result<Self> {
        let origin = path.display().to_string();
        let file = File::open(path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => SourceError::NotFound {
                path: origin.clone(),
            },
            _ => SourceError::Open {
                path: origin.clone(),
                source: e,
            },
        })?;

        debug!(path = %origin, "Log source opened");
        Ok(Self::from_reader(file, origin))
    }
}

impl<R: AsyncRead + Unpin> LogSource<R> {
    /// Wrap any byte stream
    pub fn from_reader(reader: R, origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            lines: BufReader::new(reader).lines(),
            next_index: 0,
        }
    }

    /// Source description used in diagnostics
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Number of lines produced so far
    pub fn lines_read(&self) -> u64 {
        self.next_index
    }

    /// Read the next line, `Ok(None)` at end of stream
    ///
    /// # Errors
    /// `SourceError::Read` carrying the index of the line that failed.
    pub async fn next_line(&mut self) -> Result<Option<LogLine>> {
        let index = self.next_index;
        match self.lines.next_line().await {
            Ok(Some(text)) => {
                self.next_index += 1;
                counter!("errlog_forwarder_lines_read_total").increment(1);
                Ok(Some(LogLine { index, text }))
            }
            Ok(None) => Ok(None),
            Err(source) => Err(SourceError::Read {
                origin: self.origin.clone(),
                line: index,
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::SourceFailure;
    use std::io::Write;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::ReadBuf;

    /// Yields `data` then fails every subsequent read
    struct FailingReader {
        data: Vec<u8>,
        served: bool,
    }

    impl AsyncRead for FailingReader {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            if !self.served {
                self.served = true;
                let data = std::mem::take(&mut self.data);
                buf.put_slice(&data);
                return Poll::Ready(Ok(()));
            }
            Poll::Ready(Err(std::io::Error::other("disk went away")))
        }
    }

    #[tokio::test]
    async fn test_lines_are_indexed_in_order() {
        let mut source = LogSource::from_reader(&b"first\r\nsecond\n\nlast"[..], "memory");

        let mut lines = Vec::new();
        while let Some(line) = source.next_line().await.unwrap() {
            lines.push(line);
        }

        assert_eq!(
            lines,
            vec![
                LogLine::new(0, "first"),
                LogLine::new(1, "second"),
                LogLine::new(2, ""),
                LogLine::new(3, "last"),
            ]
        );
        assert_eq!(source.lines_read(), 4);
        assert!(source.next_line().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_open_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.log");

        let err = LogSource::open(&path).await.err().unwrap();
        assert!(matches!(err, SourceError::NotFound { .. }));
        assert!(matches!(err.to_failure(), SourceFailure::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_open_existing_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[ts] ERROR one").unwrap();
        writeln!(file, "plain").unwrap();

        let mut source = LogSource::open(file.path()).await.unwrap();
        assert_eq!(source.next_line().await.unwrap().unwrap().text, "[ts] ERROR one");
        assert_eq!(source.next_line().await.unwrap().unwrap().text, "plain");
        assert!(source.next_line().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_read_error() {
        let mut source = LogSource::from_reader(&b"ok\n\xff\xfe\n"[..], "memory");

        assert_eq!(source.next_line().await.unwrap().unwrap().text, "ok");
        let err = source.next_line().await.unwrap_err();
        match err {
            SourceError::Read { line, .. } => assert_eq!(line, 1),
            other => panic!("expected read error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_io_error_after_data() {
        let reader = FailingReader {
            data: b"[a] ERROR one\n".to_vec(),
            served: false,
        };
        let mut source = LogSource::from_reader(reader, "failing");

        assert_eq!(source.next_line().await.unwrap().unwrap().index, 0);
        let err = source.next_line().await.unwrap_err();
        let failure = err.to_failure();
        assert_eq!(
            failure,
            SourceFailure::Read {
                line: Some(1),
                message: "disk went away".to_string(),
            }
        );
    }
}

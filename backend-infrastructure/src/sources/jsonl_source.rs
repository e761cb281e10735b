use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use backend_domain::{EngineError, EventSource, SourceConfig, SourcePoll, SourceRecord};
use tokio::fs::{self, File};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

/// Tails a JSON-lines file of `SourceRecord`s.
///
/// With `follow` set, end of file means "nothing yet" and the file is polled
/// again; otherwise it ends the stream. An unterminated trailing line is held
/// back until its newline arrives (or, without `follow`, read as the last
/// record). Shrinking the file below what has been read is a source fault.
pub struct JsonLinesSource {
    path: PathBuf,
    follow: bool,
    reader: Option<BufReader<File>>,
    offset: u64,
    line_no: u64,
    pending: Vec<u8>,
}

impl JsonLinesSource {
    pub fn new(path: impl Into<PathBuf>, follow: bool) -> Self {
        Self {
            path: path.into(),
            follow,
            reader: None,
            offset: 0,
            line_no: 0,
            pending: Vec::new(),
        }
    }

    pub fn from_config(config: &SourceConfig) -> Self {
        Self::new(&config.events_path, config.follow_events)
    }

    /// Returns `false` while the file does not exist yet in follow mode.
    async fn ensure_open(&mut self) -> Result<bool, EngineError> {
        if self.reader.is_some() {
            return Ok(true);
        }
        match File::open(&self.path).await {
            Ok(file) => {
                info!(path = %self.path.display(), "event file opened");
                self.reader = Some(BufReader::new(file));
                Ok(true)
            }
            Err(err) if err.kind() == ErrorKind::NotFound && self.follow => {
                debug!(path = %self.path.display(), "event file not present yet");
                Ok(false)
            }
            Err(err) => Err(EngineError::SourceFault(format!(
                "cannot open {}: {}",
                self.path.display(),
                err
            ))),
        }
    }

    async fn check_truncation(&self) -> Result<(), EngineError> {
        let len = fs::metadata(&self.path)
            .await
            .map_err(|err| {
                EngineError::SourceFault(format!("cannot stat {}: {}", self.path.display(), err))
            })?
            .len();
        if len < self.offset {
            return Err(EngineError::SourceFault(format!(
                "{} truncated to {} bytes after {} bytes were read",
                self.path.display(),
                len,
                self.offset
            )));
        }
        Ok(())
    }

    /// `Ok(None)` for blank lines.
    fn decode(&self, line: &[u8]) -> Result<Option<SourceRecord>, EngineError> {
        let text = std::str::from_utf8(line)
            .map_err(|err| EngineError::malformed(format!("line {}: {}", self.line_no, err)))?;
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        serde_json::from_str(text)
            .map(Some)
            .map_err(|err| EngineError::malformed(format!("line {}: {}", self.line_no, err)))
    }
}

#[async_trait]
impl EventSource for JsonLinesSource {
    async fn poll_next(&mut self) -> Result<SourcePoll, EngineError> {
        if !self.ensure_open().await? {
            return Ok(SourcePoll::Pending);
        }

        loop {
            let Some(reader) = self.reader.as_mut() else {
                return Ok(SourcePoll::Pending);
            };
            // Bytes read before a cancellation stay in `pending`.
            let read = reader
                .read_until(b'\n', &mut self.pending)
                .await
                .map_err(|err| {
                    EngineError::SourceFault(format!("read {}: {}", self.path.display(), err))
                })?;

            if read == 0 {
                self.check_truncation().await?;
                if self.follow {
                    return Ok(SourcePoll::Pending);
                }
                if self.pending.is_empty() {
                    return Ok(SourcePoll::Exhausted);
                }
                let line = std::mem::take(&mut self.pending);
                self.line_no += 1;
                return Ok(match self.decode(&line)? {
                    Some(record) => SourcePoll::Record(record),
                    None => SourcePoll::Exhausted,
                });
            }

            self.offset += read as u64;
            if self.pending.last() != Some(&b'\n') {
                continue;
            }
            let line = std::mem::take(&mut self.pending);
            self.line_no += 1;
            if let Some(record) = self.decode(&line)? {
                return Ok(SourcePoll::Record(record));
            }
        }
    }

    fn describe(&self) -> String {
        format!("jsonl:{}", self.path.display())
    }
}

//! Output records and the sinks that deliver them.
//!
//! Each processed frame becomes one JSON object on its own line:
//! `{"rep_count": <int>, "frame": "<base64 JPEG>"}`.

use crate::error::{RepcountError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// One emitted frame: the current count and the annotated JPEG.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub rep_count: u64,
    /// Standard base64 (with padding) of the JPEG bytes.
    pub frame: String,
}

impl OutputRecord {
    pub fn new(rep_count: u64, jpeg: &[u8]) -> Self {
        Self {
            rep_count,
            frame: STANDARD.encode(jpeg),
        }
    }

    /// Serialises the record as a single line without the trailing newline.
    pub fn to_json_line(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decodes the JPEG bytes carried by the record.
    pub fn jpeg(&self) -> Result<Vec<u8>> {
        STANDARD
            .decode(&self.frame)
            .map_err(|e| RepcountError::Other(format!("invalid base64 frame: {}", e)))
    }
}

/// Pluggable record output handler for the pipeline.
/// Pairs with `FrameSource` for input.
pub trait RecordSink: Send {
    /// Deliver one record. Called once per processed frame, in order.
    fn handle(&mut self, record: &OutputRecord) -> Result<()>;

    /// Called when the pipeline stops.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }

    /// Name for logging/debugging.
    fn name(&self) -> &'static str {
        "sink"
    }
}

/// Writes newline-delimited records to any writer, flushing after each one.
pub struct WriterSink<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> RecordSink for WriterSink<W> {
    fn handle(&mut self, record: &OutputRecord) -> Result<()> {
        let line = record.to_json_line()?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        // Consumers read line by line, so every record leaves immediately.
        self.writer.flush()?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "writer"
    }
}

/// Pipe mode sink: writes records to stdout.
pub struct StdoutSink {
    inner: WriterSink<std::io::Stdout>,
}

impl StdoutSink {
    pub fn new() -> Self {
        Self {
            inner: WriterSink::new(std::io::stdout()),
        }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordSink for StdoutSink {
    fn handle(&mut self, record: &OutputRecord) -> Result<()> {
        self.inner.handle(record)
    }

    fn finish(&mut self) -> Result<()> {
        self.inner.finish()
    }

    fn name(&self) -> &'static str {
        "stdout"
    }
}

/// Keeps every record in memory, for tests and library use.
#[derive(Debug, Default)]
pub struct CollectorSink {
    records: Vec<OutputRecord>,
    finished: bool,
}

impl CollectorSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[OutputRecord] {
        &self.records
    }

    /// The `rep_count` of every record, in emission order.
    pub fn counts(&self) -> Vec<u64> {
        self.records.iter().map(|r| r.rep_count).collect()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl RecordSink for CollectorSink {
    fn handle(&mut self, record: &OutputRecord) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "collector"
    }
}

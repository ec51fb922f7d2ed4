//! Sink module - JSON-lines output for readings

use std::io::Write;

use tracing::debug;

use crate::config::OutputFormat;
use crate::error::SinkError;
use crate::ipc::ReadingReceiver;
use crate::sensor::Reading;

pub struct ReadingSink<W: Write> {
    writer: W,
    format: OutputFormat,
    written: u64,
}

impl<W: Write> ReadingSink<W> {
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self {
            writer,
            format,
            written: 0,
        }
    }

    /// Write one reading as a single JSON line and flush.
    pub fn write(&mut self, reading: &Reading) -> Result<(), SinkError> {
        match self.format {
            OutputFormat::Map => serde_json::to_writer(&mut self.writer, reading)?,
            OutputFormat::Columns => serde_json::to_writer(&mut self.writer, &reading.to_columns())?,
        }
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.written += 1;
        Ok(())
    }

    /// Consume readings until every sender is gone.
    pub fn drain(&mut self, rx: &ReadingReceiver) -> Result<u64, SinkError> {
        let start = self.written;
        for reading in rx.iter() {
            self.write(&reading)?;
        }
        debug!(written = self.written - start, "reading channel closed");
        Ok(self.written - start)
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

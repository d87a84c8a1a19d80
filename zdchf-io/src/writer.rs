//! File writers for filter output.

use crate::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use zdchf_core::{Decision, EventRecord};

/// Header line of the decision CSV.
pub const DECISION_CSV_HEADER: &str = "run,lumi,event,zdc_sum,hf_sum,metric,accepted";

/// Writer for per-event filter output.
///
/// Writes decisions as CSV or JSON Lines, and accepted events back out in
/// the input JSON Lines format.
pub struct OutputWriter<W: Write> {
    writer: BufWriter<W>,
}

impl OutputWriter<File> {
    /// Creates a new file writer.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(file))
    }
}

impl<W: Write> OutputWriter<W> {
    /// Wraps any byte sink.
    pub fn new(inner: W) -> Self {
        Self {
            writer: BufWriter::new(inner),
        }
    }

    /// Writes decisions as CSV, optionally preceded by the header line.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_decisions_csv(&mut self, decisions: &[Decision], write_header: bool) -> Result<()> {
        if write_header {
            writeln!(self.writer, "{DECISION_CSV_HEADER}")?;
        }

        for d in decisions {
            writeln!(
                self.writer,
                "{},{},{},{},{},{},{}",
                d.id.run,
                d.id.lumi,
                d.id.event,
                d.metric.zdc_sum,
                d.metric.hf_sum,
                d.metric.value,
                d.accepted
            )?;
        }

        Ok(())
    }

    /// Writes decisions as JSON Lines.
    ///
    /// # Errors
    /// Returns an error if encoding or writing fails.
    pub fn write_decisions_jsonl(&mut self, decisions: &[Decision]) -> Result<()> {
        for d in decisions {
            serde_json::to_writer(&mut self.writer, d)?;
            self.writer.write_all(b"\n")?;
        }
        Ok(())
    }

    /// Writes events as JSON Lines, in the same format the reader accepts.
    ///
    /// # Errors
    /// Returns an error if encoding or writing fails.
    pub fn write_events_jsonl<'a, I>(&mut self, events: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a EventRecord>,
    {
        for event in events {
            serde_json::to_writer(&mut self.writer, event)?;
            self.writer.write_all(b"\n")?;
        }
        Ok(())
    }

    /// Flushes the writer.
    ///
    /// # Errors
    /// Returns an error if flushing fails.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

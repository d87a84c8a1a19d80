//! JSON Lines event readers.
//!

use crate::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines, Read};
use std::path::{Path, PathBuf};
use zdchf_core::EventRecord;

/// Streaming reader over a JSON Lines event file.
///
/// Each non-blank line holds one [`EventRecord`]. Events are decoded lazily,
/// so files larger than memory can be filtered.
pub struct EventReader<R> {
    lines: Lines<BufReader<R>>,
    line_number: usize,
}

impl<R: Read> EventReader<R> {
    /// Wraps any byte source.
    pub fn new(inner: R) -> Self {
        Self {
            lines: BufReader::new(inner).lines(),
            line_number: 0,
        }
    }

    /// Reads every remaining event into memory.
    ///
    /// # Errors
    /// Returns the first read or decode error.
    pub fn read_all(self) -> Result<Vec<EventRecord>> {
        self.collect()
    }
}

impl<R: Read> Iterator for EventReader<R> {
    type Item = Result<EventRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(err) => return Some(Err(err.into())),
            };
            self.line_number += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            return Some(
                serde_json::from_str(trimmed).map_err(|err| Error::InvalidFormat {
                    line: self.line_number,
                    message: err.to_string(),
                }),
            );
        }
    }
}

/// An event file on disk.
pub struct EventFileReader {
    path: PathBuf,
    file_size: u64,
}

impl EventFileReader {
    /// Opens an event file.
    ///
    /// # Errors
    /// Returns an error if the file does not exist or its metadata cannot be read.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let metadata = std::fs::metadata(&path)?;
        Ok(Self {
            path: path.as_ref().to_path_buf(),
            file_size: metadata.len(),
        })
    }

    /// Path of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the file size in bytes.
    #[must_use]
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Returns a lazy stream of events.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened.
    pub fn events(&self) -> Result<EventReader<File>> {
        let file = File::open(&self.path)?;
        Ok(EventReader::new(file))
    }

    /// Reads all events of the file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or any line is malformed.
    pub fn read_all(&self) -> Result<Vec<EventRecord>> {
        self.events()?.read_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use zdchf_core::{EventId, EventSource, InputTag};

    const TWO_EVENTS: &str = r#"{"id":{"run":1,"lumi":1,"event":10},"centrality":{"hiCentrality":{"zdcSum":350000.0}},"candidates":{"packedPFCandidates":[{"speciesCode":1,"pseudorapidity":4.0,"transverseEnergy":4500.0}]}}

{"id":{"run":1,"lumi":1,"event":11},"centrality":{"hiCentrality":{"zdcSum":0.0}},"candidates":{"packedPFCandidates":[]}}
"#;

    #[test]
    fn test_reads_events_and_skips_blank_lines() {
        let events = EventReader::new(TWO_EVENTS.as_bytes()).read_all().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id, EventId::new(1, 1, 10));
        assert_eq!(events[1].id, EventId::new(1, 1, 11));

        let tag: InputTag = "packedPFCandidates".parse().unwrap();
        assert_eq!(events[0].candidates(&tag).unwrap().len(), 1);
    }

    #[test]
    fn test_reports_line_of_bad_event() {
        let data = format!("{TWO_EVENTS}\n{{not json}}\n");
        let mut reader = EventReader::new(data.as_bytes());
        assert!(reader.next().unwrap().is_ok());
        assert!(reader.next().unwrap().is_ok());

        match reader.next().unwrap() {
            Err(Error::InvalidFormat { line, .. }) => assert_eq!(line, 5),
            other => panic!("expected InvalidFormat, got {other:?}"),
        }
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_event_file_reader() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(TWO_EVENTS.as_bytes()).unwrap();
        file.flush().unwrap();

        let reader = EventFileReader::open(file.path()).unwrap();
        assert_eq!(reader.file_size(), TWO_EVENTS.len() as u64);
        assert_eq!(reader.read_all().unwrap().len(), 2);
    }

    #[test]
    fn test_empty_file() {
        let file = NamedTempFile::new().unwrap();
        let reader = EventFileReader::open(file.path()).unwrap();
        assert!(reader.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_missing_file() {
        assert!(EventFileReader::open("/nonexistent/events.jsonl").is_err());
    }
}

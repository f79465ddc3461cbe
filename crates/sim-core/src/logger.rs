//! Match Logger
//!
//! Append-only JSONL logging of match events, for offline inspection of
//! showcase games. Core logic never reads these files back.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use sim_events::MatchEvent;

/// Writes match events to a JSONL file, one event per line.
pub struct MatchLogger {
    writer: Option<BufWriter<File>>,
    event_count: u64,
}

impl MatchLogger {
    /// Create a new logger writing to the specified path.
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            writer: Some(BufWriter::new(file)),
            event_count: 0,
        })
    }

    /// Create a logger that discards events (for testing).
    pub fn null() -> Self {
        Self {
            writer: None,
            event_count: 0,
        }
    }

    /// Number of events logged so far.
    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    /// Log a single event.
    pub fn log(&mut self, event: &MatchEvent) -> std::io::Result<()> {
        self.event_count += 1;
        if let Some(ref mut writer) = self.writer {
            let json = serde_json::to_string(event)?;
            writeln!(writer, "{}", json)?;
        }
        Ok(())
    }

    /// Log a batch of events in order.
    pub fn log_batch(&mut self, events: &[MatchEvent]) -> std::io::Result<()> {
        for event in events {
            self.log(event)?;
        }
        Ok(())
    }

    /// Flush the buffer to disk.
    pub fn flush(&mut self) -> std::io::Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for MatchLogger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            eprintln!("Warning: failed to flush match logger: {}", e);
        }
    }
}

//! Play logger
//!
//! Append-only event log plus one run summary per process. Every event is
//! written and flushed immediately, so a crash loses at most the event being
//! written. Write failures are reported through `tracing` and never reach the
//! playback path.

use airtime_core::{EventKind, PlayLogEntry, RunSummary};
use chrono::{Local, NaiveDateTime};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Append-only play log and run-wide counters
pub struct PlayLogger {
    sink: Option<Box<dyn Write + Send>>,
    summary: RunSummary,
    finished: bool,
    write_failures: u64,
}

impl PlayLogger {
    /// Open `path` in append mode, creating it if needed
    ///
    /// If the file can not be opened the logger still counts plays but
    /// writes nothing.
    pub fn open(path: &Path) -> Self {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                tracing::debug!("Play log: {}", path.display());
                Self::with_writer(file)
            }
            Err(e) => {
                tracing::warn!(
                    "Could not open play log {}: {} (continuing without it)",
                    path.display(),
                    e
                );
                Self::disabled()
            }
        }
    }

    /// Log into an arbitrary writer
    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            sink: Some(Box::new(writer)),
            summary: RunSummary::new(now()),
            finished: false,
            write_failures: 0,
        }
    }

    /// Count plays without writing anything
    pub fn disabled() -> Self {
        Self {
            sink: None,
            summary: RunSummary::new(now()),
            finished: false,
            write_failures: 0,
        }
    }

    /// Append one event
    pub fn record(&mut self, kind: EventKind, path: &Path, extra: Option<String>) {
        let entry = PlayLogEntry::new(now(), kind, path, extra);
        tracing::debug!("{}", entry.to_line());
        self.write_block(&format!("{}\n", entry.to_line()));
    }

    /// Append a `PLAY` event and count it
    pub fn record_play(&mut self, path: &Path) {
        self.summary.record_play(path);
        self.record(EventKind::Play, path, None);
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Number of log writes that failed so far
    pub fn write_failures(&self) -> u64 {
        self.write_failures
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Close the run and write the summary block
    ///
    /// Only the first call writes; later calls return `None`.
    pub fn finish(&mut self) -> Option<&RunSummary> {
        if self.finished {
            return None;
        }
        self.finished = true;
        self.summary.run_end = Some(now());

        let block = self.summary.render();
        self.write_block(&block);
        tracing::info!(
            "Run finished: {} play(s) across {} file(s)",
            self.summary.total_plays,
            self.summary.per_file_counts.len()
        );
        if self.write_failures > 0 {
            tracing::warn!("{} play log write(s) failed during this run", self.write_failures);
        }
        Some(&self.summary)
    }

    fn write_block(&mut self, text: &str) {
        let Some(sink) = self.sink.as_mut() else {
            return;
        };

        let result = sink
            .write_all(text.as_bytes())
            .and_then(|()| sink.flush());

        if let Err(e) = result {
            self.write_failures += 1;
            tracing::warn!("Play log write failed: {}", e);
        }
    }
}

impl Drop for PlayLogger {
    fn drop(&mut self) {
        self.finish();
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

//! Play log events and the per-run summary

use super::schedule::TIMESTAMP_FORMAT;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Kinds of events written to the play log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A schedule entry was loaded
    ScheduleEntry,
    /// A schedule window opened and its file was requested
    ScheduleStart,
    /// A schedule window closed (or was interrupted)
    ScheduleStop,
    /// About to start a file
    PlayBegin,
    /// A file started successfully
    Play,
    /// A file failed to start or died unexpectedly
    PlayFail,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ScheduleEntry => "SCHEDULE_ENTRY",
            Self::ScheduleStart => "SCHEDULE_START",
            Self::ScheduleStop => "SCHEDULE_STOP",
            Self::PlayBegin => "PLAY_BEGIN",
            Self::Play => "PLAY",
            Self::PlayFail => "PLAY_FAIL",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of the play log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayLogEntry {
    pub timestamp: NaiveDateTime,
    pub kind: EventKind,
    pub file_path: PathBuf,
    pub extra: Option<String>,
}

impl PlayLogEntry {
    pub fn new(
        timestamp: NaiveDateTime,
        kind: EventKind,
        file_path: impl Into<PathBuf>,
        extra: Option<String>,
    ) -> Self {
        Self {
            timestamp,
            kind,
            file_path: file_path.into(),
            extra,
        }
    }

    /// `timestamp | KIND | path | detail`, detail omitted when absent
    pub fn to_line(&self) -> String {
        let mut line = format!(
            "{} | {} | {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.kind,
            self.file_path.display()
        );
        if let Some(extra) = self.extra.as_deref().filter(|e| !e.is_empty()) {
            line.push_str(" | ");
            line.push_str(extra);
        }
        line
    }
}

/// Play counts accumulated over one process run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub run_start: NaiveDateTime,
    pub run_end: Option<NaiveDateTime>,
    pub total_plays: u64,
    pub per_file_counts: BTreeMap<PathBuf, u64>,
}

impl RunSummary {
    pub fn new(run_start: NaiveDateTime) -> Self {
        Self {
            run_start,
            run_end: None,
            total_plays: 0,
            per_file_counts: BTreeMap::new(),
        }
    }

    /// Count one successful play
    pub fn record_play(&mut self, path: &Path) {
        self.total_plays += 1;
        *self.per_file_counts.entry(path.to_path_buf()).or_insert(0) += 1;
    }

    pub fn count_for(&self, path: &Path) -> u64 {
        self.per_file_counts.get(path).copied().unwrap_or(0)
    }

    /// Multi-line block appended to the play log at exit
    pub fn render(&self) -> String {
        let mut out = String::from("===== RUN SUMMARY =====\n");
        let _ = writeln!(out, "run_start: {}", self.run_start.format(TIMESTAMP_FORMAT));
        match self.run_end {
            Some(end) => {
                let _ = writeln!(out, "run_end: {}", end.format(TIMESTAMP_FORMAT));
            }
            None => out.push_str("run_end: -\n"),
        }
        let _ = writeln!(out, "total_plays: {}", self.total_plays);
        for (path, count) in &self.per_file_counts {
            let _ = writeln!(out, "  {}: {}", path.display(), count);
        }
        out.push_str("=======================\n");
        out
    }
}

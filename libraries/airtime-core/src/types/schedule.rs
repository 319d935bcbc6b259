//! Schedule entries and ordered schedule sets

use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

/// Timestamp layout used by schedule files and the play log
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A time window bound to one audio file
///
/// The window is half-open: `start_time` is inclusive and `stop_time` is
/// exclusive. Entries are immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEntry {
    start_time: NaiveDateTime,
    stop_time: NaiveDateTime,
    resolved_path: PathBuf,
}

impl ScheduleEntry {
    /// Create an entry, rejecting empty or inverted windows
    pub fn new(
        start_time: NaiveDateTime,
        stop_time: NaiveDateTime,
        resolved_path: impl Into<PathBuf>,
    ) -> Result<Self, String> {
        if start_time >= stop_time {
            return Err(format!(
                "start_time ({}) must be before stop_time ({})",
                start_time.format(TIMESTAMP_FORMAT),
                stop_time.format(TIMESTAMP_FORMAT)
            ));
        }

        Ok(Self {
            start_time,
            stop_time,
            resolved_path: resolved_path.into(),
        })
    }

    pub fn start_time(&self) -> NaiveDateTime {
        self.start_time
    }

    pub fn stop_time(&self) -> NaiveDateTime {
        self.stop_time
    }

    /// Absolute path of the audio file
    pub fn resolved_path(&self) -> &Path {
        &self.resolved_path
    }

    /// Whether `now` falls inside `[start_time, stop_time)`
    pub fn contains(&self, now: NaiveDateTime) -> bool {
        self.start_time <= now && now < self.stop_time
    }
}

/// Ordered schedule, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleSet {
    entries: Vec<ScheduleEntry>,
}

impl ScheduleSet {
    pub fn new(entries: Vec<ScheduleEntry>) -> Self {
        Self { entries }
    }

    /// Index of the entry that should be playing at `now`
    ///
    /// Overlaps resolve first-match-wins: the earliest-declared entry whose
    /// window contains `now`.
    pub fn active_at(&self, now: NaiveDateTime) -> Option<usize> {
        self.entries.iter().position(|entry| entry.contains(now))
    }

    /// Earliest window opening strictly after `now`
    pub fn next_start_after(&self, now: NaiveDateTime) -> Option<(usize, NaiveDateTime)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.start_time > now)
            .min_by_key(|(index, entry)| (entry.start_time, *index))
            .map(|(index, entry)| (index, entry.start_time))
    }

    pub fn get(&self, index: usize) -> Option<&ScheduleEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScheduleEntry> {
        self.entries.iter()
    }
}

impl std::ops::Index<usize> for ScheduleSet {
    type Output = ScheduleEntry;

    fn index(&self, index: usize) -> &ScheduleEntry {
        &self.entries[index]
    }
}

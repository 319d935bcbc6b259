//! Schedule file loading
//!
//! The file is JSON:
//!
//! ```json
//! {"schedules": [
//!     {"start_time": "2024-01-01 08:00:00", "stop_time": "2024-01-01 09:00:00", "path": "morning.mp3"}
//! ]}
//! ```
//!
//! Relative `path` values resolve against the directory containing the
//! schedule file. Every entry is validated up front; one bad entry rejects
//! the whole file.

use crate::error::ConfigError;
use crate::types::{ScheduleEntry, ScheduleSet, TIMESTAMP_FORMAT};
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct ScheduleFile {
    schedules: Vec<RawEntry>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    start_time: Option<String>,
    stop_time: Option<String>,
    path: Option<String>,
}

/// Read and validate a schedule file
pub fn load_schedule(path: &Path) -> Result<ScheduleSet, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ScheduleRead {
        path: path.to_path_buf(),
        source,
    })?;

    let absolute = absolutize(path).map_err(|source| ConfigError::ScheduleRead {
        path: path.to_path_buf(),
        source,
    })?;
    let base_dir = absolute
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("/"));

    let schedule = parse_schedule(&text, &base_dir, path)?;
    tracing::info!(
        "Loaded {} schedule entr{} from {}",
        schedule.len(),
        if schedule.len() == 1 { "y" } else { "ies" },
        path.display()
    );
    Ok(schedule)
}

/// Parse schedule JSON, resolving relative paths against `base_dir`
///
/// `source` is only used in error messages.
pub fn parse_schedule(
    text: &str,
    base_dir: &Path,
    source: &Path,
) -> Result<ScheduleSet, ConfigError> {
    let file: ScheduleFile =
        serde_json::from_str(text).map_err(|source_err| ConfigError::ScheduleParse {
            path: source.to_path_buf(),
            source: source_err,
        })?;

    if file.schedules.is_empty() {
        return Err(ConfigError::EmptySchedule(source.to_path_buf()));
    }

    let entries = file
        .schedules
        .into_iter()
        .enumerate()
        .map(|(index, raw)| {
            build_entry(raw, base_dir)
                .map_err(|reason| ConfigError::InvalidEntry { index, reason })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ScheduleSet::new(entries))
}

/// Resolve a schedule `path` value against the schedule directory
///
/// Absolute paths are returned unchanged.
pub fn resolve_entry_path(base_dir: &Path, raw: &str) -> PathBuf {
    let candidate = Path::new(raw);
    if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        base_dir.join(candidate)
    }
}

fn build_entry(raw: RawEntry, base_dir: &Path) -> Result<ScheduleEntry, String> {
    let start = parse_timestamp("start_time", raw.start_time.as_deref())?;
    let stop = parse_timestamp("stop_time", raw.stop_time.as_deref())?;
    let path = match raw.path.as_deref() {
        Some(p) if !p.trim().is_empty() => p,
        Some(_) => return Err("path is empty".to_string()),
        None => return Err("missing field `path`".to_string()),
    };

    ScheduleEntry::new(start, stop, resolve_entry_path(base_dir, path))
}

fn parse_timestamp(field: &str, value: Option<&str>) -> Result<NaiveDateTime, String> {
    let value = value.ok_or_else(|| format!("missing field `{}`", field))?;
    NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT).map_err(|e| {
        format!(
            "{} '{}' is not a valid timestamp (expected YYYY-MM-DD HH:MM:SS): {}",
            field, value, e
        )
    })
}

fn absolutize(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

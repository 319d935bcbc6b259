//! Airtime Core
//!
//! Platform-agnostic types, traits, and error handling for Airtime.
//!
//! This crate provides the building blocks shared by the playback engine,
//! the desktop audio backend, and the command-line application.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `ScheduleEntry`, `ScheduleSet`, `PlaybackMode`, `PlayLogEntry`, `RunSummary`
//! - **Core Traits**: `AudioBackend` (play/stop/is-playing over one output channel)
//! - **Error Handling**: `ConfigError` (fatal at startup) and `PlaybackError`
//!   (per file, recoverable)
//! - **Loading**: schedule files and directory scanning
//!
//! # Example
//!
//! ```rust
//! use airtime_core::schedule_file::parse_schedule;
//! use chrono::NaiveDateTime;
//! use std::path::Path;
//!
//! let json = r#"{"schedules": [
//!     {"start_time": "2024-01-01 08:00:00", "stop_time": "2024-01-01 09:00:00", "path": "news.mp3"}
//! ]}"#;
//! let schedule = parse_schedule(json, Path::new("/radio"), Path::new("schedule.json")).unwrap();
//!
//! let now = NaiveDateTime::parse_from_str("2024-01-01 08:30:00", "%Y-%m-%d %H:%M:%S").unwrap();
//! let active = schedule.active_at(now).and_then(|i| schedule.get(i)).unwrap();
//! assert_eq!(active.resolved_path(), Path::new("/radio/news.mp3"));
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod scanner;
pub mod schedule_file;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{ConfigError, PlaybackError, Result};
pub use traits::{AudioBackend, PlaybackHandle};
pub use types::{
    EventKind, PlayLogEntry, PlaybackMode, RunSummary, ScheduleEntry, ScheduleSet,
    TIMESTAMP_FORMAT,
};

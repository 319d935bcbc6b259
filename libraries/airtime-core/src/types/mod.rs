//! Domain types shared by every Airtime crate

mod log;
mod playback;
mod schedule;

pub use log::{EventKind, PlayLogEntry, RunSummary};
pub use playback::PlaybackMode;
pub use schedule::{ScheduleEntry, ScheduleSet, TIMESTAMP_FORMAT};

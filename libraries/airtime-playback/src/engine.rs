//! Schedule engine - decides what should be playing right now
//!
//! Evaluated once per tick against the wall clock:
//!
//! | From          | Condition                               | To            |
//! |---------------|-----------------------------------------|---------------|
//! | `Idle`        | first matching window opens             | `Active`      |
//! | `Idle`        | window opens, file fails to start       | `Entering`    |
//! | `Entering`    | retry succeeds                          | `Active`      |
//! | `Active(e)`   | `e` still first match                   | `Active(e)`   |
//! | `Active(e)`   | another entry `e'` now first match      | `Active(e')`  |
//! | `Active`      | playback died inside the window         | `Entering`    |
//! | any           | no window contains `now`                | `Idle`        |
//!
//! `Entering` means the window is open and `SCHEDULE_START` was logged, but
//! the file has not started yet; the start is retried every tick. It is
//! reported as idle to callers. Every `SCHEDULE_START` is paired with exactly
//! one `SCHEDULE_STOP`.

use crate::logger::PlayLogger;
use crate::playback_loop::PlaybackLoop;
use airtime_core::{
    AudioBackend, EventKind, PlaybackMode, ScheduleEntry, ScheduleSet, TIMESTAMP_FORMAT,
};
use chrono::NaiveDateTime;

/// Engine state, indexed into the schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No window contains `now`
    Idle,

    /// Window open, playback not (yet) started
    Entering(usize),

    /// Window open and its file is looping
    Active(usize),
}

impl EngineState {
    fn entry(self) -> Option<usize> {
        match self {
            Self::Idle => None,
            Self::Entering(index) | Self::Active(index) => Some(index),
        }
    }
}

/// What a tick changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Nothing changed
    None,

    /// Entry's window opened and its file started playing
    Started(usize),

    /// Entry's window was already open and its file started again, after
    /// earlier start failures or after playback ended unexpectedly
    Restarted(usize),

    /// Entry stopped and nothing replaced it
    Stopped(usize),

    /// One entry stopped and another started in the same tick
    Switched { from: usize, to: usize },

    /// Entry's window is open but its file failed to start
    StartFailed(usize),
}

/// Time-window scheduler driving a [`PlaybackLoop`]
pub struct ScheduleEngine {
    schedule: ScheduleSet,
    state: EngineState,
}

impl ScheduleEngine {
    /// Create an engine and log one `SCHEDULE_ENTRY` per entry
    pub fn new(schedule: ScheduleSet, logger: &mut PlayLogger) -> Self {
        for entry in schedule.iter() {
            logger.record(
                EventKind::ScheduleEntry,
                entry.resolved_path(),
                Some(describe_window(entry)),
            );
        }

        Self {
            schedule,
            state: EngineState::Idle,
        }
    }

    pub fn schedule(&self) -> &ScheduleSet {
        &self.schedule
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Entry whose file is currently playing
    pub fn active_entry(&self) -> Option<usize> {
        match self.state {
            EngineState::Active(index) => Some(index),
            _ => None,
        }
    }

    /// Evaluate the schedule at `now` and issue at most one stop/start pair
    pub fn tick<B: AudioBackend>(
        &mut self,
        now: NaiveDateTime,
        playback: &mut PlaybackLoop<B>,
        logger: &mut PlayLogger,
    ) -> Transition {
        let wanted = self.schedule.active_at(now);

        let mut stopped = None;
        if let Some(current) = self.state.entry() {
            if wanted != Some(current) {
                self.leave(current, playback, logger);
                stopped = Some(current);
            }
        }

        if let EngineState::Active(current) = self.state {
            if playback.is_active() {
                return Transition::None;
            }

            let path = self.entry(current).resolved_path();
            tracing::warn!("Scheduled playback of {} ended unexpectedly", path.display());
            logger.record(
                EventKind::PlayFail,
                path,
                Some("playback ended unexpectedly".to_string()),
            );
            playback.stop();
            self.state = EngineState::Entering(current);
        }

        let Some(index) = wanted else {
            return stopped.map_or(Transition::None, Transition::Stopped);
        };

        let opening = self.state != EngineState::Entering(index);
        if opening {
            let entry = self.entry(index);
            tracing::info!(
                "Schedule entry #{} started: {}",
                index,
                entry.resolved_path().display()
            );
            logger.record(
                EventKind::ScheduleStart,
                entry.resolved_path(),
                Some(describe_window(entry)),
            );
            self.state = EngineState::Entering(index);
        }

        let path = self.entry(index).resolved_path().to_path_buf();
        match playback.start(vec![path], PlaybackMode::LoopSingle, logger) {
            Ok(()) => {
                self.state = EngineState::Active(index);
                match stopped {
                    Some(from) => Transition::Switched { from, to: index },
                    None if opening => Transition::Started(index),
                    None => Transition::Restarted(index),
                }
            }
            Err(e) => {
                tracing::debug!("Schedule entry #{} will retry next tick: {}", index, e);
                Transition::StartFailed(index)
            }
        }
    }

    /// Stop any scheduled playback and close the open window
    ///
    /// Idempotent: a second call logs nothing.
    pub fn shutdown<B: AudioBackend>(
        &mut self,
        playback: &mut PlaybackLoop<B>,
        logger: &mut PlayLogger,
    ) {
        if let Some(current) = self.state.entry() {
            self.leave(current, playback, logger);
        }
        playback.stop();
    }

    fn leave<B: AudioBackend>(
        &mut self,
        index: usize,
        playback: &mut PlaybackLoop<B>,
        logger: &mut PlayLogger,
    ) {
        if matches!(self.state, EngineState::Active(_)) {
            playback.stop();
        }

        let entry = self.entry(index);
        tracing::info!(
            "Schedule entry #{} stopped: {}",
            index,
            entry.resolved_path().display()
        );
        logger.record(EventKind::ScheduleStop, entry.resolved_path(), None);
        self.state = EngineState::Idle;
    }

    fn entry(&self, index: usize) -> &ScheduleEntry {
        // Indices only ever come from `self.schedule`
        &self.schedule[index]
    }
}

fn describe_window(entry: &ScheduleEntry) -> String {
    format!(
        "{} -> {}",
        entry.start_time().format(TIMESTAMP_FORMAT),
        entry.stop_time().format(TIMESTAMP_FORMAT)
    )
}

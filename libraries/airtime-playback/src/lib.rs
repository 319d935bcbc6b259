//! Airtime - Playback
//!
//! Platform-agnostic playback control for Airtime.
//!
//! This crate provides:
//! - `PlayLogger`: append-only play log plus the per-run summary
//! - `PlaybackLoop`: one-shot, loop-single and loop-all playback over any `AudioBackend`
//! - `ScheduleEngine`: time-window scheduling with first-match-wins overlaps
//! - `runner`: the tick-driven control loop with cooperative shutdown
//!
//! # Architecture
//!
//! `airtime-playback` has no dependency on CPAL or any audio device. The
//! backend is injected through [`airtime_core::AudioBackend`], so the whole
//! state machine runs against a scripted backend in tests.
//!
//! Nothing here is shared between threads: the loop, the engine and the
//! logger are owned by one control loop and passed by `&mut`.
//!
//! # Example
//!
//! ```rust,no_run
//! use airtime_core::{AudioBackend, PlaybackHandle, PlaybackMode, Result};
//! use airtime_playback::{PlayLogger, PlaybackLoop};
//! use std::path::{Path, PathBuf};
//!
//! struct Silent(u64);
//!
//! impl AudioBackend for Silent {
//!     fn play(&mut self, _path: &Path, _repeat: bool) -> Result<PlaybackHandle> {
//!         self.0 += 1;
//!         Ok(PlaybackHandle::new(self.0))
//!     }
//!     fn stop(&mut self, _handle: PlaybackHandle) {}
//!     fn is_playing(&mut self, _handle: PlaybackHandle) -> bool {
//!         false
//!     }
//! }
//!
//! let mut logger = PlayLogger::open(Path::new("play_log.txt"));
//! let mut playback = PlaybackLoop::new(Silent(0));
//! playback
//!     .start(vec![PathBuf::from("song.mp3")], PlaybackMode::OneShot, &mut logger)
//!     .ok();
//! ```

mod engine;
mod logger;
mod playback_loop;
pub mod runner;

// Public exports
pub use engine::{EngineState, ScheduleEngine, Transition};
pub use logger::PlayLogger;
pub use playback_loop::{LoopStatus, PlaybackLoop, PlaybackSession};
pub use runner::{run_direct, run_schedule, RunOutcome};

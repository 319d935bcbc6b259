//! Tick driver
//!
//! A single cooperative control loop: tick, then sleep until the next tick
//! or until shutdown is requested. The sleep is the only suspension point,
//! so an interrupt is observed between ticks and never re-enters audio code.
//! A shutdown that is already pending when a run begins is honoured before
//! any playback starts.

use crate::engine::ScheduleEngine;
use crate::logger::PlayLogger;
use crate::playback_loop::{LoopStatus, PlaybackLoop};
use airtime_core::{AudioBackend, PlaybackMode, Result};
use chrono::NaiveDateTime;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::time::Duration;

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// One-shot sequence played to the end
    Completed,

    /// Shutdown was requested (e.g. Ctrl-C)
    Interrupted,
}

/// Play `files` directly until the sequence ends or `shutdown` resolves
///
/// Fails only when no file in the sequence could start at all. The run
/// summary is written before returning in every case.
pub async fn run_direct<B, S>(
    files: Vec<PathBuf>,
    mode: PlaybackMode,
    playback: &mut PlaybackLoop<B>,
    logger: &mut PlayLogger,
    poll_interval: Duration,
    shutdown: S,
) -> Result<RunOutcome>
where
    B: AudioBackend,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    if already_requested(shutdown.as_mut()).await {
        logger.finish();
        return Ok(RunOutcome::Interrupted);
    }

    if let Err(e) = playback.start(files, mode, logger) {
        logger.finish();
        return Err(e);
    }

    let outcome = loop {
        if matches!(playback.poll(logger), LoopStatus::Finished | LoopStatus::Idle) {
            break RunOutcome::Completed;
        }

        tokio::select! {
            () = &mut shutdown => break RunOutcome::Interrupted,
            () = tokio::time::sleep(poll_interval) => {}
        }
    };

    playback.stop();
    logger.finish();
    Ok(outcome)
}

/// Drive `engine` once per `poll_interval` until `shutdown` resolves
///
/// `clock` supplies the wall-clock time for each tick.
pub async fn run_schedule<B, C, S>(
    engine: &mut ScheduleEngine,
    playback: &mut PlaybackLoop<B>,
    logger: &mut PlayLogger,
    poll_interval: Duration,
    mut clock: C,
    shutdown: S,
) -> RunOutcome
where
    B: AudioBackend,
    C: FnMut() -> NaiveDateTime,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    if !already_requested(shutdown.as_mut()).await {
        loop {
            engine.tick(clock(), playback, logger);

            tokio::select! {
                () = &mut shutdown => break,
                () = tokio::time::sleep(poll_interval) => {}
            }
        }
    }

    engine.shutdown(playback, logger);
    logger.finish();
    RunOutcome::Interrupted
}

/// Whether `shutdown` has resolved, without waiting for it
async fn already_requested<S: Future<Output = ()>>(shutdown: Pin<&mut S>) -> bool {
    tokio::select! {
        biased;
        () = shutdown => true,
        () = std::future::ready(()) => false,
    }
}

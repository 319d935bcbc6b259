//! Startup validation and wiring for the two run modes

use crate::cli::Cli;
use crate::config::PlayerConfig;
use airtime_core::scanner::collect_audio_files;
use airtime_core::schedule_file::load_schedule;
use airtime_core::{AudioBackend, ConfigError, PlaybackMode, ScheduleSet, TIMESTAMP_FORMAT};
use airtime_playback::{
    run_direct, run_schedule, PlayLogger, PlaybackLoop, RunOutcome, ScheduleEngine,
};
use chrono::{Local, NaiveDateTime};
use std::future::Future;
use std::path::PathBuf;

/// What the process will do, decided before any audio is touched
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    /// Directory held no supported files
    Nothing,

    /// Play files directly
    Direct {
        files: Vec<PathBuf>,
        mode: PlaybackMode,
    },

    /// Follow a time-window schedule
    Schedule(ScheduleSet),
}

/// Validate arguments and resolve them into a [`Plan`]
pub fn plan(cli: &Cli) -> Result<Plan, ConfigError> {
    if let Some(schedule_path) = &cli.schedule {
        if let Some(path) = &cli.path {
            tracing::warn!("--schedule given, ignoring {}", path.display());
        }
        let schedule = load_schedule(schedule_path)?;
        return Ok(Plan::Schedule(schedule));
    }

    let path = cli.path.as_ref().ok_or(ConfigError::MissingPath)?;
    if !path.exists() {
        return Err(ConfigError::PathNotFound(path.clone()));
    }

    let files = collect_audio_files(path)?;
    if files.is_empty() {
        return Ok(Plan::Nothing);
    }

    let mode = cli.mode();
    if mode == PlaybackMode::LoopSingle && files.len() > 1 {
        return Err(ConfigError::LoopNeedsSingleFile { count: files.len() });
    }

    Ok(Plan::Direct { files, mode })
}

/// Execute `plan` until it completes or `shutdown` resolves
///
/// The backend is only created once there is something to play. A direct
/// run in which no file could start at all is an error; a schedule run only
/// ends on shutdown.
pub async fn run<B, F, S>(
    plan: Plan,
    make_backend: F,
    config: &PlayerConfig,
    shutdown: S,
) -> anyhow::Result<RunOutcome>
where
    B: AudioBackend,
    F: FnOnce() -> B,
    S: Future<Output = ()>,
{
    let (files, mode) = match plan {
        Plan::Nothing => {
            println!("No audio files found.");
            return Ok(RunOutcome::Completed);
        }
        Plan::Schedule(schedule) => {
            return Ok(run_scheduled(schedule, make_backend(), config, shutdown).await);
        }
        Plan::Direct { files, mode } => (files, mode),
    };

    println!("Found {} audio file(s)", files.len());
    match mode {
        PlaybackMode::LoopSingle => {
            if let Some(first) = files.first() {
                println!("Looping: {}", first.display());
            }
            println!("Press Ctrl+C to stop");
        }
        PlaybackMode::LoopAll => {
            println!("Looping all files");
            println!("Press Ctrl+C to stop");
        }
        PlaybackMode::OneShot => {}
    }

    let mut logger = PlayLogger::open(&config.log_file);
    let mut playback = PlaybackLoop::new(make_backend());

    let outcome = run_direct(
        files,
        mode,
        &mut playback,
        &mut logger,
        config.poll_interval(),
        shutdown,
    )
    .await?;

    report(outcome);
    Ok(outcome)
}

async fn run_scheduled<B, S>(
    schedule: ScheduleSet,
    backend: B,
    config: &PlayerConfig,
    shutdown: S,
) -> RunOutcome
where
    B: AudioBackend,
    S: Future<Output = ()>,
{
    println!("Loaded {} schedule entries", schedule.len());

    let mut logger = PlayLogger::open(&config.log_file);
    let mut playback = PlaybackLoop::new(backend);
    let mut engine = ScheduleEngine::new(schedule, &mut logger);

    announce_next_window(engine.schedule(), now());
    println!("Press Ctrl+C to stop");

    let outcome = run_schedule(
        &mut engine,
        &mut playback,
        &mut logger,
        config.poll_interval(),
        now,
        shutdown,
    )
    .await;

    report(outcome);
    outcome
}

fn announce_next_window(schedule: &ScheduleSet, at: NaiveDateTime) {
    if schedule.active_at(at).is_some() {
        return;
    }

    match schedule.next_start_after(at) {
        Some((index, start)) => {
            let path = schedule[index].resolved_path();
            println!(
                "Waiting for next window at {}: {}",
                start.format(TIMESTAMP_FORMAT),
                path.display()
            );
        }
        None => {
            tracing::warn!("Every schedule window has already closed");
            println!("No upcoming schedule windows");
        }
    }
}

fn report(outcome: RunOutcome) {
    match outcome {
        RunOutcome::Completed => println!("Playback finished"),
        RunOutcome::Interrupted => println!("\nStopped by user"),
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

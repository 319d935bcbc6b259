//! Integration tests for the schedule engine
//!
//! Ticks are driven with synthetic timestamps, one second apart, against a
//! scripted backend.

mod common;

use airtime_core::{ScheduleEntry, ScheduleSet};
use airtime_playback::{EngineState, PlaybackLoop, ScheduleEngine, Transition};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use common::{logger, MockBackend};
use proptest::prelude::*;
use std::path::PathBuf;

// ===== Test Helpers =====

fn t0() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 10)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
}

fn secs(n: i64) -> NaiveDateTime {
    t0() + Duration::seconds(n)
}

fn entry(start: i64, stop: i64, path: &str) -> ScheduleEntry {
    ScheduleEntry::new(secs(start), secs(stop), PathBuf::from(path)).unwrap()
}

// ===== Scenarios =====

#[test]
fn test_single_window_starts_and_stops_once() {
    let backend = MockBackend::new();
    let (mut log, buffer) = logger();
    let mut playback = PlaybackLoop::new(backend.clone());
    let mut engine = ScheduleEngine::new(
        ScheduleSet::new(vec![entry(0, 2, "/audio/x.wav")]),
        &mut log,
    );

    let transitions: Vec<_> = (-1..=3)
        .map(|n| engine.tick(secs(n), &mut playback, &mut log))
        .collect();

    assert_eq!(
        transitions,
        vec![
            Transition::None,
            Transition::Started(0),
            Transition::None,
            Transition::Stopped(0),
            Transition::None,
        ]
    );
    assert_eq!(
        buffer.kinds(),
        vec!["SCHEDULE_ENTRY", "SCHEDULE_START", "PLAY_BEGIN", "PLAY", "SCHEDULE_STOP"]
    );
    assert_eq!(buffer.kinds_for("SCHEDULE_START").len(), 1);
    assert_eq!(backend.started_with_repeat(), vec![(PathBuf::from("/audio/x.wav"), true)]);
    assert!(backend.playing_path().is_none());
    assert_eq!(engine.state(), EngineState::Idle);
}

#[test]
fn test_overlap_first_declared_wins_then_hands_over() {
    let backend = MockBackend::new();
    let (mut log, buffer) = logger();
    let mut playback = PlaybackLoop::new(backend.clone());
    let mut engine = ScheduleEngine::new(
        ScheduleSet::new(vec![entry(0, 10, "/audio/e1.wav"), entry(5, 15, "/audio/e2.wav")]),
        &mut log,
    );

    for n in 0..=7 {
        engine.tick(secs(n), &mut playback, &mut log);
    }
    assert_eq!(engine.active_entry(), Some(0));
    assert_eq!(backend.playing_path(), Some(PathBuf::from("/audio/e1.wav")));

    for n in 8..=9 {
        assert_eq!(engine.tick(secs(n), &mut playback, &mut log), Transition::None);
    }
    assert_eq!(
        engine.tick(secs(10), &mut playback, &mut log),
        Transition::Switched { from: 0, to: 1 }
    );
    assert_eq!(backend.playing_path(), Some(PathBuf::from("/audio/e2.wav")));

    let schedule_events: Vec<_> = buffer
        .events()
        .into_iter()
        .filter(|(kind, _, _)| kind.starts_with("SCHEDULE_S"))
        .map(|(kind, path, _)| (kind, path))
        .collect();
    assert_eq!(
        schedule_events,
        vec![
            ("SCHEDULE_START".to_string(), PathBuf::from("/audio/e1.wav")),
            ("SCHEDULE_STOP".to_string(), PathBuf::from("/audio/e1.wav")),
            ("SCHEDULE_START".to_string(), PathBuf::from("/audio/e2.wav")),
        ]
    );

    // e1 was stopped before e2 started: never two sounding at once
    assert_eq!(backend.stop_calls(), 1);
    assert_eq!(engine.tick(secs(15), &mut playback, &mut log), Transition::Stopped(1));
}

#[test]
fn test_back_to_back_windows_switch_without_gap() {
    let backend = MockBackend::new();
    let (mut log, _buffer) = logger();
    let mut playback = PlaybackLoop::new(backend.clone());
    let mut engine = ScheduleEngine::new(
        ScheduleSet::new(vec![entry(0, 3, "/audio/a.wav"), entry(3, 6, "/audio/b.wav")]),
        &mut log,
    );

    engine.tick(secs(2), &mut playback, &mut log);
    assert_eq!(
        engine.tick(secs(3), &mut playback, &mut log),
        Transition::Switched { from: 0, to: 1 }
    );
    assert!(playback.is_active());
}

#[test]
fn test_missing_file_retries_each_tick_without_crashing() {
    let backend = MockBackend::new();
    backend.mark_missing("/audio/late.wav");
    let (mut log, buffer) = logger();
    let mut playback = PlaybackLoop::new(backend.clone());
    let mut engine = ScheduleEngine::new(
        ScheduleSet::new(vec![entry(0, 10, "/audio/late.wav")]),
        &mut log,
    );

    assert_eq!(engine.tick(secs(0), &mut playback, &mut log), Transition::StartFailed(0));
    assert_eq!(engine.tick(secs(1), &mut playback, &mut log), Transition::StartFailed(0));
    assert_eq!(engine.state(), EngineState::Entering(0));
    assert_eq!(engine.active_entry(), None);

    backend.restore(&PathBuf::from("/audio/late.wav"));
    assert_eq!(engine.tick(secs(2), &mut playback, &mut log), Transition::Restarted(0));

    assert_eq!(buffer.kinds_for("SCHEDULE_START").len(), 1);
    assert_eq!(buffer.kinds_for("PLAY_FAIL").len(), 2);
    assert_eq!(buffer.kinds_for("PLAY").len(), 1);
    assert_eq!(log.summary().total_plays, 1);

    let fails: Vec<_> = buffer
        .events()
        .into_iter()
        .filter(|(kind, _, _)| kind == "PLAY_FAIL")
        .collect();
    assert!(fails[0].2.as_deref().unwrap().contains("not found"));
}

#[test]
fn test_window_closing_while_entering_balances_events() {
    let backend = MockBackend::new();
    backend.mark_undecodable("/audio/broken.mp3");
    let (mut log, buffer) = logger();
    let mut playback = PlaybackLoop::new(backend.clone());
    let mut engine = ScheduleEngine::new(
        ScheduleSet::new(vec![entry(0, 2, "/audio/broken.mp3")]),
        &mut log,
    );

    for n in 0..=2 {
        engine.tick(secs(n), &mut playback, &mut log);
    }

    assert_eq!(buffer.kinds_for("SCHEDULE_START").len(), 1);
    assert_eq!(buffer.kinds_for("SCHEDULE_STOP").len(), 1);
    assert_eq!(backend.stop_calls(), 0);
    assert_eq!(engine.state(), EngineState::Idle);
}

#[test]
fn test_playback_dying_inside_window_is_restarted() {
    let backend = MockBackend::new();
    let (mut log, buffer) = logger();
    let mut playback = PlaybackLoop::new(backend.clone());
    let mut engine = ScheduleEngine::new(
        ScheduleSet::new(vec![entry(0, 60, "/audio/loop.ogg")]),
        &mut log,
    );

    assert_eq!(engine.tick(secs(0), &mut playback, &mut log), Transition::Started(0));
    backend.finish_current();

    assert_eq!(engine.tick(secs(1), &mut playback, &mut log), Transition::Restarted(0));
    assert!(playback.is_active());

    let fails: Vec<_> = buffer
        .events()
        .into_iter()
        .filter(|(kind, _, _)| kind == "PLAY_FAIL")
        .collect();
    assert_eq!(fails.len(), 1);
    assert_eq!(fails[0].2.as_deref(), Some("playback ended unexpectedly"));
    assert_eq!(buffer.kinds_for("SCHEDULE_START").len(), 1);
    assert_eq!(log.summary().total_plays, 2);
}

#[test]
fn test_shutdown_stops_once() {
    let backend = MockBackend::new();
    let (mut log, buffer) = logger();
    let mut playback = PlaybackLoop::new(backend.clone());
    let mut engine = ScheduleEngine::new(
        ScheduleSet::new(vec![entry(0, 60, "/audio/x.wav")]),
        &mut log,
    );

    engine.tick(secs(5), &mut playback, &mut log);
    engine.shutdown(&mut playback, &mut log);
    engine.shutdown(&mut playback, &mut log);

    assert_eq!(buffer.kinds_for("SCHEDULE_STOP").len(), 1);
    assert!(backend.playing_path().is_none());
    assert_eq!(engine.state(), EngineState::Idle);
}

#[test]
fn test_schedule_entries_are_logged_at_creation() {
    let (mut log, buffer) = logger();
    let _engine = ScheduleEngine::new(
        ScheduleSet::new(vec![entry(0, 1, "/audio/a.wav"), entry(5, 9, "/audio/b.wav")]),
        &mut log,
    );

    let events = buffer.events();
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|(kind, _, _)| kind == "SCHEDULE_ENTRY"));
    assert_eq!(
        events[0].2.as_deref(),
        Some("2024-03-10 09:00:00 -> 2024-03-10 09:00:01")
    );
}

// ===== Properties =====

fn arbitrary_windows() -> impl Strategy<Value = Vec<(i64, i64)>> {
    prop::collection::vec((0i64..40, 1i64..20), 1..6)
}

proptest! {
    /// Property: after every tick the sounding file is the first-declared
    /// entry containing `now`, and at most one file sounds
    #[test]
    fn engine_tracks_first_match(windows in arbitrary_windows(), step in 1i64..4) {
        let entries: Vec<_> = windows
            .iter()
            .enumerate()
            .map(|(i, (start, len))| entry(*start, start + len, &format!("/audio/{}.wav", i)))
            .collect();
        let set = ScheduleSet::new(entries);

        let backend = MockBackend::new();
        let (mut log, buffer) = logger();
        let mut playback = PlaybackLoop::new(backend.clone());
        let mut engine = ScheduleEngine::new(set.clone(), &mut log);

        let mut n = -2;
        while n < 70 {
            let now = secs(n);
            engine.tick(now, &mut playback, &mut log);

            let expected = set.active_at(now);
            prop_assert_eq!(engine.active_entry(), expected);
            prop_assert_eq!(
                backend.playing_path(),
                expected.map(|i| set[i].resolved_path().to_path_buf())
            );
            n += step;
        }

        let starts = buffer.kinds_for("SCHEDULE_START").len();
        let stops = buffer.kinds_for("SCHEDULE_STOP").len();
        prop_assert_eq!(starts, stops);
    }
}

//! Integration tests for the playback loop
//!
//! These tests drive the loop against a scripted backend and verify the
//! resulting play order, counts and log events.

mod common;

use airtime_core::scanner::scan_directory;
use airtime_core::{PlaybackError, PlaybackMode};
use airtime_playback::{LoopStatus, PlaybackLoop};
use common::{logger, MockBackend};
use std::fs;
use std::path::{Path, PathBuf};

fn paths(names: &[&str]) -> Vec<PathBuf> {
    names.iter().map(|n| PathBuf::from(format!("/music/{}", n))).collect()
}

#[test]
fn test_loop_all_plays_sorted_directory_and_wraps() {
    let temp = tempfile::TempDir::new().unwrap();
    for name in ["b.mp3", "a.wav", "c.flac"] {
        fs::write(temp.path().join(name), b"fake").unwrap();
    }
    let files = scan_directory(temp.path()).unwrap();

    let backend = MockBackend::new();
    let (mut log, _buffer) = logger();
    let mut playback = PlaybackLoop::new(backend.clone());

    playback.start(files.clone(), PlaybackMode::LoopAll, &mut log).unwrap();
    assert_eq!(playback.poll(&mut log), LoopStatus::Playing);

    for _ in 0..3 {
        backend.finish_current();
        assert!(matches!(playback.poll(&mut log), LoopStatus::Advanced(_)));
    }

    let names: Vec<_> = backend
        .started()
        .iter()
        .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["a.wav", "b.mp3", "c.flac", "a.wav"]);

    assert_eq!(playback.current().unwrap().index(), 0);
    assert_eq!(log.summary().count_for(&files[0]), 2);
    assert_eq!(log.summary().total_plays, 4);
}

#[test]
fn test_one_shot_plays_each_file_once_then_finishes() {
    let backend = MockBackend::new();
    let (mut log, buffer) = logger();
    let mut playback = PlaybackLoop::new(backend.clone());
    let files = paths(&["one.mp3", "two.ogg"]);

    playback.start(files.clone(), PlaybackMode::OneShot, &mut log).unwrap();
    backend.finish_current();
    assert_eq!(playback.poll(&mut log), LoopStatus::Advanced(files[1].clone()));
    backend.finish_current();
    assert_eq!(playback.poll(&mut log), LoopStatus::Finished);
    assert_eq!(playback.poll(&mut log), LoopStatus::Idle);

    assert_eq!(backend.started(), files);
    assert_eq!(log.summary().total_plays, 2);
    assert_eq!(
        buffer.kinds(),
        vec!["PLAY_BEGIN", "PLAY", "PLAY_BEGIN", "PLAY"]
    );
}

#[test]
fn test_missing_file_logs_begin_then_fail_and_counts_nothing() {
    let backend = MockBackend::new();
    backend.mark_missing("/music/missing.mp3");
    let (mut log, buffer) = logger();
    let mut playback = PlaybackLoop::new(backend.clone());

    let err = playback
        .start(paths(&["missing.mp3"]), PlaybackMode::OneShot, &mut log)
        .unwrap_err();
    assert!(matches!(err, PlaybackError::FileNotFound(_)));

    let events = buffer.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].0, "PLAY_BEGIN");
    assert_eq!(events[1].0, "PLAY_FAIL");
    assert!(events[1].2.as_deref().unwrap().contains("not found"));

    assert_eq!(log.summary().count_for(Path::new("/music/missing.mp3")), 0);
    assert_eq!(log.summary().total_plays, 0);
    assert!(!playback.is_active());
}

#[test]
fn test_unsupported_extension_never_reaches_backend() {
    let backend = MockBackend::new();
    let (mut log, buffer) = logger();
    let mut playback = PlaybackLoop::new(backend.clone());

    let err = playback
        .start(paths(&["notes.txt"]), PlaybackMode::OneShot, &mut log)
        .unwrap_err();

    assert!(matches!(err, PlaybackError::UnsupportedFormat(_)));
    assert!(backend.started().is_empty());
    assert_eq!(buffer.kinds(), vec!["PLAY_BEGIN", "PLAY_FAIL"]);
}

#[test]
fn test_loop_all_skips_failing_file() {
    let backend = MockBackend::new();
    backend.mark_undecodable("/music/b.mp3");
    let (mut log, buffer) = logger();
    let mut playback = PlaybackLoop::new(backend.clone());

    playback
        .start(paths(&["a.mp3", "b.mp3", "c.mp3"]), PlaybackMode::LoopAll, &mut log)
        .unwrap();
    backend.finish_current();
    assert_eq!(
        playback.poll(&mut log),
        LoopStatus::Advanced(PathBuf::from("/music/c.mp3"))
    );

    assert_eq!(backend.started(), paths(&["a.mp3", "c.mp3"]));
    assert_eq!(buffer.kinds_for("PLAY_FAIL"), paths(&["b.mp3"]));
    assert_eq!(log.summary().count_for(Path::new("/music/b.mp3")), 0);
}

#[test]
fn test_loop_all_with_nothing_playable_finishes() {
    let backend = MockBackend::new();
    let (mut log, _buffer) = logger();
    let mut playback = PlaybackLoop::new(backend.clone());

    playback
        .start(paths(&["a.mp3", "b.mp3"]), PlaybackMode::LoopAll, &mut log)
        .unwrap();
    backend.mark_missing("/music/a.mp3");
    backend.mark_missing("/music/b.mp3");
    backend.finish_current();

    assert_eq!(playback.poll(&mut log), LoopStatus::Finished);
    assert!(playback.current().is_none());
}

#[test]
fn test_loop_single_repeats_through_backend() {
    let backend = MockBackend::new();
    let (mut log, _buffer) = logger();
    let mut playback = PlaybackLoop::new(backend.clone());

    playback
        .start(paths(&["bell.wav"]), PlaybackMode::LoopSingle, &mut log)
        .unwrap();

    assert_eq!(
        backend.started_with_repeat(),
        vec![(PathBuf::from("/music/bell.wav"), true)]
    );
    assert_eq!(playback.poll(&mut log), LoopStatus::Playing);

    // Backend gave up repeating: the loop restarts the same file
    backend.finish_current();
    assert_eq!(
        playback.poll(&mut log),
        LoopStatus::Advanced(PathBuf::from("/music/bell.wav"))
    );
    assert_eq!(log.summary().count_for(Path::new("/music/bell.wav")), 2);
}

#[test]
fn test_stop_is_idempotent() {
    let backend = MockBackend::new();
    let (mut log, buffer) = logger();
    let mut playback = PlaybackLoop::new(backend.clone());

    playback.stop();
    assert_eq!(backend.stop_calls(), 0);

    playback
        .start(paths(&["a.mp3"]), PlaybackMode::LoopSingle, &mut log)
        .unwrap();
    let events_before = buffer.events().len();

    playback.stop();
    playback.stop();

    assert_eq!(backend.stop_calls(), 1);
    assert!(!playback.is_active());
    assert!(backend.playing_path().is_none());
    assert_eq!(buffer.events().len(), events_before);
}

#[test]
fn test_start_replaces_current_session() {
    let backend = MockBackend::new();
    let (mut log, _buffer) = logger();
    let mut playback = PlaybackLoop::new(backend.clone());

    playback
        .start(paths(&["a.mp3"]), PlaybackMode::LoopSingle, &mut log)
        .unwrap();
    playback
        .start(paths(&["b.mp3"]), PlaybackMode::LoopSingle, &mut log)
        .unwrap();

    assert_eq!(backend.stop_calls(), 1);
    assert_eq!(backend.playing_path(), Some(PathBuf::from("/music/b.mp3")));
    assert_eq!(
        playback.current().unwrap().target_path(),
        Path::new("/music/b.mp3")
    );
}

#[test]
fn test_drop_stops_backend() {
    let backend = MockBackend::new();
    let (mut log, _buffer) = logger();
    {
        let mut playback = PlaybackLoop::new(backend.clone());
        playback
            .start(paths(&["a.mp3"]), PlaybackMode::LoopSingle, &mut log)
            .unwrap();
    }
    assert!(backend.playing_path().is_none());
}

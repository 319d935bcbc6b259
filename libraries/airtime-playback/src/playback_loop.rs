//! Playback loop - drives one-shot, loop-single and loop-all playback
//!
//! The loop owns the only playback session and the backend behind it. It is
//! polled from a single control loop; nothing here blocks or sleeps.

use crate::logger::PlayLogger;
use airtime_core::scanner::is_audio_file;
use airtime_core::{AudioBackend, EventKind, PlaybackError, PlaybackHandle, PlaybackMode, Result};
use chrono::{Local, NaiveDateTime};
use std::path::{Path, PathBuf};

/// Audio currently sounding
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    files: Vec<PathBuf>,
    index: usize,
    mode: PlaybackMode,
    handle: PlaybackHandle,
    started_at: NaiveDateTime,
}

impl PlaybackSession {
    /// File currently playing
    pub fn target_path(&self) -> &Path {
        &self.files[self.index]
    }

    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    /// When the current file started
    pub fn started_at(&self) -> NaiveDateTime {
        self.started_at
    }

    /// Position of the current file in the sequence
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

/// Result of one [`PlaybackLoop::poll`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopStatus {
    /// Nothing was playing
    Idle,

    /// Current file still sounding
    Playing,

    /// Previous file ended naturally; this one started
    Advanced(PathBuf),

    /// Sequence exhausted (one-shot) or nothing left that can play
    Finished,
}

/// Drives actual sounding of audio through an [`AudioBackend`]
pub struct PlaybackLoop<B: AudioBackend> {
    backend: B,
    session: Option<PlaybackSession>,
}

impl<B: AudioBackend> PlaybackLoop<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            session: None,
        }
    }

    /// Begin playing `files` in `mode`
    ///
    /// Replaces any current session. Files that fail are logged as
    /// `PLAY_FAIL` and skipped; the call only fails when no file in the
    /// sequence could start, returning the last failure.
    pub fn start(
        &mut self,
        files: Vec<PathBuf>,
        mode: PlaybackMode,
        logger: &mut PlayLogger,
    ) -> Result<()> {
        self.stop();

        if files.is_empty() {
            tracing::warn!("Nothing to play");
            return Ok(());
        }

        tracing::debug!("Starting {} file(s) in {} mode", files.len(), mode);
        self.begin_from(files, 0, mode, logger)
    }

    /// Stop playback; safe to call when nothing is playing
    pub fn stop(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::debug!("Stopping {}", session.target_path().display());
            self.backend.stop(session.handle);
        }
    }

    /// Whether the backend reports audio in flight
    pub fn is_active(&mut self) -> bool {
        match &self.session {
            Some(session) => self.backend.is_playing(session.handle),
            None => false,
        }
    }

    /// Advance the sequence if the current file ended naturally
    pub fn poll(&mut self, logger: &mut PlayLogger) -> LoopStatus {
        let Some(session) = self.session.as_ref() else {
            return LoopStatus::Idle;
        };

        if self.backend.is_playing(session.handle) {
            return LoopStatus::Playing;
        }

        let Some(session) = self.session.take() else {
            return LoopStatus::Idle;
        };
        tracing::debug!("Finished {}", session.target_path().display());

        let len = session.files.len();
        let next = match session.mode {
            PlaybackMode::LoopSingle => session.index,
            PlaybackMode::LoopAll => (session.index + 1) % len,
            PlaybackMode::OneShot if session.index + 1 < len => session.index + 1,
            PlaybackMode::OneShot => return LoopStatus::Finished,
        };

        match self.begin_from(session.files, next, session.mode, logger) {
            Ok(()) => match &self.session {
                Some(current) => LoopStatus::Advanced(current.target_path().to_path_buf()),
                None => LoopStatus::Finished,
            },
            Err(e) => {
                tracing::warn!("No playable file left: {}", e);
                LoopStatus::Finished
            }
        }
    }

    pub fn current(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Try files from `from` onwards until one starts
    ///
    /// One-shot tries the rest of the list, loop-all tries every file once
    /// (wrapping), loop-single only retries its own file.
    fn begin_from(
        &mut self,
        files: Vec<PathBuf>,
        from: usize,
        mode: PlaybackMode,
        logger: &mut PlayLogger,
    ) -> Result<()> {
        let len = files.len();
        let candidates: Vec<usize> = match mode {
            PlaybackMode::LoopSingle => vec![from],
            PlaybackMode::OneShot => (from..len).collect(),
            PlaybackMode::LoopAll => (0..len).map(|k| (from + k) % len).collect(),
        };

        let mut last_error = None;
        for index in candidates {
            match self.play_file(&files[index], mode, logger) {
                Ok(handle) => {
                    self.session = Some(PlaybackSession {
                        files,
                        index,
                        mode,
                        handle,
                        started_at: Local::now().naive_local(),
                    });
                    return Ok(());
                }
                Err(e) => last_error = Some(e),
            }
        }

        Err(last_error.unwrap_or_else(|| PlaybackError::FileNotFound(PathBuf::new())))
    }

    /// `PLAY_BEGIN`, then `PLAY` on success or `PLAY_FAIL` on failure
    fn play_file(
        &mut self,
        path: &Path,
        mode: PlaybackMode,
        logger: &mut PlayLogger,
    ) -> Result<PlaybackHandle> {
        logger.record(EventKind::PlayBegin, path, Some(mode.to_string()));

        let result = if is_audio_file(path) {
            self.backend.play(path, mode.repeats_file())
        } else {
            Err(PlaybackError::UnsupportedFormat(path.to_path_buf()))
        };

        match result {
            Ok(handle) => {
                logger.record_play(path);
                tracing::info!("Playing: {}", path.display());
                Ok(handle)
            }
            Err(e) => {
                logger.record(EventKind::PlayFail, path, Some(e.to_string()));
                tracing::warn!("Error playing {} ({}): {}", path.display(), e.reason(), e);
                Err(e)
            }
        }
    }
}

impl<B: AudioBackend> Drop for PlaybackLoop<B> {
    fn drop(&mut self) {
        self.stop();
    }
}

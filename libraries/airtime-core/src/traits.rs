/// Core traits for Airtime
use crate::error::Result;
use std::path::Path;

/// Opaque identifier for one started playback
///
/// Handles are never reused within a backend, so a stale handle from a
/// stopped playback can not observe or stop a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaybackHandle(u64);

impl PlaybackHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

/// Play/stop/is-playing primitive over a single output channel
///
/// Only one file sounds at a time: `play` replaces whatever the backend was
/// playing before. Implementations must never panic on bad input; every
/// per-file failure is a [`crate::PlaybackError`].
pub trait AudioBackend {
    /// Start playing `path`
    ///
    /// With `repeat` set the backend restarts the file on natural completion
    /// until stopped.
    ///
    /// # Errors
    /// `FileNotFound`, `DecodeError`, `BackendUnavailable` or
    /// `PlaybackUnsupported` when neither the primary path nor the fallback
    /// can sound the file
    fn play(&mut self, path: &Path, repeat: bool) -> Result<PlaybackHandle>;

    /// Stop the playback behind `handle`
    ///
    /// Stopping a handle that already finished or was replaced is a no-op.
    fn stop(&mut self, handle: PlaybackHandle);

    /// Whether audio for `handle` is still in flight
    fn is_playing(&mut self, handle: PlaybackHandle) -> bool;
}

impl<B: AudioBackend + ?Sized> AudioBackend for Box<B> {
    fn play(&mut self, path: &Path, repeat: bool) -> Result<PlaybackHandle> {
        (**self).play(path, repeat)
    }

    fn stop(&mut self, handle: PlaybackHandle) {
        (**self).stop(handle);
    }

    fn is_playing(&mut self, handle: PlaybackHandle) -> bool {
        (**self).is_playing(handle)
    }
}

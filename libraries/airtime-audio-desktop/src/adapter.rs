/// `AudioBackend` for desktops: CPAL output first, external player second
use crate::decoder::StreamingDecoder;
use crate::external::ExternalPlayer;
use crate::output::CpalOutput;
use airtime_core::{AudioBackend, PlaybackError, PlaybackHandle, Result};
use std::path::Path;

/// Which path is sounding the current file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Symphonia streaming decode into the CPAL output thread
    PrimaryDecoder,

    /// External player subprocess
    ExternalProcessFallback,
}

/// Fallback player settings
#[derive(Debug, Clone)]
pub struct FallbackConfig {
    pub program: String,
    pub args: Vec<String>,
    pub enabled: bool,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            program: "ffplay".to_string(),
            args: ["-nodisp", "-autoexit", "-loglevel", "quiet"]
                .into_iter()
                .map(String::from)
                .collect(),
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Current {
    handle: PlaybackHandle,
    strategy: Strategy,
}

/// Desktop audio backend
///
/// Decode failures and a missing output device route the file to the
/// external player when one is configured.
pub struct DesktopBackend {
    output: Option<CpalOutput>,
    fallback: Option<ExternalPlayer>,
    current: Option<Current>,
    next_id: u64,
}

impl DesktopBackend {
    /// Open the default output device, degrading to fallback-only without one
    pub fn new(fallback: FallbackConfig) -> Self {
        let output = match CpalOutput::new() {
            Ok(output) => Some(output),
            Err(e) => {
                tracing::warn!("No audio output device, using fallback player only: {}", e);
                None
            }
        };
        Self::with_output(output, fallback)
    }

    /// Backend that never touches an audio device
    pub fn without_device(fallback: FallbackConfig) -> Self {
        Self::with_output(None, fallback)
    }

    fn with_output(output: Option<CpalOutput>, fallback: FallbackConfig) -> Self {
        let fallback = fallback
            .enabled
            .then(|| ExternalPlayer::new(fallback.program, fallback.args));

        Self {
            output,
            fallback,
            current: None,
            next_id: 0,
        }
    }

    pub fn has_device(&self) -> bool {
        self.output.is_some()
    }

    /// Strategy sounding `handle`, if it is the current playback
    pub fn strategy_for(&self, handle: PlaybackHandle) -> Option<Strategy> {
        self.current
            .filter(|current| current.handle == handle)
            .map(|current| current.strategy)
    }

    fn play_primary(&mut self, path: &Path, repeat: bool) -> Result<()> {
        let Some(output) = self.output.as_mut() else {
            return Err(PlaybackError::backend("no audio output device"));
        };

        let source = StreamingDecoder::open(path, output.sample_rate())
            .map_err(|e| e.into_playback_error(path))?;
        output
            .play(Box::new(source), repeat)
            .map_err(|e| e.into_playback_error(path))
    }

    fn stop_current(&mut self) {
        let Some(current) = self.current.take() else {
            return;
        };

        match current.strategy {
            Strategy::PrimaryDecoder => {
                if let Some(output) = self.output.as_mut() {
                    output.stop();
                }
            }
            Strategy::ExternalProcessFallback => {
                if let Some(fallback) = self.fallback.as_mut() {
                    fallback.stop();
                }
            }
        }
    }

    fn begin(&mut self, strategy: Strategy) -> PlaybackHandle {
        self.next_id += 1;
        let handle = PlaybackHandle::new(self.next_id);
        self.current = Some(Current { handle, strategy });
        handle
    }
}

impl AudioBackend for DesktopBackend {
    fn play(&mut self, path: &Path, repeat: bool) -> Result<PlaybackHandle> {
        self.stop_current();

        if !path.is_file() {
            return Err(PlaybackError::FileNotFound(path.to_path_buf()));
        }

        let primary_err = match self.play_primary(path, repeat) {
            Ok(()) => return Ok(self.begin(Strategy::PrimaryDecoder)),
            Err(e) => e,
        };

        let Some(fallback) = self.fallback.as_mut() else {
            return Err(primary_err);
        };

        tracing::info!(
            "Primary playback failed for {} ({}), trying {}",
            path.display(),
            primary_err,
            fallback.program()
        );

        match fallback.play(path, repeat) {
            Ok(()) => Ok(self.begin(Strategy::ExternalProcessFallback)),
            Err(fallback_err) => match primary_err {
                PlaybackError::DecodeError { reason, .. } => {
                    Err(PlaybackError::PlaybackUnsupported {
                        path: path.to_path_buf(),
                        reason: format!("{}; fallback: {}", reason, fallback_err),
                    })
                }
                _ => Err(fallback_err),
            },
        }
    }

    fn stop(&mut self, handle: PlaybackHandle) {
        if self.strategy_for(handle).is_some() {
            self.stop_current();
        }
    }

    fn is_playing(&mut self, handle: PlaybackHandle) -> bool {
        match self.strategy_for(handle) {
            Some(Strategy::PrimaryDecoder) => {
                self.output.as_ref().is_some_and(CpalOutput::is_playing)
            }
            Some(Strategy::ExternalProcessFallback) => self
                .fallback
                .as_mut()
                .is_some_and(ExternalPlayer::is_running),
            None => false,
        }
    }
}

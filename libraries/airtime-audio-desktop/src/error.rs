/// Audio backend errors
use airtime_core::PlaybackError;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for audio operations
pub type Result<T> = std::result::Result<T, AudioError>;

/// Audio errors
#[derive(Debug, Error)]
pub enum AudioError {
    /// No default output device
    #[error("Audio device not found")]
    DeviceNotFound,

    /// Failed to build output stream
    #[error("Failed to build output stream: {0}")]
    StreamBuildError(String),

    /// Failed to start stream
    #[error("Failed to play stream: {0}")]
    PlayError(String),

    /// Sample rate conversion error
    #[error("Sample rate conversion error: {0}")]
    ResampleError(String),

    /// File could not be opened
    #[error("Failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Container or codec rejected the file
    #[error("{reason}")]
    Decode { path: PathBuf, reason: String },

    /// Audio thread exited
    #[error("Audio thread is not running")]
    ThreadGone,

    /// CPAL error
    #[error("CPAL error: {0}")]
    CpalError(String),
}

impl AudioError {
    pub(crate) fn decode(path: &Path, reason: impl Into<String>) -> Self {
        Self::Decode {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Whether the file itself is at fault rather than the output device
    pub fn is_file_error(&self) -> bool {
        matches!(
            self,
            Self::Open { .. } | Self::Decode { .. } | Self::ResampleError(_)
        )
    }

    /// Map into the per-file error reported to the playback loop
    pub fn into_playback_error(self, path: &Path) -> PlaybackError {
        match self {
            Self::Open { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                PlaybackError::FileNotFound(path.to_path_buf())
            }
            Self::Open { source, .. } => PlaybackError::decode(path, source.to_string()),
            Self::Decode { reason, .. } => PlaybackError::decode(path, reason),
            Self::ResampleError(reason) => PlaybackError::decode(path, reason),
            other => PlaybackError::backend(other.to_string()),
        }
    }
}

impl From<cpal::BuildStreamError> for AudioError {
    fn from(err: cpal::BuildStreamError) -> Self {
        AudioError::StreamBuildError(err.to_string())
    }
}

impl From<cpal::PlayStreamError> for AudioError {
    fn from(err: cpal::PlayStreamError) -> Self {
        AudioError::PlayError(err.to_string())
    }
}

impl From<cpal::DefaultStreamConfigError> for AudioError {
    fn from(err: cpal::DefaultStreamConfigError) -> Self {
        AudioError::CpalError(err.to_string())
    }
}

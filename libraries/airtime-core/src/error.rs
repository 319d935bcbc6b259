/// Core error types for Airtime
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;

/// Startup and configuration errors
///
/// These are fatal: the process exits non-zero before any playback attempt.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Neither a path nor a schedule was given
    #[error("A path is required unless --schedule is given")]
    MissingPath,

    /// Path does not exist
    #[error("Path '{}' does not exist", .0.display())]
    PathNotFound(PathBuf),

    /// File exists but its extension is not a supported audio format
    #[error("{} is not a supported audio format (supported formats: {supported})", .path.display())]
    NotAudioFile { path: PathBuf, supported: String },

    /// `--loop` was combined with more than one file
    #[error("--loop can only be used with a single audio file ({count} found); use --loop-all to loop multiple files")]
    LoopNeedsSingleFile { count: usize },

    /// Directory could not be listed
    #[error("Failed to scan {}: {reason}", .path.display())]
    Scan { path: PathBuf, reason: String },

    /// Schedule file could not be read
    #[error("Failed to read schedule file {}: {source}", .path.display())]
    ScheduleRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Schedule file is not valid JSON or has the wrong shape
    #[error("Failed to parse schedule file {}: {source}", .path.display())]
    ScheduleParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Schedule file lists no entries
    #[error("Schedule file {} contains no entries", .0.display())]
    EmptySchedule(PathBuf),

    /// A single schedule entry is malformed
    #[error("Invalid schedule entry #{index}: {reason}")]
    InvalidEntry { index: usize, reason: String },

    /// Settings layer failed to build or validate
    #[error("Configuration error: {0}")]
    Settings(String),
}

/// Recoverable per-file playback errors
///
/// Logged as `PLAY_FAIL`; the current file or schedule entry is skipped and
/// the loop continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// File does not exist
    #[error("not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Extension is not one of the recognised formats
    #[error("unsupported format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// File exists but could not be decoded
    #[error("decode error: {reason}")]
    DecodeError { path: PathBuf, reason: String },

    /// Output device or external player is unavailable
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Neither the primary decoder nor the fallback player could handle the file
    #[error("playback unsupported: {reason}")]
    PlaybackUnsupported { path: PathBuf, reason: String },
}

impl PlaybackError {
    /// Create a decode error
    pub fn decode(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::DecodeError {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a backend unavailable error
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::BackendUnavailable(msg.into())
    }

    /// Short failure category, used as the `PLAY_FAIL` detail prefix
    pub fn reason(&self) -> &'static str {
        match self {
            Self::FileNotFound(_) => "not found",
            Self::UnsupportedFormat(_) => "unsupported format",
            Self::DecodeError { .. } => "decode error",
            Self::BackendUnavailable(_) => "backend unavailable",
            Self::PlaybackUnsupported { .. } => "playback unsupported",
        }
    }
}

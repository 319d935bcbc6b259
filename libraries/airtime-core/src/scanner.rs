//! Directory scanning for playable audio files

use crate::error::ConfigError;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Supported audio file extensions
pub const SUPPORTED_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "flac", "m4a"];

/// Lists playable files in one directory
///
/// Non-recursive, sorted lexicographically by file name. An empty result is
/// not an error.
pub fn scan_directory(path: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::PathNotFound(path.to_path_buf()));
    }

    if !path.is_dir() {
        return Err(ConfigError::Scan {
            path: path.to_path_buf(),
            reason: "not a directory".to_string(),
        });
    }

    let walker = WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    let mut audio_files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry in {}: {}", path.display(), e);
                continue;
            }
        };

        if entry.file_type().is_file() && is_audio_file(entry.path()) {
            audio_files.push(entry.into_path());
        }
    }

    tracing::debug!("Found {} audio file(s) in {}", audio_files.len(), path.display());
    Ok(audio_files)
}

/// Resolve a CLI path into the list of files to play
///
/// A file must carry a supported extension; a directory is scanned.
pub fn collect_audio_files(path: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    if path.is_file() {
        if is_audio_file(path) {
            return Ok(vec![path.to_path_buf()]);
        }
        return Err(ConfigError::NotAudioFile {
            path: path.to_path_buf(),
            supported: supported_formats_display(),
        });
    }

    scan_directory(path)
}

/// Check if a file has a supported audio extension (case-insensitive)
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// `.mp3, .wav, .ogg, .flac, .m4a`
pub fn supported_formats_display() -> String {
    SUPPORTED_EXTENSIONS
        .iter()
        .map(|ext| format!(".{}", ext))
        .collect::<Vec<_>>()
        .join(", ")
}

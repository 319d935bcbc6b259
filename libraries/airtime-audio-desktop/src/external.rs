//! External player fallback
//!
//! Spawns a player process with the file path as its last argument. The
//! child is always killed and reaped on stop or drop so no zombie outlives
//! the playback it belonged to.

use airtime_core::PlaybackError;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

/// One running child process at a time
pub struct ExternalPlayer {
    program: String,
    args: Vec<String>,
    child: Option<Child>,
    path: Option<PathBuf>,
    repeat: bool,
    spawns: u64,
}

impl ExternalPlayer {
    /// Player invoked as `program args... <file>`
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            child: None,
            path: None,
            repeat: false,
            spawns: 0,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Total processes spawned, restarts included
    pub fn spawn_count(&self) -> u64 {
        self.spawns
    }

    /// Kill any current child and start `path`
    ///
    /// With `repeat`, a clean exit respawns the player on the next
    /// [`is_running`](Self::is_running) check.
    pub fn play(&mut self, path: &Path, repeat: bool) -> Result<(), PlaybackError> {
        self.stop();

        let child = self.spawn(path)?;
        tracing::debug!(
            "Spawned {} (pid {}) for {}",
            self.program,
            child.id(),
            path.display()
        );

        self.child = Some(child);
        self.path = Some(path.to_path_buf());
        self.repeat = repeat;
        Ok(())
    }

    /// Whether the player is still sounding; reaps and respawns as needed
    pub fn is_running(&mut self) -> bool {
        let Some(child) = self.child.as_mut() else {
            return false;
        };

        let status = match child.try_wait() {
            Ok(None) => return true,
            Ok(Some(status)) => status,
            Err(e) => {
                tracing::warn!("Failed to poll {}: {}", self.program, e);
                self.stop();
                return false;
            }
        };

        self.child = None;
        if !status.success() {
            tracing::warn!("{} exited with {}", self.program, status);
            self.path = None;
            return false;
        }

        if !self.repeat {
            self.path = None;
            return false;
        }

        let Some(path) = self.path.clone() else {
            return false;
        };
        match self.spawn(&path) {
            Ok(child) => {
                self.child = Some(child);
                true
            }
            Err(e) => {
                tracing::warn!("Failed to restart {}: {}", path.display(), e);
                self.path = None;
                false
            }
        }
    }

    /// Kill and reap the current child; no-op when idle
    pub fn stop(&mut self) {
        self.path = None;
        let Some(mut child) = self.child.take() else {
            return;
        };

        // Already exited is fine; wait() reaps either way
        if let Err(e) = child.kill() {
            tracing::debug!("kill {}: {}", child.id(), e);
        }
        if let Err(e) = child.wait() {
            tracing::warn!("Failed to reap {}: {}", self.program, e);
        }
    }

    fn spawn(&mut self, path: &Path) -> Result<Child, PlaybackError> {
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => {
                    PlaybackError::backend(format!("{} not found on PATH", self.program))
                }
                _ => PlaybackError::backend(format!("failed to run {}: {}", self.program, e)),
            })?;

        self.spawns += 1;
        Ok(child)
    }
}

impl Drop for ExternalPlayer {
    fn drop(&mut self) {
        self.stop();
    }
}

//! Shared test helpers: a scripted backend and an in-memory play log

#![allow(dead_code)]

use airtime_core::{AudioBackend, PlaybackError, PlaybackHandle, Result};
use airtime_playback::PlayLogger;
use std::cell::RefCell;
use std::collections::HashSet;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::{Arc, Mutex};

// ===== Mock backend =====

#[derive(Default)]
struct MockState {
    next_id: u64,
    current: Option<(PlaybackHandle, PathBuf)>,
    remaining_checks: Option<u32>,
    lifetime: Option<u32>,
    started: Vec<(PathBuf, bool)>,
    stop_calls: usize,
    missing: HashSet<PathBuf>,
    undecodable: HashSet<PathBuf>,
}

/// Backend whose behaviour is scripted by the test
///
/// Clones share state, so a test keeps one clone to steer the copy owned by
/// the playback loop.
#[derive(Clone, Default)]
pub struct MockBackend(Rc<RefCell<MockState>>);

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every playback ends naturally after `checks` calls to `is_playing`
    pub fn with_lifetime(checks: u32) -> Self {
        let backend = Self::default();
        backend.0.borrow_mut().lifetime = Some(checks);
        backend
    }

    pub fn mark_missing(&self, path: impl Into<PathBuf>) {
        self.0.borrow_mut().missing.insert(path.into());
    }

    pub fn mark_undecodable(&self, path: impl Into<PathBuf>) {
        self.0.borrow_mut().undecodable.insert(path.into());
    }

    pub fn restore(&self, path: &Path) {
        let mut state = self.0.borrow_mut();
        state.missing.remove(path);
        state.undecodable.remove(path);
    }

    /// Simulate the current file ending on its own
    pub fn finish_current(&self) {
        self.0.borrow_mut().current = None;
    }

    pub fn playing_path(&self) -> Option<PathBuf> {
        self.0.borrow().current.as_ref().map(|(_, p)| p.clone())
    }

    pub fn started(&self) -> Vec<PathBuf> {
        self.0.borrow().started.iter().map(|(p, _)| p.clone()).collect()
    }

    pub fn started_with_repeat(&self) -> Vec<(PathBuf, bool)> {
        self.0.borrow().started.clone()
    }

    pub fn stop_calls(&self) -> usize {
        self.0.borrow().stop_calls
    }
}

impl AudioBackend for MockBackend {
    fn play(&mut self, path: &Path, repeat: bool) -> Result<PlaybackHandle> {
        let mut state = self.0.borrow_mut();
        if state.missing.contains(path) {
            return Err(PlaybackError::FileNotFound(path.to_path_buf()));
        }
        if state.undecodable.contains(path) {
            return Err(PlaybackError::decode(path, "corrupt stream"));
        }

        state.next_id += 1;
        let handle = PlaybackHandle::new(state.next_id);
        state.current = Some((handle, path.to_path_buf()));
        state.remaining_checks = state.lifetime;
        state.started.push((path.to_path_buf(), repeat));
        Ok(handle)
    }

    fn stop(&mut self, handle: PlaybackHandle) {
        let mut state = self.0.borrow_mut();
        state.stop_calls += 1;
        if matches!(&state.current, Some((h, _)) if *h == handle) {
            state.current = None;
        }
    }

    fn is_playing(&mut self, handle: PlaybackHandle) -> bool {
        let mut state = self.0.borrow_mut();
        if !matches!(&state.current, Some((h, _)) if *h == handle) {
            return false;
        }

        match state.remaining_checks {
            Some(0) => {
                state.current = None;
                false
            }
            Some(n) => {
                state.remaining_checks = Some(n - 1);
                true
            }
            None => true,
        }
    }
}

// ===== In-memory play log =====

#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    /// Parsed event lines as (kind, path, detail); summary lines skipped
    pub fn events(&self) -> Vec<(String, PathBuf, Option<String>)> {
        self.text()
            .lines()
            .filter_map(|line| {
                let mut parts = line.splitn(4, " | ");
                let _timestamp = parts.next()?;
                let kind = parts.next()?.to_string();
                let path = PathBuf::from(parts.next()?);
                let extra = parts.next().map(str::to_string);
                Some((kind, path, extra))
            })
            .collect()
    }

    pub fn kinds(&self) -> Vec<String> {
        self.events().into_iter().map(|(kind, _, _)| kind).collect()
    }

    pub fn kinds_for(&self, kind: &str) -> Vec<PathBuf> {
        self.events()
            .into_iter()
            .filter(|(k, _, _)| k == kind)
            .map(|(_, path, _)| path)
            .collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn logger() -> (PlayLogger, SharedBuffer) {
    let buffer = SharedBuffer::default();
    (PlayLogger::with_writer(buffer.clone()), buffer)
}

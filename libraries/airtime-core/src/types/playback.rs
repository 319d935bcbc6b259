/// How a file or sequence of files is played
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackMode {
    /// Play each file once, then return
    OneShot,

    /// Replay one file until stopped
    LoopSingle,

    /// Replay the whole list until stopped, wrapping after the last file
    LoopAll,
}

impl PlaybackMode {
    /// Whether the backend should repeat the current file seamlessly
    pub fn repeats_file(self) -> bool {
        matches!(self, Self::LoopSingle)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneShot => "one-shot",
            Self::LoopSingle => "loop-single",
            Self::LoopAll => "loop-all",
        }
    }
}

impl std::fmt::Display for PlaybackMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

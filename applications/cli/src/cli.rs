/// Command-line arguments
use airtime_core::PlaybackMode;
use clap::Parser;
use std::path::PathBuf;

const EXAMPLES: &str = "\
Examples:
  airtime song.mp3                         Play a single file
  airtime song.mp3 --loop                  Loop a single file
  airtime /path/to/music                   Play all files in a directory
  airtime /path/to/music --loop-all        Loop all files in a directory
  airtime --schedule schedule.json         Play files in their scheduled time windows";

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "airtime", version)]
#[command(about = "Play audio files from a file, a directory or a time-window schedule")]
#[command(after_help = EXAMPLES)]
pub struct Cli {
    /// Path to an audio file or a directory containing audio files
    pub path: Option<PathBuf>,

    /// Loop a single audio file indefinitely
    #[arg(long = "loop", conflicts_with = "loop_all")]
    pub loop_single: bool,

    /// Loop all audio files indefinitely
    #[arg(long)]
    pub loop_all: bool,

    /// Append play events and the run summary to this file [default: play_log.txt]
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// JSON schedule of time windows; PATH is ignored when given
    #[arg(long, value_name = "PATH")]
    pub schedule: Option<PathBuf>,

    /// Settings file [default: airtime.toml if present]
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// How often playback and the schedule are re-evaluated
    #[arg(long, value_name = "MS")]
    pub poll_interval_ms: Option<u64>,

    /// Never fall back to the external player
    #[arg(long)]
    pub no_fallback: bool,
}

impl Cli {
    /// Playback mode selected by the loop flags
    pub fn mode(&self) -> PlaybackMode {
        if self.loop_single {
            PlaybackMode::LoopSingle
        } else if self.loop_all {
            PlaybackMode::LoopAll
        } else {
            PlaybackMode::OneShot
        }
    }
}

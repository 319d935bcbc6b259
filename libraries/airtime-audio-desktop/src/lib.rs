//! Desktop audio backend for Airtime
//!
//! This crate provides [`DesktopBackend`], the [`airtime_core::AudioBackend`]
//! used by the command-line player.
//!
//! # Features
//!
//! - Streaming decode of every Symphonia format into stereo `f32`
//! - Chunked sample rate conversion to the device rate with Rubato
//! - Output on a dedicated CPAL thread; repeat seeks back to the start
//! - External player fallback (`ffplay` by default) for files the decoder
//!   rejects or when no output device exists
//!
//! # Example
//!
//! ```no_run
//! use airtime_audio_desktop::{DesktopBackend, FallbackConfig};
//! use airtime_core::AudioBackend;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut backend = DesktopBackend::new(FallbackConfig::default());
//! let handle = backend.play(Path::new("jingle.wav"), true)?;
//! assert!(backend.is_playing(handle));
//! backend.stop(handle);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

mod adapter;
pub mod decoder;
mod error;
mod external;
mod output;
mod source;

pub use adapter::{DesktopBackend, FallbackConfig, Strategy};
pub use decoder::StreamingDecoder;
pub use error::{AudioError, Result};
pub use external::ExternalPlayer;
pub use output::CpalOutput;
pub use source::AudioSource;

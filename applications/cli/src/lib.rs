//! Airtime command-line player
//!
//! Argument parsing, layered configuration and the wiring between the
//! desktop audio backend and the playback engine. The binary in `main.rs`
//! only installs logging and the Ctrl-C handler.

pub mod app;
pub mod cli;
pub mod config;

pub use app::{plan, run, Plan};
pub use cli::Cli;
pub use config::PlayerConfig;

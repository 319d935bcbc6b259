/// Player configuration
use crate::cli::Cli;
use airtime_audio_desktop::FallbackConfig;
use airtime_core::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings file looked up in the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "airtime.toml";

/// Prefix for environment overrides, e.g. `AIRTIME_POLL_INTERVAL_MS`
pub const ENV_PREFIX: &str = "AIRTIME";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlayerConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,

    #[serde(default = "default_fallback_player")]
    pub fallback_player: String,

    #[serde(default = "default_fallback_args")]
    pub fallback_args: Vec<String>,

    #[serde(default)]
    pub disable_fallback: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            log_file: default_log_file(),
            fallback_player: default_fallback_player(),
            fallback_args: default_fallback_args(),
            disable_fallback: false,
        }
    }
}

impl PlayerConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `config_file` must exist; the default `airtime.toml` is
    /// optional.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(config_file, None)
    }

    /// Like [`load`](Self::load), with the environment replaced by `env`
    pub fn load_with_env(
        config_file: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut settings = config::Config::builder();

        settings = match config_file {
            Some(path) => settings.add_source(config::File::from(path.to_path_buf())),
            None => settings.add_source(
                config::File::from(PathBuf::from(DEFAULT_CONFIG_FILE)).required(false),
            ),
        };

        // Override with environment variables (prefixed with AIRTIME_)
        settings = settings.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .list_separator(" ")
                .with_list_parse_key("fallback_args")
                .source(env),
        );

        let config = settings
            .build()
            .map_err(|e| ConfigError::Settings(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ConfigError::Settings(e.to_string()))
    }

    /// Command-line flags take precedence over file and environment
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(log_file) = &cli.log_file {
            self.log_file.clone_from(log_file);
        }
        if let Some(ms) = cli.poll_interval_ms {
            self.poll_interval_ms = ms;
        }
        if cli.no_fallback {
            self.disable_fallback = true;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Settings(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }

        if !self.disable_fallback && self.fallback_player.trim().is_empty() {
            return Err(ConfigError::Settings(
                "fallback_player is empty (set AIRTIME_FALLBACK_PLAYER or disable_fallback)"
                    .to_string(),
            ));
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Settings for the desktop backend's external player
    pub fn fallback(&self) -> FallbackConfig {
        FallbackConfig {
            program: self.fallback_player.clone(),
            args: self.fallback_args.clone(),
            enabled: !self.disable_fallback,
        }
    }
}

// Default values
fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_log_file() -> PathBuf {
    PathBuf::from("play_log.txt")
}

fn default_fallback_player() -> String {
    "ffplay".to_string()
}

fn default_fallback_args() -> Vec<String> {
    ["-nodisp", "-autoexit", "-loglevel", "quiet"]
        .into_iter()
        .map(String::from)
        .collect()
}

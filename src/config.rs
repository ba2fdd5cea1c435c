use std::{env, path::PathBuf, time::Duration};

use crate::errors::ConfigError;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";
const DEFAULT_DOWNLOAD_DIR: &str = "temp_downloads";
const DEFAULT_YTDLP: &str = "yt-dlp";
const DEFAULT_FFMPEG: &str = "ffmpeg";
const DEFAULT_METADATA_TIMEOUT: Duration = Duration::from_secs(60);

/// Runtime settings, read once at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub download_dir: PathBuf,
    pub ytdlp_path: String,
    pub ffmpeg_path: String,
    /// Forwarded to yt-dlp only when set explicitly
    pub ffmpeg_location: Option<String>,
    pub acquisition_timeout: Option<Duration>,
    /// Always set, unlike the acquisition deadline
    pub metadata_timeout: Duration,
    pub sweep_interval: Option<Duration>,
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            download_dir: PathBuf::from(DEFAULT_DOWNLOAD_DIR),
            ytdlp_path: DEFAULT_YTDLP.to_string(),
            ffmpeg_path: DEFAULT_FFMPEG.to_string(),
            ffmpeg_location: None,
            acquisition_timeout: None,
            metadata_timeout: DEFAULT_METADATA_TIMEOUT,
            sweep_interval: None,
            verbose: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source, so tests don't touch the process env
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let ffmpeg_location = get("FFMPEG_PATH");

        Ok(Self {
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.bind_addr),
            download_dir: get("DOWNLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.download_dir),
            ytdlp_path: get("YTDLP_PATH").unwrap_or(defaults.ytdlp_path),
            ffmpeg_path: ffmpeg_location.clone().unwrap_or(defaults.ffmpeg_path),
            ffmpeg_location,
            acquisition_timeout: parse_secs("ACQUISITION_TIMEOUT_SECS", get("ACQUISITION_TIMEOUT_SECS"))?,
            metadata_timeout: parse_secs("METADATA_TIMEOUT_SECS", get("METADATA_TIMEOUT_SECS"))?
                .unwrap_or(defaults.metadata_timeout),
            sweep_interval: parse_secs("SWEEP_INTERVAL_SECS", get("SWEEP_INTERVAL_SECS"))?,
            verbose: parse_bool("YTDLP_VERBOSE", get("YTDLP_VERBOSE"))?.unwrap_or(defaults.verbose),
        })
    }
}

fn parse_secs(variable: &'static str, value: Option<String>) -> Result<Option<Duration>, ConfigError> {
    let Some(value) = value else {
        return Ok(None);
    };

    match value.parse::<u64>() {
        Ok(0) => Err(ConfigError {
            variable,
            message: "must be greater than zero".to_string(),
        }),
        Ok(secs) => Ok(Some(Duration::from_secs(secs))),
        Err(e) => Err(ConfigError {
            variable,
            message: format!("'{}' is not a number of seconds: {}", value, e),
        }),
    }
}

fn parse_bool(variable: &'static str, value: Option<String>) -> Result<Option<bool>, ConfigError> {
    let Some(value) = value else {
        return Ok(None);
    };

    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(ConfigError {
            variable,
            message: format!("'{}' is not a boolean", value),
        }),
    }
}

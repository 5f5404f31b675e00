//! User configuration.
//!
//! Read from `<config dir>/riftkit/config.toml`. Every field is optional:
//!
//! ```toml
//! lockfile_paths = ["D:/Games/Riot Games/League of Legends/lockfile"]
//! poll_interval_secs = 5
//! seen_capacity = 500
//! ffmpeg_path = "/usr/local/bin/ffmpeg"
//! points_per_unit = 130.0
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};

pub const DEFAULT_MAIL_API: &str = "https://api.mail.tm";
pub const DEFAULT_RATES_API: &str = "https://open.er-api.com/v6";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Extra lockfile locations, tried before the install defaults.
    pub lockfile_paths: Vec<PathBuf>,
    pub poll_interval_secs: u64,
    /// Identifiers kept for new-item detection.
    pub seen_capacity: usize,
    /// Snapshots and history files. Defaults to `<data dir>/riftkit`.
    pub data_dir: Option<PathBuf>,
    /// Transcoder binary. Defaults to `ffmpeg` on `PATH`.
    pub ffmpeg_path: Option<PathBuf>,
    pub mail_api: String,
    pub rates_api: String,
    /// In-game points bought with one unit of `points_currency`.
    pub points_per_unit: f64,
    pub points_currency: String,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lockfile_paths: Vec::new(),
            poll_interval_secs: 5,
            seen_capacity: 500,
            data_dir: None,
            ffmpeg_path: None,
            mail_api: DEFAULT_MAIL_API.to_string(),
            rates_api: DEFAULT_RATES_API.to_string(),
            points_per_unit: 130.0,
            points_currency: "USD".to_string(),
            request_timeout_secs: 10,
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// `<config dir>/riftkit/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("riftkit").join("config.toml"))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load from `path` (or the default location), falling back to defaults
    /// when the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path.map(Path::to_path_buf).or_else(Self::default_path) else {
            return Ok(Self::default());
        };

        match Self::load(&path) {
            Ok(config) => {
                debug!("Loaded config from {}", path.display());
                Ok(config)
            }
            Err(e) if e.is_not_found() => {
                warn!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => {
                warn!("Failed to load config from {}: {}", path.display(), e);
                Err(e)
            }
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Resolved data directory.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("riftkit")
        })
    }
}

/// Builder for [`Config`], starting from the defaults.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn lockfile_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.lockfile_paths.push(path.into());
        self
    }

    pub fn poll_interval_secs(mut self, secs: u64) -> Self {
        self.config.poll_interval_secs = secs;
        self
    }

    pub fn seen_capacity(mut self, capacity: usize) -> Self {
        self.config.seen_capacity = capacity;
        self
    }

    pub fn data_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.data_dir = Some(path.into());
        self
    }

    pub fn ffmpeg_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.ffmpeg_path = Some(path.into());
        self
    }

    pub fn mail_api(mut self, url: &str) -> Self {
        self.config.mail_api = url.to_string();
        self
    }

    pub fn rates_api(mut self, url: &str) -> Self {
        self.config.rates_api = url.to_string();
        self
    }

    pub fn points_per_unit(mut self, rate: f64, currency: &str) -> Self {
        self.config.points_per_unit = rate;
        self.config.points_currency = currency.to_uppercase();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

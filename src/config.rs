//! Application configuration: backend endpoint, asset location, request
//! timeouts and scene tuning.
//!
//! Values come from built-in defaults, then an optional TOML file, then
//! command-line overrides, in that order.

use crate::candidate::CandidateParameters;
use crate::http_client::RequestTimeouts;
use crate::orbit::DEFAULT_SPIN_STEP;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_ASSETS_DIR: &str = "assets/textures";
/// Upper bound for either request timeout.
pub const MAX_TIMEOUT_SECS: f64 = 3600.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend_url: String,
    pub assets_dir: PathBuf,
    pub request: RequestConfig,
    pub scene: SceneConfig,
    pub candidate: CandidateParameters,
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RequestConfig {
    pub connect_timeout_secs: f64,
    pub timeout_secs: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub star_count: usize,
    pub star_radius: f64,
    pub star_depth: f64,
    pub star_seed: u64,
    /// Radians added to every body's spin per rendered frame.
    pub spin_step: f64,
    /// Pixel size of the CPU-rendered sphere sprites.
    pub sprite_size: usize,
    /// Textures wider than this are downscaled after decoding.
    pub max_texture_width: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            assets_dir: PathBuf::from(DEFAULT_ASSETS_DIR),
            request: RequestConfig::default(),
            scene: SceneConfig::default(),
            candidate: CandidateParameters::default(),
        }
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        let timeouts = RequestTimeouts::default();
        Self {
            connect_timeout_secs: timeouts.connect.as_secs_f64(),
            timeout_secs: timeouts.overall.as_secs_f64(),
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            star_count: 5000,
            star_radius: 200.0,
            star_depth: 50.0,
            star_seed: 0x5eed,
            spin_step: DEFAULT_SPIN_STEP,
            sprite_size: 96,
            max_texture_width: 1024,
        }
    }
}

impl RequestConfig {
    pub fn timeouts(&self) -> RequestTimeouts {
        RequestTimeouts {
            connect: Duration::from_secs_f64(self.connect_timeout_secs),
            overall: Duration::from_secs_f64(self.timeout_secs),
        }
    }
}

/// Values supplied on the command line. `None` keeps the configured value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigOverrides {
    pub backend_url: Option<String>,
    pub assets_dir: Option<PathBuf>,
    pub timeout_secs: Option<f64>,
}

impl AppConfig {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AppConfig = toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply each command-line override on its own. An override that would
    /// leave the config invalid is skipped and returned; the others still
    /// take effect.
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) -> Vec<ConfigError> {
        let mut rejected = Vec::new();
        if let Some(url) = overrides.backend_url {
            self.try_override(&mut rejected, |c| c.backend_url = url);
        }
        if let Some(dir) = overrides.assets_dir {
            self.try_override(&mut rejected, |c| c.assets_dir = dir);
        }
        if let Some(secs) = overrides.timeout_secs {
            self.try_override(&mut rejected, |c| c.request.timeout_secs = secs);
        }
        rejected
    }

    fn try_override(&mut self, rejected: &mut Vec<ConfigError>, change: impl FnOnce(&mut Self)) {
        let mut trial = self.clone();
        change(&mut trial);
        match trial.validate() {
            Ok(()) => *self = trial,
            Err(err) => rejected.push(err),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.backend_url.starts_with("http://") || self.backend_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                field: "backend_url",
                reason: format!("expected an http(s) URL, got {:?}", self.backend_url),
            });
        }
        for (field, secs) in [
            ("request.connect_timeout_secs", self.request.connect_timeout_secs),
            ("request.timeout_secs", self.request.timeout_secs),
        ] {
            if !secs.is_finite() || secs <= 0.0 {
                return Err(ConfigError::Invalid { field, reason: format!("must be positive, got {secs}") });
            }
            if secs > MAX_TIMEOUT_SECS {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be at most {MAX_TIMEOUT_SECS} seconds, got {secs}"),
                });
            }
        }
        if self.scene.star_radius <= 0.0 || self.scene.star_depth < 0.0 {
            return Err(ConfigError::Invalid {
                field: "scene.star_radius",
                reason: "star shell must have a positive radius and non-negative depth".to_string(),
            });
        }
        if self.scene.sprite_size < 8 {
            return Err(ConfigError::Invalid {
                field: "scene.sprite_size",
                reason: format!("must be at least 8 pixels, got {}", self.scene.sprite_size),
            });
        }
        Ok(())
    }
}

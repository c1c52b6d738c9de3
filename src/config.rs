//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`TRIALGEN_SECTION__KEY`)

use figment::{Figment, providers::{Format, Toml, Env}};
use serde::{Serialize, Deserialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use trialgen_core::{TerminationPolicy, DEFAULT_FLOOR_Y, DEFAULT_FRAME_CAP};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Output locations and dataset size
    #[serde(default)]
    pub output: OutputConfig,
    /// Rendered image settings
    #[serde(default)]
    pub image: ImageConfig,
    /// Engine connection and scene quality
    #[serde(default)]
    pub engine: EngineConfig,
    /// Trial termination limits
    #[serde(default)]
    pub trial: TrialConfig,
    /// Which bundled scenario to run
    #[serde(default)]
    pub scenario: ScenarioConfig,
    /// Debug configuration
    #[serde(default)]
    pub debug: DebugConfig,
}

impl AppConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`TRIALGEN_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        // Load user config (optional)
        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // Environment variables override everything
        // TRIALGEN_OUTPUT__TRIAL_COUNT=5 -> output.trial_count = 5
        figment = figment.merge(Env::prefixed("TRIALGEN_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }

    /// Check values that would otherwise fail only after the engine is running
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));
        let output = &self.output;
        if output.root_dir.as_os_str().is_empty() {
            return invalid("output.root_dir must not be empty");
        }
        if output.root_dir.is_file() {
            return invalid("output.root_dir is a file");
        }
        if output.trial_count == 0 {
            return invalid("output.trial_count must be positive");
        }
        if output.temp_path.as_os_str().is_empty() || output.temp_path.is_dir() {
            return invalid("output.temp_path must be a file path");
        }
        if output.temp_path.parent() == Some(output.root_dir.as_path())
            && output.temp_path.extension().and_then(|e| e.to_str())
                == Some(output.file_extension.as_str())
        {
            return invalid("output.temp_path must not look like a trial file inside output.root_dir");
        }
        if output.file_extension.is_empty() {
            return invalid("output.file_extension must not be empty");
        }
        if output.index_width == 0 {
            return invalid("output.index_width must be positive");
        }
        if self.image.width == 0 || self.image.height == 0 {
            return invalid("image.width and image.height must be positive");
        }
        if self.trial.frame_cap == 0 {
            return invalid("trial.frame_cap must be positive");
        }
        if self.engine.unload_bundles_every == 0 {
            return invalid("engine.unload_bundles_every must be positive");
        }
        Ok(())
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving the numbered trial files
    pub root_dir: PathBuf,
    /// Staging file reused by every trial
    pub temp_path: PathBuf,
    /// Number of trials in the dataset
    pub trial_count: u32,
    /// Extension of trial files
    pub file_extension: String,
    /// Digits in trial file names
    pub index_width: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("output"),
            temp_path: PathBuf::from("output/temp.part"),
            trial_count: 100,
            file_extension: "zip".to_string(),
            index_width: 4,
        }
    }
}

/// Image configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub width: u32,
    pub height: u32,
    /// Passes captured every frame
    pub pass_masks: Vec<String>,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            width: 256,
            height: 256,
            pass_masks: ["_img", "_id", "_depth", "_normals", "_flow"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// `host:port` of the engine
    pub address: String,
    pub connect_timeout_secs: u64,
    pub render_quality: u32,
    pub solver_iterations: u32,
    pub sleep_threshold: f32,
    pub shadow_strength: f32,
    /// Unload asset bundles every this many trials
    pub unload_bundles_every: u32,
}

impl EngineConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:1071".to_string(),
            connect_timeout_secs: 30,
            render_quality: 5,
            solver_iterations: 32,
            sleep_threshold: 0.1,
            shadow_strength: 1.0,
            unload_bundles_every: 100,
        }
    }
}

/// Trial configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrialConfig {
    /// Last frame index recorded before a trial is forced to stop
    pub frame_cap: u32,
    /// Height below which objects are left out of the sleeping check
    pub floor_y: f32,
}

impl TrialConfig {
    pub fn policy(&self) -> TerminationPolicy {
        TerminationPolicy {
            frame_cap: self.frame_cap,
            floor_y: self.floor_y,
        }
    }
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            frame_cap: DEFAULT_FRAME_CAP,
            floor_y: DEFAULT_FLOOR_Y,
        }
    }
}

/// Scenario configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// `drop` or `drape`
    pub name: String,
    /// Seed for scenario randomness (random when unset)
    pub seed: Option<u64>,
    /// Prefix of model asset URLs; a model's URL is `<base>/<name>`
    pub model_url_base: String,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            name: "drop".to_string(),
            seed: None,
            model_url_base: "models".to_string(),
        }
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Load(#[from] figment::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Album root used on Android when no config file exists yet
pub const ANDROID_DEFAULT_ROOT: &str = "/storage/emulated/0/MyAlbum";
/// Where the stock camera app saves photos on Android
pub const ANDROID_DEFAULT_CAMERA_DIR: &str = "/storage/emulated/0/DCIM/Camera";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// How captured media reaches the album folder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureStrategy {
    /// The camera writes straight to a file inside the album
    #[default]
    DirectOutput,
    /// The camera saves to its own folder and the app moves the file afterwards
    CaptureThenMove,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub image_prefix: String,
    pub video_prefix: String,
    pub strategy: CaptureStrategy,
    /// Watched by the capture-then-move strategy
    pub camera_dir: Option<PathBuf>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            image_prefix: "IMG".to_string(),
            video_prefix: "VID".to_string(),
            strategy: CaptureStrategy::default(),
            camera_dir: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub root_path: PathBuf,
    #[serde(default)]
    pub capture: CaptureConfig,
}

impl Config {
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
            capture: CaptureConfig::default(),
        }
    }

    /// Defaults for a fresh Android install
    pub fn android_default() -> Self {
        Self {
            root_path: PathBuf::from(ANDROID_DEFAULT_ROOT),
            capture: CaptureConfig {
                strategy: CaptureStrategy::CaptureThenMove,
                camera_dir: Some(PathBuf::from(ANDROID_DEFAULT_CAMERA_DIR)),
                ..CaptureConfig::default()
            },
        }
    }

    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the configured paths
        config.root_path = Self::expand_path(&config.root_path).unwrap_or(config.root_path);
        config.capture.camera_dir = config
            .capture
            .camera_dir
            .map(|dir| Self::expand_path(&dir).unwrap_or(dir));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/myalbum");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

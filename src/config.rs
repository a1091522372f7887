use crate::defaults;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub audio: AudioConfig,
    pub stt: SttConfig,
    pub hub: HubConfig,
}

/// Local sample storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// Base directory for the audio tree and the metadata ledger.
    /// Defaults to the platform data directory (e.g. ~/.local/share/voicebank).
    pub base_dir: Option<PathBuf>,
}

/// Audio capture configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub device: Option<String>,
    pub sample_rate: u32,
}

/// Speech-to-text configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SttConfig {
    pub model: String,
    pub language: String,
}

/// Remote dataset repository configuration.
///
/// The bearer token is deliberately not part of the config file; it is read
/// from the environment at startup (see [`HubConfig::token`]).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HubConfig {
    pub repo_id: Option<String>,
    pub endpoint: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: defaults::RECORD_SAMPLE_RATE,
        }
    }
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            model: defaults::DEFAULT_MODEL.to_string(),
            language: defaults::DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            repo_id: None,
            endpoint: defaults::HUB_ENDPOINT.to_string(),
        }
    }
}

impl HubConfig {
    /// Read the Hub bearer token from the environment.
    ///
    /// The token is supplied as process-wide configuration; it is never
    /// rotated or refreshed at runtime.
    pub fn token() -> Option<String> {
        std::env::var(defaults::HUB_TOKEN_ENV)
            .ok()
            .filter(|t| !t.is_empty())
    }
}

impl StorageConfig {
    /// Resolve the base directory for local sample storage.
    ///
    /// Uses the configured directory when set, otherwise the platform data
    /// directory (e.g. `~/.local/share/voicebank`).
    pub fn resolve_base_dir(&self) -> PathBuf {
        self.base_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from(".local/share"))
                .join("voicebank")
        })
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if the file is missing
    ///
    /// Only a missing file yields defaults; invalid TOML is an error.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Ok(Self::default())
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - VOICEBANK_MODEL → stt.model
    /// - VOICEBANK_LANGUAGE → stt.language
    /// - VOICEBANK_AUDIO_DEVICE → audio.device
    /// - VOICEBANK_BASE_DIR → storage.base_dir
    /// - HF_REPO_ID → hub.repo_id
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(model) = std::env::var("VOICEBANK_MODEL")
            && !model.is_empty()
        {
            self.stt.model = model;
        }

        if let Ok(language) = std::env::var("VOICEBANK_LANGUAGE")
            && !language.is_empty()
        {
            self.stt.language = language;
        }

        if let Ok(device) = std::env::var("VOICEBANK_AUDIO_DEVICE")
            && !device.is_empty()
        {
            self.audio.device = Some(device);
        }

        if let Ok(base_dir) = std::env::var("VOICEBANK_BASE_DIR")
            && !base_dir.is_empty()
        {
            self.storage.base_dir = Some(PathBuf::from(base_dir));
        }

        if let Ok(repo_id) = std::env::var("HF_REPO_ID")
            && !repo_id.is_empty()
        {
            self.hub.repo_id = Some(repo_id);
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/voicebank/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("voicebank")
            .join("config.toml")
    }

    /// Render the full configuration as TOML for `config list`.
    pub fn to_display_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

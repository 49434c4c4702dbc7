use anyhow::{anyhow, Context, Result};
use jsonc_parser::{parse_to_serde_value, ParseOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::wav::{PcmFormat, WavError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default = "default_channels")]
    pub channels: u32,

    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    #[serde(default = "default_bits_per_sample")]
    pub bits_per_sample: u32,

    #[serde(default)]
    pub overwrite: bool,

    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    #[serde(default)]
    pub output_dir: Option<String>,
}

fn default_channels() -> u32 {
    1
}

fn default_sample_rate() -> u32 {
    16_000
}

fn default_bits_per_sample() -> u32 {
    16
}

fn default_max_concurrency() -> usize {
    4
}

impl Default for Config {
    fn default() -> Self {
        Self {
            channels: default_channels(),
            sample_rate: default_sample_rate(),
            bits_per_sample: default_bits_per_sample(),
            overwrite: false,
            max_concurrency: default_max_concurrency(),
            output_dir: None,
        }
    }
}

impl Config {
    pub fn pcm_format(&self) -> Result<PcmFormat, WavError> {
        PcmFormat::new(self.channels, self.sample_rate, self.bits_per_sample)
    }
}

#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: Config,
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn load() -> Result<Self> {
        let config_dir = directories::ProjectDirs::from("", "", "pcm2wav-rs")
            .context("Failed to get config directory")?
            .config_dir()
            .to_path_buf();

        fs::create_dir_all(&config_dir).context("Failed to create config directory")?;

        Self::load_or_init(&config_dir)
    }

    /// Load a specific config file. Unlike [`ConfigManager::load`], a missing
    /// file is an error rather than a reason to write defaults.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let config_path = path.as_ref().to_path_buf();
        let config = Self::read_config_from_disk(&config_path)?;
        tracing::debug!("Loaded config from: {:?}", config_path);
        Ok(Self {
            config,
            config_path,
        })
    }

    fn load_or_init(config_dir: &Path) -> Result<Self> {
        let jsonc_path = config_dir.join("config.jsonc");
        let legacy_path = config_dir.join("config.json");

        let (config_path, config) = if jsonc_path.exists() {
            let config = Self::read_config_from_disk(&jsonc_path)?;
            (jsonc_path, config)
        } else if legacy_path.exists() {
            let config = Self::read_config_from_disk(&legacy_path)?;
            Self::write_config_file(&jsonc_path, &config)?;
            tracing::info!(
                "Migrated legacy config to JSONC: {:?} -> {:?}",
                legacy_path,
                jsonc_path
            );
            (jsonc_path, config)
        } else {
            let default_config = Config::default();
            Self::write_config_file(&jsonc_path, &default_config)?;
            tracing::info!("Created default config at: {:?}", jsonc_path);
            (jsonc_path, default_config)
        };

        tracing::debug!("Loaded config from: {:?}", config_path);

        Ok(Self {
            config,
            config_path,
        })
    }

    pub fn get(&self) -> Config {
        self.config.clone()
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn save(&mut self, config: Config) -> Result<()> {
        Self::write_config_file(&self.config_path, &config)?;
        self.config = config;
        tracing::info!("Saved config to: {:?}", self.config_path);
        Ok(())
    }

    fn read_config_from_disk(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at {:?}", path))?;
        Self::parse_config(&content)
    }

    fn write_config_file(path: &Path, config: &Config) -> Result<()> {
        let json = serde_json::to_string_pretty(config).context("Failed to serialize config")?;
        fs::write(path, json).with_context(|| format!("Failed to write config file at {:?}", path))
    }

    fn parse_config(content: &str) -> Result<Config> {
        let value = parse_to_serde_value(content, &ParseOptions::default())
            .context("Failed to parse config as JSONC")?
            .ok_or_else(|| anyhow!("Config file did not contain a JSON value"))?;
        serde_json::from_value(value).context("Failed to deserialize config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_jsonc_with_comments_and_defaults() {
        let content = r#"{
            // narrowband telephony capture
            "sample_rate": 8000,
            "channels": 2,
        }"#;
        let config = ConfigManager::parse_config(content).expect("parse config");

        assert_eq!(config.sample_rate, 8_000);
        assert_eq!(config.channels, 2);
        assert_eq!(config.bits_per_sample, 16);
        assert_eq!(config.max_concurrency, 4);
        assert!(!config.overwrite);
    }

    #[test]
    fn empty_document_is_rejected() {
        assert!(ConfigManager::parse_config("").is_err());
    }

    #[test]
    fn default_config_is_a_valid_format() {
        let format = Config::default().pcm_format().expect("valid default");
        assert_eq!(format.byte_rate(), 32_000);
    }

    #[test]
    fn unsupported_config_values_surface_wav_error() {
        let config = Config {
            bits_per_sample: 24,
            ..Config::default()
        };
        assert_eq!(
            config.pcm_format(),
            Err(WavError::InvalidBitsPerSample(24))
        );
    }

    #[test]
    fn writes_defaults_when_no_config_exists() {
        let dir = tempfile::tempdir().expect("tempdir");
        let manager = ConfigManager::load_or_init(dir.path()).expect("load");

        assert_eq!(manager.get(), Config::default());
        assert_eq!(manager.config_path(), dir.path().join("config.jsonc"));
        assert!(manager.config_path().exists());
    }

    #[test]
    fn migrates_legacy_json_config() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("config.json"), r#"{"channels": 2}"#).expect("write legacy");

        let manager = ConfigManager::load_or_init(dir.path()).expect("load");

        assert_eq!(manager.get().channels, 2);
        assert!(dir.path().join("config.jsonc").exists());
    }

    #[test]
    fn save_round_trips_through_load_from() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut manager = ConfigManager::load_or_init(dir.path()).expect("load");

        let updated = Config {
            overwrite: true,
            output_dir: Some("out".to_string()),
            ..Config::default()
        };
        manager.save(updated.clone()).expect("save");

        let reloaded = ConfigManager::load_from(manager.config_path()).expect("reload");
        assert_eq!(reloaded.get(), updated);
    }

    #[test]
    fn load_from_missing_file_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(ConfigManager::load_from(dir.path().join("nope.jsonc")).is_err());
    }
}

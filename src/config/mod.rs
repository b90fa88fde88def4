use crate::global;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub whisper: WhisperConfig,
    pub audio: AudioConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Built frontend assets, served first
    pub public_dir: PathBuf,
    /// Frontend sources, served when a file is missing from `public_dir`
    pub frontend_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WhisperConfig {
    /// Directory holding the whisper.cpp executable and ggml model files
    pub directory: PathBuf,
    /// Model name, e.g. "small" for ggml-small.bin
    pub model: String,
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub temp_dir: PathBuf,
    pub max_duration_seconds: f64,
    pub max_file_size_bytes: u64,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            public_dir: PathBuf::from("public"),
            frontend_dir: PathBuf::from("frontend"),
        }
    }
}

impl Default for WhisperConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("whisper"),
            model: "small".to_string(),
            language: "id".to_string(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            temp_dir: std::env::temp_dir(),
            max_duration_seconds: 4.0,
            max_file_size_bytes: 5 * 1024 * 1024,
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
        }
    }
}

impl Config {
    /// Load the user config file (creating a default one if missing), then
    /// apply environment overrides.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if !config_path.exists() {
            info!(
                "Config file not found, creating default at {:?}",
                config_path
            );
            let config = Self::default();
            config.save()?;
            return config.with_env_overrides(|key| std::env::var(key).ok());
        }

        Self::load_from(&config_path)?.with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Load an explicit config file without environment overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Self = toml::from_str(&content).context("Failed to parse config file")?;

        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Apply `PORT`, `WHISPER_PATH`, `WHISPER_MODEL`, `WHISPER_LANGUAGE` and
    /// `TEMP_DIR` from `lookup`.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid PORT value '{}'", port))?;
        }
        if let Some(dir) = lookup("WHISPER_PATH") {
            self.whisper.directory = PathBuf::from(dir);
        }
        if let Some(model) = lookup("WHISPER_MODEL") {
            self.whisper.model = model;
        }
        if let Some(language) = lookup("WHISPER_LANGUAGE") {
            self.whisper.language = language;
        }
        if let Some(dir) = lookup("TEMP_DIR") {
            self.audio.temp_dir = PathBuf::from(dir);
        }

        Ok(self)
    }

    fn config_path() -> Result<PathBuf> {
        global::config_file()
    }
}

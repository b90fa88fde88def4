use anyhow::Result;
use serde_json::Value;
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::config::WhisperConfig;

pub mod providers;

pub use providers::{TranscriptionProvider, WhisperCppProvider, WhisperStatus};

#[derive(Debug, Error)]
pub enum TranscriptionError {
    #[error("Whisper.cpp not configured: {0}")]
    NotConfigured(String),
    #[error("Whisper.cpp transcription failed: {0}")]
    Failed(String),
    #[error("No speech recognized")]
    Empty,
}

pub struct Transcriber {
    provider: Box<dyn TranscriptionProvider>,
    language: String,
}

impl Transcriber {
    pub fn from_config(config: &WhisperConfig) -> Result<Self> {
        let provider = WhisperCppProvider::new(&config.directory, &config.model)?;
        Ok(Self::with_provider(Box::new(provider), &config.language))
    }

    pub fn with_provider(provider: Box<dyn TranscriptionProvider>, language: &str) -> Self {
        info!("Using {} for transcription ({})", provider.name(), language);
        Self {
            provider,
            language: language.to_string(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.provider.name()
    }

    pub fn is_available(&self) -> bool {
        self.provider.is_available()
    }

    pub fn status(&self) -> Value {
        self.provider.status()
    }

    pub async fn transcribe(&self, audio_path: &Path) -> Result<String, TranscriptionError> {
        self.provider.transcribe(audio_path, &self.language).await
    }
}

use crate::normalizer::{TranscriptionNormalizer, WhisperCppNormalizer};
use crate::transcription::{TranscriptionError, TranscriptionProvider};
use anyhow::Result;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Executable names tried in order inside the whisper directory.
const EXECUTABLE_NAMES: [&str; 2] = ["main", "whisper-cli"];

/// Local whisper.cpp installation: `<dir>/main` plus `<dir>/ggml-<model>.bin`.
pub struct WhisperCppProvider {
    directory: PathBuf,
    model: String,
    normalizer: WhisperCppNormalizer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhisperStatus {
    pub directory: PathBuf,
    pub executable_path: PathBuf,
    pub executable_exists: bool,
    pub model_name: String,
    pub model_path: PathBuf,
    pub model_exists: bool,
    pub configured: bool,
}

impl WhisperCppProvider {
    pub fn new(directory: impl Into<PathBuf>, model: impl Into<String>) -> Result<Self> {
        Ok(Self {
            directory: directory.into(),
            model: model.into(),
            normalizer: WhisperCppNormalizer::new()?,
        })
    }

    pub fn executable_path(&self) -> PathBuf {
        EXECUTABLE_NAMES
            .iter()
            .map(|name| self.directory.join(name))
            .find(|path| path.is_file())
            .unwrap_or_else(|| self.directory.join(EXECUTABLE_NAMES[0]))
    }

    pub fn model_path(&self) -> PathBuf {
        self.directory.join(format!("ggml-{}.bin", self.model))
    }

    pub fn whisper_status(&self) -> WhisperStatus {
        let executable_path = self.executable_path();
        let model_path = self.model_path();
        let executable_exists = executable_path.is_file();
        let model_exists = model_path.is_file();

        debug!(
            "whisper.cpp executable {:?}: {}, model {:?}: {}",
            executable_path,
            if executable_exists { "found" } else { "not found" },
            model_path,
            if model_exists { "found" } else { "not found" }
        );

        WhisperStatus {
            directory: self.directory.clone(),
            executable_path,
            executable_exists,
            model_name: self.model.clone(),
            model_path,
            model_exists,
            configured: executable_exists && model_exists,
        }
    }

    async fn run(&self, audio_path: &Path, language: &str) -> Result<String, TranscriptionError> {
        let status = self.whisper_status();
        if !status.configured {
            return Err(TranscriptionError::NotConfigured(format!(
                "expected {} and {}",
                status.executable_path.display(),
                status.model_path.display()
            )));
        }

        info!(
            "Transcribing {:?} with whisper.cpp model '{}' ({})",
            audio_path, self.model, language
        );

        // -nt: no timestamps, -np: only print the transcription
        let output = Command::new(&status.executable_path)
            .arg("-m")
            .arg(&status.model_path)
            .arg("-f")
            .arg(audio_path)
            .args(["-l", language])
            .args(["-nt", "-np"])
            .output()
            .await
            .map_err(|e| TranscriptionError::Failed(format!("failed to spawn whisper.cpp: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TranscriptionError::Failed(format!(
                "whisper.cpp exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let transcription = self
            .normalizer
            .normalize(&String::from_utf8_lossy(&output.stdout));

        if transcription.is_empty() {
            warn!("Empty transcription received from whisper.cpp");
            return Err(TranscriptionError::Empty);
        }

        info!("Transcription: {}", transcription);
        Ok(transcription)
    }
}

impl TranscriptionProvider for WhisperCppProvider {
    fn name(&self) -> &'static str {
        "whisper.cpp"
    }

    fn is_available(&self) -> bool {
        self.whisper_status().configured
    }

    fn status(&self) -> Value {
        serde_json::to_value(self.whisper_status()).unwrap_or(Value::Null)
    }

    fn transcribe<'a>(
        &'a self,
        audio_path: &'a Path,
        language: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, TranscriptionError>> + Send + 'a>> {
        Box::pin(self.run(audio_path, language))
    }
}

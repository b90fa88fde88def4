use crate::transcription::TranscriptionError;
use serde_json::Value;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;

pub mod whisper_cpp;

pub use whisper_cpp::{WhisperCppProvider, WhisperStatus};

pub trait TranscriptionProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn is_available(&self) -> bool;

    /// Provider details reported by the health endpoint
    fn status(&self) -> Value;

    fn transcribe<'a>(
        &'a self,
        audio_path: &'a Path,
        language: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, TranscriptionError>> + Send + 'a>>;
}

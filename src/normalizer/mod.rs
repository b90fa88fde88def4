//! Cleanup of raw speech-recognizer output.
//!
//! These normalizers only turn engine stdout into the transcript the player
//! "said". Comparison against the target word lives in [`crate::matching`].

mod transcription_normalizer;
mod whisper_cpp;

pub use transcription_normalizer::TranscriptionNormalizer;
pub use whisper_cpp::WhisperCppNormalizer;

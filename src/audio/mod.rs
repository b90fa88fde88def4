//! Temporary audio file handling for uploaded recordings.
//!
//! Uploaded clips are written to the temp directory, checked against the size
//! and duration limits, and converted to the 16 kHz mono PCM WAV that
//! whisper.cpp expects. Callers own the returned paths and must clean them up.

use crate::config::AudioConfig;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};
use uuid::Uuid;
use which::which;

const DEFAULT_EXTENSION: &str = "webm";

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("File too large: {:.2}MB (max {}MB)", mib(.size), mib(.max))]
    TooLarge { size: u64, max: u64 },
    #[error("Audio too long: {duration:.1}s (max {max}s)")]
    TooLong { duration: f64, max: f64 },
    #[error("Validation failed: {0}")]
    Probe(String),
    #[error("Audio conversion failed: {0}")]
    Conversion(String),
    #[error("Audio file I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

fn mib(bytes: &u64) -> f64 {
    *bytes as f64 / 1024.0 / 1024.0
}

/// Size and duration of an accepted clip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioInfo {
    pub size: u64,
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioEnvironment {
    pub ffmpeg: bool,
    pub ffprobe: bool,
    pub temp_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct AudioProcessor {
    config: AudioConfig,
}

impl AudioProcessor {
    pub fn new(config: AudioConfig) -> Self {
        Self { config }
    }

    /// Which external tools the pipeline depends on are reachable.
    pub fn environment(&self) -> AudioEnvironment {
        AudioEnvironment {
            ffmpeg: which(&self.config.ffmpeg_path).is_ok(),
            ffprobe: which(&self.config.ffprobe_path).is_ok(),
            temp_dir: self.config.temp_dir.clone(),
        }
    }

    /// Reject uploads over the size limit before anything touches the disk.
    pub fn check_size(&self, size: u64) -> Result<(), AudioError> {
        if size > self.config.max_file_size_bytes {
            return Err(AudioError::TooLarge {
                size,
                max: self.config.max_file_size_bytes,
            });
        }
        Ok(())
    }

    /// Write `data` to `audio_<uuid>.<extension>` in the temp directory.
    pub async fn save_to_temp_file(&self, data: &[u8], extension: &str) -> Result<PathBuf, AudioError> {
        let filename = format!("audio_{}.{}", Uuid::new_v4(), sanitize_extension(extension));
        let path = self.config.temp_dir.join(filename);

        tokio::fs::create_dir_all(&self.config.temp_dir).await?;
        tokio::fs::write(&path, data).await?;
        debug!("Saved {} bytes of audio to {:?}", data.len(), path);

        Ok(path)
    }

    /// Check the file against the size and duration limits.
    pub async fn validate_audio_file(&self, path: &Path) -> Result<AudioInfo, AudioError> {
        let size = tokio::fs::metadata(path).await?.len();
        self.check_size(size)?;

        let duration = self.probe_duration(path).await?;
        if duration > self.config.max_duration_seconds {
            return Err(AudioError::TooLong {
                duration,
                max: self.config.max_duration_seconds,
            });
        }

        Ok(AudioInfo { size, duration })
    }

    async fn probe_duration(&self, path: &Path) -> Result<f64, AudioError> {
        let output = Command::new(&self.config.ffprobe_path)
            .args(["-v", "error"])
            .args(["-show_entries", "format=duration"])
            .args(["-of", "default=noprint_wrappers=1:nokey=1"])
            .arg(path)
            .output()
            .await
            .map_err(|e| AudioError::Probe(format!("Failed to spawn ffprobe: {}", e)))?;

        if !output.status.success() {
            return Err(AudioError::Probe(format!(
                "ffprobe exited with {}",
                output.status
            )));
        }

        parse_duration(&String::from_utf8_lossy(&output.stdout))
    }

    /// Convert to 16 kHz mono 16-bit PCM WAV next to the input file.
    pub async fn convert_to_wav(&self, input: &Path) -> Result<PathBuf, AudioError> {
        let output_path = wav_path_for(input);

        let output = Command::new(&self.config.ffmpeg_path)
            .arg("-i")
            .arg(input)
            .args(["-ar", "16000"])
            .args(["-ac", "1"])
            .args(["-c:a", "pcm_s16le"])
            .arg("-y")
            .arg(&output_path)
            .output()
            .await
            .map_err(|e| AudioError::Conversion(format!("Failed to spawn ffmpeg: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AudioError::Conversion(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        info!("Converted {:?} to {:?}", input, output_path);
        Ok(output_path)
    }
}

/// Keep only ASCII alphanumerics; anything else falls back to webm.
pub fn sanitize_extension(extension: &str) -> String {
    let cleaned: String = extension
        .trim_start_matches('.')
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(8)
        .collect::<String>()
        .to_ascii_lowercase();

    if cleaned.is_empty() {
        DEFAULT_EXTENSION.to_string()
    } else {
        cleaned
    }
}

/// Path of the WAV produced for `input`. A `.wav` input gets a distinct name
/// so ffmpeg never reads and writes the same file.
pub fn wav_path_for(input: &Path) -> PathBuf {
    let is_wav = input
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("wav"))
        .unwrap_or(false);

    if is_wav {
        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("audio");
        input.with_file_name(format!("{}_16k.wav", stem))
    } else {
        input.with_extension("wav")
    }
}

fn parse_duration(output: &str) -> Result<f64, AudioError> {
    output
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite())
        .ok_or_else(|| AudioError::Probe("Could not parse duration".to_string()))
}

/// Remove a temporary file, logging instead of failing.
pub async fn cleanup_temp_file(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        warn!("Failed to cleanup temp file {:?}: {}", path, e);
    }
}

pub async fn cleanup_temp_files(paths: &[PathBuf]) {
    for path in paths {
        cleanup_temp_file(path).await;
    }
}

use anyhow::Result;
use regex::Regex;
use tracing::debug;

use crate::normalizer::TranscriptionNormalizer;

/// Normalizer for whisper.cpp stdout
pub struct WhisperCppNormalizer {
    timestamp_regex: Regex,
    marker_regex: Regex,
}

impl WhisperCppNormalizer {
    pub fn new() -> Result<Self> {
        // Matches timestamps like [00:00:00.000 --> 00:00:03.280] or [00:00:00:000 --> 00:00:03:280]
        let timestamp_regex =
            Regex::new(r"\[\d{2}:\d{2}:\d{2}[:.]\d{3}\s*-->\s*\d{2}:\d{2}:\d{2}[:.]\d{3}\]\s*")?;
        // Non-speech annotations: [BLANK_AUDIO], [MUSIC], (silence), ...
        let marker_regex = Regex::new(r"\[[A-Z_ ]+\]|\((?i:silence|music|noise|inaudible)\)")?;

        Ok(Self {
            timestamp_regex,
            marker_regex,
        })
    }
}

impl TranscriptionNormalizer for WhisperCppNormalizer {
    fn normalize(&self, raw_output: &str) -> String {
        let mut cleaned = String::new();

        for line in raw_output.lines() {
            let without_timestamps = self.timestamp_regex.replace_all(line, "");
            let without_markers = self.marker_regex.replace_all(&without_timestamps, "");
            let line_trimmed = without_markers.trim();

            if !line_trimmed.is_empty() {
                if !cleaned.is_empty() {
                    cleaned.push(' ');
                }
                cleaned.push_str(line_trimmed);
            }
        }

        debug!(
            "Normalized {} chars of whisper.cpp output to {} chars",
            raw_output.len(),
            cleaned.len()
        );

        cleaned
    }

    fn name(&self) -> &'static str {
        "WhisperCppNormalizer"
    }
}

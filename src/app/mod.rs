use crate::api::ApiServer;
use crate::audio::AudioProcessor;
use crate::config::Config;
use crate::transcription::Transcriber;
use anyhow::Result;
use tracing::{info, warn};

pub async fn run_service(config: Config) -> Result<()> {
    info!("Starting Baca & Ucap service");

    let transcriber = Transcriber::from_config(&config.whisper)?;
    if transcriber.is_available() {
        info!("whisper.cpp ready with model '{}'", config.whisper.model);
    } else {
        warn!(
            "whisper.cpp not found in {:?} (model '{}'); /api/transcribe will answer 503 until it is installed",
            config.whisper.directory, config.whisper.model
        );
    }

    let environment = AudioProcessor::new(config.audio.clone()).environment();
    if !environment.ffmpeg || !environment.ffprobe {
        warn!(
            "ffmpeg available: {}, ffprobe available: {}; audio uploads will fail without both",
            environment.ffmpeg, environment.ffprobe
        );
    }

    ApiServer::new(&config, transcriber).start().await
}

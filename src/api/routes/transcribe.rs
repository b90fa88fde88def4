//! Pronunciation check endpoint.
//!
//! POST /api/transcribe takes a multipart form with an `audio` file and the
//! `targetWord` the player was shown, runs the clip through ffmpeg and
//! whisper.cpp, and returns the match verdict.

use crate::api::error::{ApiError, ApiResult};
use crate::api::AppState;
use crate::audio::cleanup_temp_files;
use crate::matching::{evaluate_transcription, MatchResult};
use crate::transcription::TranscriptionError;
use axum::{
    extract::{multipart::Field, DefaultBodyLimit, Multipart, State},
    response::Json,
    routing::post,
    Router,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Room for multipart boundaries and the text fields on top of the audio.
const MULTIPART_OVERHEAD_BYTES: u64 = 1024 * 1024;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscribeResponse {
    pub target_word: String,
    #[serde(flatten)]
    pub result: MatchResult,
}

struct AudioUpload {
    data: Vec<u8>,
    extension: String,
}

#[derive(Default)]
struct TranscribeForm {
    audio: Option<AudioUpload>,
    target_word: Option<String>,
}

pub fn router(state: AppState, max_file_size_bytes: u64) -> Router {
    let body_limit = usize::try_from(max_file_size_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES))
        .unwrap_or(usize::MAX);

    Router::new()
        .route("/api/transcribe", post(transcribe))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

async fn transcribe(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<TranscribeResponse>> {
    let form = read_form(&mut multipart).await?;

    let audio = form
        .audio
        .ok_or_else(|| ApiError::bad_request("Missing audio file"))?;
    let target_word = form
        .target_word
        .filter(|word| !word.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing targetWord"))?;

    if !state.transcriber.is_available() {
        return Err(TranscriptionError::NotConfigured(
            "see /api/health for the expected executable and model paths".to_string(),
        )
        .into());
    }

    state.audio.check_size(audio.data.len() as u64)?;

    let input_path = state
        .audio
        .save_to_temp_file(&audio.data, &audio.extension)
        .await?;
    let mut temp_files = vec![input_path.clone()];

    let outcome = run_pipeline(&state, &input_path, &mut temp_files).await;
    cleanup_temp_files(&temp_files).await;
    let transcript = outcome?;

    let result = evaluate_transcription(&target_word, &transcript);
    info!(
        "Target '{}', heard '{}': {}",
        target_word,
        transcript,
        if result.is_correct() { "correct" } else { "incorrect" }
    );

    Ok(Json(TranscribeResponse {
        target_word,
        result,
    }))
}

/// Validate, convert and transcribe. Every file created is pushed onto
/// `temp_files` so the caller can remove them whatever the outcome.
async fn run_pipeline(
    state: &AppState,
    input_path: &Path,
    temp_files: &mut Vec<PathBuf>,
) -> ApiResult<String> {
    let info = state.audio.validate_audio_file(input_path).await?;
    debug!(
        "Accepted clip of {} bytes, {:.2}s",
        info.size, info.duration
    );

    let wav_path = state.audio.convert_to_wav(input_path).await?;
    temp_files.push(wav_path.clone());

    Ok(state.transcriber.transcribe(&wav_path).await?)
}

async fn read_form(multipart: &mut Multipart) -> ApiResult<TranscribeForm> {
    let mut form = TranscribeForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        match field.name() {
            Some("audio") => {
                let extension = upload_extension(&field);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read audio: {}", e)))?;
                form.audio = Some(AudioUpload {
                    data: data.to_vec(),
                    extension,
                });
            }
            Some("targetWord") => {
                let text = field.text().await.map_err(|e| {
                    ApiError::bad_request(format!("Failed to read targetWord: {}", e))
                })?;
                form.target_word = Some(text);
            }
            other => debug!("Ignoring multipart field {:?}", other),
        }
    }

    Ok(form)
}

/// Extension from the uploaded file name, else from the content type.
fn upload_extension(field: &Field<'_>) -> String {
    extension_from(field.file_name(), field.content_type())
}

fn extension_from(file_name: Option<&str>, content_type: Option<&str>) -> String {
    let from_name = file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str());

    let from_type = content_type
        .and_then(|mime| mime.split(';').next())
        .and_then(|mime| mime.trim().strip_prefix("audio/"))
        .map(|subtype| match subtype {
            "mpeg" => "mp3",
            "x-wav" | "wave" => "wav",
            other => other,
        });

    from_name.or(from_type).unwrap_or("webm").to_string()
}

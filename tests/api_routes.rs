//! Router tests for the HTTP API, run in-process with a fake recognizer.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use bacaucap::api::{build_router, AppState};
use bacaucap::audio::AudioProcessor;
use bacaucap::config::{AudioConfig, ServerConfig};
use bacaucap::transcription::{Transcriber, TranscriptionError, TranscriptionProvider};
use serde_json::{json, Value};
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "bacaucap-test-boundary";

/// Recognizer stand-in that "hears" a fixed transcript.
struct FakeRecognizer {
    available: bool,
    heard: &'static str,
}

impl TranscriptionProvider for FakeRecognizer {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn status(&self) -> Value {
        json!({ "configured": self.available })
    }

    fn transcribe<'a>(
        &'a self,
        audio_path: &'a Path,
        _language: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, TranscriptionError>> + Send + 'a>> {
        Box::pin(async move {
            if !audio_path.exists() {
                return Err(TranscriptionError::Failed(format!(
                    "{} does not exist",
                    audio_path.display()
                )));
            }
            Ok(self.heard.to_string())
        })
    }
}

struct TestApp {
    router: Router,
    audio_dir: TempDir,
    site_dir: TempDir,
}

fn test_app(recognizer: FakeRecognizer, audio: AudioConfig) -> TestApp {
    let audio_dir = TempDir::new().unwrap();
    let site_dir = TempDir::new().unwrap();

    let audio = AudioConfig {
        temp_dir: audio_dir.path().to_path_buf(),
        ..audio
    };
    let server = ServerConfig {
        public_dir: site_dir.path().join("public"),
        frontend_dir: site_dir.path().join("frontend"),
        ..ServerConfig::default()
    };
    let max_file_size_bytes = audio.max_file_size_bytes;
    let state = AppState {
        transcriber: Arc::new(Transcriber::with_provider(Box::new(recognizer), "id")),
        audio: AudioProcessor::new(audio),
    };

    TestApp {
        router: build_router(state, &server, max_file_size_bytes),
        audio_dir,
        site_dir,
    }
}

fn available(heard: &'static str) -> FakeRecognizer {
    FakeRecognizer {
        available: true,
        heard,
    }
}

enum Part<'a> {
    Audio(&'a [u8]),
    Text(&'a str, &'a str),
}

fn transcribe_request(parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Audio(data) => {
                body.extend_from_slice(
                    b"Content-Disposition: form-data; name=\"audio\"; filename=\"blob\"\r\n",
                );
                body.extend_from_slice(b"Content-Type: audio/webm;codecs=opus\r\n\r\n");
                body.extend_from_slice(data);
            }
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/transcribe")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

async fn send_json(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(router, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn leftover_files(dir: &TempDir) -> usize {
    std::fs::read_dir(dir.path()).unwrap().count()
}

#[tokio::test]
async fn test_health_reports_whisper_and_environment() {
    let app = test_app(available("buku"), AudioConfig::default());

    let (status, body) = send_json(app.router, get("/api/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["whisper"]["configured"], true);
    assert!(body["environment"].get("ffmpeg").is_some());
    assert!(body["environment"].get("ffprobe").is_some());
    assert!(body["environment"].get("tempDir").is_some());
}

#[tokio::test]
async fn test_transcribe_requires_audio() {
    let app = test_app(available("buku"), AudioConfig::default());

    let request = transcribe_request(&[Part::Text("targetWord", "buku")]);
    let (status, body) = send_json(app.router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("audio"));
}

#[tokio::test]
async fn test_transcribe_requires_target_word() {
    let app = test_app(available("buku"), AudioConfig::default());

    let request = transcribe_request(&[Part::Audio(b"fake audio data")]);
    let (status, body) = send_json(app.router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("targetWord"));
}

#[tokio::test]
async fn test_transcribe_rejects_blank_target_word() {
    let app = test_app(available("buku"), AudioConfig::default());

    let request = transcribe_request(&[
        Part::Audio(b"fake audio data"),
        Part::Text("targetWord", "   "),
    ]);
    let (status, body) = send_json(app.router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("targetWord"));
}

#[tokio::test]
async fn test_transcribe_without_whisper_is_unavailable() {
    let recognizer = FakeRecognizer {
        available: false,
        heard: "",
    };
    let app = test_app(recognizer, AudioConfig::default());

    let request = transcribe_request(&[
        Part::Audio(b"fake audio data"),
        Part::Text("targetWord", "buku"),
    ]);
    let (status, body) = send_json(app.router, request).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Whisper.cpp not configured"));
    assert_eq!(leftover_files(&app.audio_dir), 0);
}

#[tokio::test]
async fn test_transcribe_rejects_oversized_audio() {
    let audio = AudioConfig {
        max_file_size_bytes: 8,
        ..AudioConfig::default()
    };
    let app = test_app(available("buku"), audio);

    let request = transcribe_request(&[
        Part::Audio(b"definitely more than eight bytes"),
        Part::Text("targetWord", "buku"),
    ]);
    let (status, body) = send_json(app.router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("File too large"));
    assert_eq!(leftover_files(&app.audio_dir), 0);
}

#[tokio::test]
async fn test_static_files_prefer_public_then_frontend() {
    let app = test_app(available("buku"), AudioConfig::default());
    let public = app.site_dir.path().join("public");
    let frontend = app.site_dir.path().join("frontend");
    std::fs::create_dir_all(public.join("words")).unwrap();
    std::fs::create_dir_all(&frontend).unwrap();
    std::fs::write(public.join("words").join("words.csv"), "buku\nmeja\n").unwrap();
    std::fs::write(frontend.join("index.html"), "<h1>Baca & Ucap</h1>").unwrap();
    std::fs::write(frontend.join("game.js"), "// frontend copy").unwrap();
    std::fs::write(public.join("game.js"), "// public copy").unwrap();

    let (status, body) = send(app.router.clone(), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"<h1>Baca & Ucap</h1>");

    let (status, body) = send(app.router.clone(), get("/game.js")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"// public copy");

    let (status, body) = send(app.router.clone(), get("/words/words.csv")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"buku\nmeja\n");

    let (status, _) = send(app.router, get("/nonexistent-file-12345.html")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// Drives the whole pipeline with shell scripts standing in for ffprobe and
/// ffmpeg. Both cases live in one test so no script is executed while
/// another is still being written.
#[cfg(unix)]
#[tokio::test]
async fn test_transcribe_pipeline_with_stub_tools() {
    use std::os::unix::fs::PermissionsExt;

    let tools = TempDir::new().unwrap();
    let write_script = |name: &str, script: &str| {
        let path = tools.path().join(name);
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    };
    let ffprobe_short = write_script("ffprobe-short", "#!/bin/sh\necho 1.500000\n");
    let ffprobe_long = write_script("ffprobe-long", "#!/bin/sh\necho 9.000000\n");
    let ffmpeg = write_script(
        "ffmpeg",
        "#!/bin/sh\nfor arg in \"$@\"; do out=\"$arg\"; done\nprintf 'RIFF' > \"$out\"\n",
    );

    let app = test_app(
        available("  KUCING!!!  ya  "),
        AudioConfig {
            ffprobe_path: ffprobe_short,
            ffmpeg_path: ffmpeg.clone(),
            ..AudioConfig::default()
        },
    );
    let request = transcribe_request(&[
        Part::Audio(b"fake audio data"),
        Part::Text("targetWord", "kucing"),
    ]);
    let (status, body) = send_json(app.router, request).await;

    assert_eq!(status, StatusCode::OK, "body: {body}");
    assert_eq!(
        body,
        json!({
            "targetWord": "kucing",
            "transcript": "  KUCING!!!  ya  ",
            "normalizedTranscript": "kucing ya",
            "isCorrect": true
        })
    );
    assert_eq!(leftover_files(&app.audio_dir), 0);

    let app = test_app(
        available("meja"),
        AudioConfig {
            ffprobe_path: ffprobe_long,
            ffmpeg_path: ffmpeg,
            ..AudioConfig::default()
        },
    );
    let request = transcribe_request(&[
        Part::Audio(b"fake audio data"),
        Part::Text("targetWord", "buku"),
    ]);
    let (status, body) = send_json(app.router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Audio too long: 9.0s (max 4s)");
    assert_eq!(leftover_files(&app.audio_dir), 0);
}

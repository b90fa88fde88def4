//! HTTP server for the game.
//!
//! Provides:
//! - Pronunciation checks (POST /api/transcribe)
//! - Health information (GET /api/health)
//! - The browser frontend as static files

pub mod error;
pub mod routes;

use crate::audio::AudioProcessor;
use crate::config::{Config, ServerConfig};
use crate::transcription::Transcriber;
use anyhow::{Context, Result};
use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tracing::info;

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub transcriber: Arc<Transcriber>,
    pub audio: AudioProcessor,
}

pub struct ApiServer {
    server: ServerConfig,
    max_file_size_bytes: u64,
    state: AppState,
}

impl ApiServer {
    pub fn new(config: &Config, transcriber: Transcriber) -> Self {
        Self {
            server: config.server.clone(),
            max_file_size_bytes: config.audio.max_file_size_bytes,
            state: AppState {
                transcriber: Arc::new(transcriber),
                audio: AudioProcessor::new(config.audio.clone()),
            },
        }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone(), &self.server, self.max_file_size_bytes)
    }

    pub async fn start(self) -> Result<()> {
        let app = self.router();
        let addr = format!("{}:{}", self.server.host, self.server.port);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        info!("Server running on http://{}", addr);
        info!("Endpoints:");
        info!("  POST /api/transcribe - Check a spoken word (multipart: audio, targetWord)");
        info!("  GET  /api/health     - Whisper and ffmpeg status");
        info!(
            "  GET  /*              - Static files from {:?}, then {:?}",
            self.server.public_dir, self.server.frontend_dir
        );

        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// API routes, with everything else served from the public directory first
/// and the frontend directory second.
pub fn build_router(state: AppState, server: &ServerConfig, max_file_size_bytes: u64) -> Router {
    let static_files =
        ServeDir::new(&server.public_dir).fallback(ServeDir::new(&server.frontend_dir));

    Router::new()
        .merge(routes::transcribe::router(state.clone(), max_file_size_bytes))
        .merge(routes::health::router(state))
        .fallback_service(static_files)
        .layer(ServiceBuilder::new())
}

//! Backend for the Baca & Ucap read-aloud game.
//!
//! The interesting part is [`matching`], which decides whether a speech
//! transcript counts as a correct reading of the target word. The other
//! modules carry an uploaded clip from the browser through ffmpeg and
//! whisper.cpp to that check.

pub mod api;
pub mod app;
pub mod audio;
pub mod cli;
pub mod config;
pub mod global;
pub mod matching;
pub mod normalizer;
pub mod transcription;

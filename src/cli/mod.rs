use crate::audio::AudioProcessor;
use crate::config::Config;
use crate::matching::evaluate_transcription;
use crate::transcription::Transcriber;
use anyhow::{anyhow, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bacaucap")]
#[command(about = "Backend for the Baca & Ucap pronunciation game", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use this config file instead of the user config
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Run the HTTP server (default)
    Serve(ServeCliArgs),
    /// Judge a transcript against a target word and print the result
    Check(CheckCliArgs),
    /// Report whether whisper.cpp, ffmpeg and ffprobe are usable
    Doctor,
    /// Print version information
    Version,
}

#[derive(ClapArgs, Debug, Default)]
pub struct ServeCliArgs {
    /// Override the configured port
    #[arg(short, long)]
    pub port: Option<u16>,
}

#[derive(ClapArgs, Debug)]
pub struct CheckCliArgs {
    /// The word the player was asked to read
    pub target: String,
    /// What the recognizer heard
    pub transcript: String,
}

/// Config from `--config` when given, else the user config with environment
/// overrides.
pub fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path)?.with_env_overrides(|key| std::env::var(key).ok()),
        None => Config::load(),
    }
}

pub fn apply_serve_args(mut config: Config, args: &ServeCliArgs) -> Config {
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config
}

/// Prints the match result as JSON. Returns whether the reading was correct.
pub fn handle_check_command(args: &CheckCliArgs) -> Result<bool> {
    if args.target.trim().is_empty() {
        return Err(anyhow!("Target word must not be blank"));
    }

    let result = evaluate_transcription(&args.target, &args.transcript);
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(result.is_correct())
}

/// Prints tool availability as JSON. Returns whether everything is usable.
pub fn handle_doctor_command(config: &Config) -> Result<bool> {
    let transcriber = Transcriber::from_config(&config.whisper)?;
    let environment = AudioProcessor::new(config.audio.clone()).environment();
    let ready = transcriber.is_available() && environment.ffmpeg && environment.ffprobe;

    let report = json!({
        "ready": ready,
        "whisper": transcriber.status(),
        "environment": environment,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(ready)
}

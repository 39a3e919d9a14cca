use std::{io::Write, path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{load_settings, HttpNarrationClient, NarrationService, NarratorSettings};
use shared::{
    domain::{NarrationRequest, VoiceId, VoiceOption, DEFAULT_DOWNLOAD_FILENAME},
    error::NarrationError,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "narrate", about = "Turn text into narrated audio")]
struct Args {
    /// Text to narrate.
    #[arg(long, conflicts_with = "text_file")]
    text: Option<String>,
    /// Reads the text to narrate from a file.
    #[arg(long)]
    text_file: Option<PathBuf>,
    /// Voice id; defaults to the configured default voice.
    #[arg(long)]
    voice: Option<String>,
    /// Settings file; defaults to ./narrator.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    endpoint_url: Option<String>,
    /// Prints the available voices and exits.
    #[arg(long)]
    list_voices: bool,
    /// Saves the generated audio locally.
    #[arg(
        long,
        value_name = "PATH",
        num_args = 0..=1,
        default_missing_value = DEFAULT_DOWNLOAD_FILENAME
    )]
    download: Option<PathBuf>,
}

/// How a `narrate` invocation ended; mapped onto the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Success,
    InvalidInput,
    RequestFailed,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Success => ExitCode::SUCCESS,
            Outcome::InvalidInput => ExitCode::from(2),
            Outcome::RequestFailed => ExitCode::FAILURE,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let settings =
        load_settings(args.config.as_deref())?.with_endpoint_override(args.endpoint_url.clone());
    settings.validate().context("invalid endpoint override")?;

    let outcome = run(
        &args,
        &settings,
        &mut std::io::stdout().lock(),
        &mut std::io::stderr().lock(),
    )
    .await?;
    Ok(outcome.into())
}

/// The audio URL goes to `out`; user-facing messages go to `err`.
async fn run(
    args: &Args,
    settings: &NarratorSettings,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<Outcome> {
    if args.list_voices {
        write!(out, "{}", format_voice_list(&settings.voices))?;
        return Ok(Outcome::Success);
    }

    let text = read_text(args).await?;
    let voice_id = args
        .voice
        .clone()
        .map(VoiceId::new)
        .unwrap_or_else(|| settings.default_voice.clone());

    let request = match NarrationRequest::new(text, voice_id, &settings.voices) {
        Ok(request) => request,
        Err(validation) => {
            writeln!(err, "{}", NarrationError::from(validation).user_message())?;
            return Ok(Outcome::InvalidInput);
        }
    };

    let client = HttpNarrationClient::from_settings(settings)?;
    tracing::info!(
        endpoint = %client.endpoint_url(),
        voice_id = %request.voice_id(),
        characters = request.character_count(),
        "requesting narration"
    );

    let result = match client.generate_audio(&request).await {
        Ok(result) => result,
        Err(cause) => {
            tracing::error!("narration failed: {cause}");
            writeln!(err, "{}", cause.user_message())?;
            return Ok(Outcome::RequestFailed);
        }
    };
    writeln!(out, "{}", result.audio_url)?;

    if let Some(path) = &args.download {
        let bytes = match client.download_audio(&result.audio_url).await {
            Ok(bytes) => bytes,
            Err(cause) => {
                tracing::error!("audio download failed: {cause}");
                writeln!(err, "Failed to download audio from {}", result.audio_url)?;
                return Ok(Outcome::RequestFailed);
            }
        };
        tokio::fs::write(path, bytes)
            .await
            .with_context(|| format!("failed to save audio to {}", path.display()))?;
        writeln!(err, "Saved audio to {}", path.display())?;
    }

    Ok(Outcome::Success)
}

/// Missing input is treated as empty text so it hits the same validation path.
async fn read_text(args: &Args) -> Result<String> {
    match (&args.text, &args.text_file) {
        (Some(text), _) => Ok(text.clone()),
        (None, Some(path)) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display())),
        (None, None) => Ok(String::new()),
    }
}

fn format_voice_list(voices: &[VoiceOption]) -> String {
    let width = voices.iter().map(|v| v.id.as_str().len()).max().unwrap_or(0);
    voices
        .iter()
        .map(|voice| {
            format!(
                "{:<width$}  {} - {}\n",
                voice.id.as_str(),
                voice.name,
                voice.description
            )
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;

//! Runtime bridge between UI command queue and backend event intake.

use std::{path::PathBuf, thread};

use client_core::SharedNarrationService;
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    service: SharedNarrationService,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("failed to build backend runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(run_worker(cmd_rx, ui_tx, service));
        tracing::debug!("backend worker stopped");
    })
}

async fn run_worker(
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    service: SharedNarrationService,
) {
    #[cfg(feature = "audio-playback")]
    let player = crate::backend_bridge::playback::AudioPlayer::default();

    let _ = ui_tx.try_send(UiEvent::Info("Ready".to_string()));

    while let Ok(cmd) = cmd_rx.recv() {
        match cmd {
            BackendCommand::GenerateAudio {
                generation,
                request,
            } => {
                let service = service.clone();
                let ui_tx = ui_tx.clone();
                tokio::spawn(async move {
                    let outcome = service.generate_audio(&request).await;
                    if ui_tx
                        .send(UiEvent::NarrationFinished {
                            generation,
                            outcome,
                        })
                        .is_err()
                    {
                        tracing::debug!(generation, "ui closed before narration finished");
                    }
                });
            }
            BackendCommand::DownloadAudio {
                audio_url,
                filename,
            } => {
                let service = service.clone();
                let ui_tx = ui_tx.clone();
                tokio::spawn(async move {
                    let event = match download_to_user_file(&service, &audio_url, filename).await {
                        Ok(Some(path)) => UiEvent::AudioSaved(path),
                        Ok(None) => UiEvent::Info("Download cancelled".to_string()),
                        Err(err) => {
                            tracing::warn!("audio download failed: {err}");
                            UiEvent::Error(UiError::from_message(UiErrorContext::Download, err))
                        }
                    };
                    let _ = ui_tx.try_send(event);
                });
            }
            #[cfg(feature = "audio-playback")]
            BackendCommand::PlayAudio { audio_url } => {
                let service = service.clone();
                let ui_tx = ui_tx.clone();
                let player = player.clone();
                let signal = player.begin();
                tokio::spawn(async move {
                    let bytes = match service.download_audio(&audio_url).await {
                        Ok(bytes) => bytes,
                        Err(err) => {
                            tracing::warn!("failed to fetch audio for playback: {err}");
                            let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                                UiErrorContext::Playback,
                                err.to_string(),
                            )));
                            return;
                        }
                    };

                    if signal.is_stopped() {
                        tracing::debug!("playback stopped before audio finished downloading");
                        return;
                    }

                    let _ = ui_tx.try_send(UiEvent::PlaybackStarted);
                    match player.play(bytes, signal).await {
                        Ok(()) => {
                            let _ = ui_tx.try_send(UiEvent::PlaybackFinished);
                        }
                        Err(err) => {
                            tracing::warn!("audio playback failed: {err:#}");
                            let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                                UiErrorContext::Playback,
                                format!("{err:#}"),
                            )));
                        }
                    }
                });
            }
            #[cfg(not(feature = "audio-playback"))]
            BackendCommand::PlayAudio { .. } => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::Playback,
                    "in-app audio output is not available in this build",
                )));
            }
            BackendCommand::StopAudio => {
                #[cfg(feature = "audio-playback")]
                player.stop();
            }
        }
    }
}

/// Fetches the audio, then asks where to save it. `Ok(None)` means the user
/// dismissed the dialog.
async fn download_to_user_file(
    service: &SharedNarrationService,
    audio_url: &str,
    filename: String,
) -> Result<Option<PathBuf>, String> {
    let bytes = service
        .download_audio(audio_url)
        .await
        .map_err(|err| err.to_string())?;

    let path = tokio::task::spawn_blocking(move || {
        rfd::FileDialog::new()
            .add_filter("MP3 audio", &["mp3"])
            .set_file_name(filename)
            .save_file()
    })
    .await
    .map_err(|err| format!("save dialog failed: {err}"))?;

    let Some(path) = path else {
        return Ok(None);
    };

    tokio::fs::write(&path, bytes)
        .await
        .map_err(|err| format!("Failed to save audio to {}: {err}", path.display()))?;
    tracing::info!("saved narration audio to {}", path.display());
    Ok(Some(path))
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;

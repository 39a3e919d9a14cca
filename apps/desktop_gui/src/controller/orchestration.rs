//! Command orchestration from controller effects to the backend command queue.

use crossbeam_channel::{Sender, TrySendError};
use shared::error::TransportError;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::reducer::{reduce, Effect, NarrationEvent, NarrationState};

/// Queues `cmd` for the backend worker. Returns false (and explains why in
/// `status`) when the queue cannot take it.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut String,
) -> bool {
    let cmd_name = match &cmd {
        BackendCommand::GenerateAudio { .. } => "generate_audio",
        BackendCommand::DownloadAudio { .. } => "download_audio",
        BackendCommand::PlayAudio { .. } => "play_audio",
        BackendCommand::StopAudio => "stop_audio",
    };

    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            true
        }
        Err(TrySendError::Full(_)) => {
            *status = "UI command queue is full; please retry".to_string();
            false
        }
        Err(TrySendError::Disconnected(_)) => {
            *status = "Background worker disconnected; restart the app".to_string();
            false
        }
    }
}

/// Owns the narration state and is the only place it is mutated.
pub struct NarrationController {
    state: NarrationState,
    cmd_tx: Sender<BackendCommand>,
    status: String,
}

impl NarrationController {
    pub fn new(state: NarrationState, cmd_tx: Sender<BackendCommand>) -> Self {
        Self {
            state,
            cmd_tx,
            status: "Ready".to_string(),
        }
    }

    pub fn state(&self) -> &NarrationState {
        &self.state
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    pub fn handle(&mut self, event: NarrationEvent) {
        if let NarrationEvent::ResponseReceived { generation, .. } = &event {
            if !self.state.accepts_response(*generation) {
                tracing::debug!(
                    generation = *generation,
                    current = self.state.generation(),
                    "dropping response from superseded narration request"
                );
            }
        }

        let transition = reduce(&self.state, event);
        self.state = transition.state;

        match transition.effect {
            Some(Effect::Submit {
                generation,
                request,
            }) => {
                tracing::info!(
                    generation,
                    voice_id = %request.voice_id(),
                    characters = request.character_count(),
                    "submitting narration request"
                );
                self.status = "Generating audio...".to_string();
                // A previous clip must not keep playing over a new request.
                self.stop_playback();
                let queued = dispatch_backend_command(
                    &self.cmd_tx,
                    BackendCommand::GenerateAudio {
                        generation,
                        request,
                    },
                    &mut self.status,
                );
                if !queued {
                    let reason = self.status.clone();
                    self.handle(NarrationEvent::ResponseReceived {
                        generation,
                        outcome: Err(TransportError::Network(reason.clone())),
                    });
                    // The queue failure says more than the generic failure status.
                    self.status = reason;
                }
            }
            Some(Effect::ReportFailure { generation, error }) => {
                tracing::warn!(generation, error = %error, "narration request failed");
                self.status = "Last request failed".to_string();
            }
            None => {}
        }
    }

    pub fn request_download(&mut self) {
        let Some(panel) = self.state.audio_panel() else {
            return;
        };
        let cmd = BackendCommand::DownloadAudio {
            audio_url: panel.audio_url.to_string(),
            filename: panel.download_filename.to_string(),
        };
        if dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status) {
            self.status = "Downloading audio...".to_string();
        }
    }

    pub fn request_playback(&mut self) {
        let Some(panel) = self.state.audio_panel() else {
            return;
        };
        let cmd = BackendCommand::PlayAudio {
            audio_url: panel.audio_url.to_string(),
        };
        if dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status) {
            self.status = "Loading audio...".to_string();
        }
    }

    pub fn stop_playback(&mut self) {
        dispatch_backend_command(&self.cmd_tx, BackendCommand::StopAudio, &mut self.status);
    }
}

#[cfg(test)]
#[path = "tests/orchestration_tests.rs"]
mod tests;

//! Backend-to-UI events and error modeling for the desktop controller.

use std::path::PathBuf;

use shared::{domain::NarrationResult, error::TransportError};

pub enum UiEvent {
    Info(String),
    NarrationFinished {
        generation: u64,
        outcome: Result<NarrationResult, TransportError>,
    },
    AudioSaved(PathBuf),
    PlaybackStarted,
    PlaybackFinished,
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    Storage,
    Playback,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Download,
    Playback,
}

/// Failures outside the narration lifecycle (download, playback, worker startup).
/// These only reach the status banner and never change the narration phase.
#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("audio device")
            || message_lower.contains("audio output")
            || message_lower.contains("decode")
            || message_lower.contains("unsupported audio")
        {
            UiErrorCategory::Playback
        } else if message_lower.contains("failed to save")
            || message_lower.contains("permission denied")
            || message_lower.contains("no space")
            || message_lower.contains("read-only")
        {
            UiErrorCategory::Storage
        } else if message_lower.contains("timeout")
            || message_lower.contains("connection")
            || message_lower.contains("network")
            || message_lower.contains("http ")
            || message_lower.contains("dns")
            || message_lower.contains("disconnect")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn banner_text(&self) -> String {
        let prefix = match self.context {
            UiErrorContext::BackendStartup => "Background worker failed to start",
            UiErrorContext::Download => "Download failed",
            UiErrorContext::Playback => "Playback failed",
        };
        let hint = match self.category {
            UiErrorCategory::Transport => " Check your network connection and retry.",
            UiErrorCategory::Storage => " Choose a different location and retry.",
            UiErrorCategory::Playback => " Try downloading the file instead.",
            UiErrorCategory::Unknown => "",
        };
        format!("{prefix}.{hint}")
    }
}

#[cfg(test)]
#[path = "tests/events_tests.rs"]
mod tests;

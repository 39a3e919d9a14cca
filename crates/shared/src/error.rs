use thiserror::Error;

pub const EMPTY_TEXT_MESSAGE: &str = "Please enter some text to narrate";
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to generate audio. Please try again.";

/// Input problems caught before anything touches the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter some text to narrate")]
    EmptyText,
    #[error("Unknown voice '{0}'")]
    UnknownVoice(String),
}

/// Failures of the outbound narration call. The detail is for logs only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request to narration endpoint failed: {0}")]
    Network(String),
    #[error("narration endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed narration response: {0}")]
    MalformedResponse(String),
}

impl TransportError {
    pub fn user_message(&self) -> &'static str {
        GENERIC_FAILURE_MESSAGE
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NarrationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl NarrationError {
    /// Message suitable for display; transport causes collapse to one generic line.
    pub fn user_message(&self) -> String {
        match self {
            NarrationError::Validation(err) => err.to_string(),
            NarrationError::Transport(err) => err.user_message().to_string(),
        }
    }
}

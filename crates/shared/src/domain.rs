use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Advisory upper bound on narration text. Longer input is still submitted.
pub const MAX_CHARS: usize = 3000;
pub const DEFAULT_DOWNLOAD_FILENAME: &str = "narration.mp3";
pub const DEFAULT_VOICE_ID: &str = "Joanna";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoiceId(pub String);

impl VoiceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Default for VoiceId {
    fn default() -> Self {
        Self::new(DEFAULT_VOICE_ID)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceOption {
    pub id: VoiceId,
    pub name: String,
    pub description: String,
}

impl VoiceOption {
    pub fn new(id: &str, name: &str, description: &str) -> Self {
        Self {
            id: VoiceId::new(id),
            name: name.to_string(),
            description: description.to_string(),
        }
    }
}

pub fn default_voices() -> Vec<VoiceOption> {
    vec![
        VoiceOption::new(
            "Joanna",
            "Joanna (English)",
            "Professional female voice with American accent",
        ),
        VoiceOption::new(
            "Matthew",
            "Matthew (English)",
            "Clear male voice with American accent",
        ),
        VoiceOption::new(
            "Lupe",
            "Lupe (Spanish)",
            "Warm female voice with Spanish accent",
        ),
        VoiceOption::new(
            "Hans",
            "Hans (German)",
            "Strong male voice with German accent",
        ),
    ]
}

pub fn find_voice<'a>(voices: &'a [VoiceOption], id: &str) -> Option<&'a VoiceOption> {
    voices.iter().find(|voice| voice.id.as_str() == id)
}

/// Count above which the character counter switches to warning styling (80% of `max_chars`).
pub fn warning_threshold(max_chars: usize) -> usize {
    // u128 so configured maxima near usize::MAX cannot overflow.
    (max_chars as u128 * 4 / 5) as usize
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextStats {
    pub character_count: usize,
    pub over_threshold: bool,
}

impl TextStats {
    pub fn measure(text: &str, max_chars: usize) -> Self {
        let character_count = text.chars().count();
        Self {
            character_count,
            over_threshold: character_count > warning_threshold(max_chars),
        }
    }
}

/// Validated input for one narration submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrationRequest {
    text: String,
    voice_id: VoiceId,
}

impl NarrationRequest {
    /// Rejects whitespace-only text and voices missing from `voices`.
    ///
    /// The text itself is kept verbatim; it is neither trimmed nor truncated.
    pub fn new(
        text: impl Into<String>,
        voice_id: VoiceId,
        voices: &[VoiceOption],
    ) -> Result<Self, ValidationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ValidationError::EmptyText);
        }
        if find_voice(voices, voice_id.as_str()).is_none() {
            return Err(ValidationError::UnknownVoice(voice_id.0));
        }

        Ok(Self { text, voice_id })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn voice_id(&self) -> &VoiceId {
        &self.voice_id
    }

    pub fn character_count(&self) -> usize {
        self.text.chars().count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrationResult {
    pub audio_url: String,
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;

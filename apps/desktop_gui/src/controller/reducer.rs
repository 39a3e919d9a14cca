//! Narration lifecycle as a pure `(state, event) -> (state, effect)` function.

use shared::{
    domain::{
        NarrationRequest, NarrationResult, TextStats, VoiceId, VoiceOption,
        DEFAULT_DOWNLOAD_FILENAME,
    },
    error::{NarrationError, TransportError},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NarrationPhase {
    Idle,
    Submitting { generation: u64 },
    Success(NarrationResult),
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NarrationState {
    text: String,
    voice_id: VoiceId,
    stats: TextStats,
    phase: NarrationPhase,
    /// Bumped on every accepted submit and every clear; only the latest may land.
    generation: u64,
    max_chars: usize,
    voices: Vec<VoiceOption>,
}

#[derive(Debug, Clone)]
pub enum NarrationEvent {
    TextChanged(String),
    VoiceSelected(VoiceId),
    SubmitRequested,
    ClearRequested,
    ResponseReceived {
        generation: u64,
        outcome: Result<NarrationResult, TransportError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Submit {
        generation: u64,
        request: NarrationRequest,
    },
    ReportFailure {
        generation: u64,
        error: TransportError,
    },
}

#[derive(Debug, Clone)]
pub struct Transition {
    pub state: NarrationState,
    pub effect: Option<Effect>,
}

/// What the audio panel renders; present only in the success phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioPanelView<'a> {
    pub audio_url: &'a str,
    pub download_filename: &'static str,
}

impl NarrationState {
    pub fn new(voices: Vec<VoiceOption>, voice_id: VoiceId, max_chars: usize) -> Self {
        Self {
            text: String::new(),
            voice_id,
            stats: TextStats::default(),
            phase: NarrationPhase::Idle,
            generation: 0,
            max_chars,
            voices,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn voice_id(&self) -> &VoiceId {
        &self.voice_id
    }

    pub fn voices(&self) -> &[VoiceOption] {
        &self.voices
    }

    pub fn stats(&self) -> TextStats {
        self.stats
    }

    pub fn phase(&self) -> &NarrationPhase {
        &self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.phase, NarrationPhase::Submitting { .. })
    }

    pub fn accepts_response(&self, generation: u64) -> bool {
        self.phase == NarrationPhase::Submitting { generation } && self.generation == generation
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.phase {
            NarrationPhase::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn audio_panel(&self) -> Option<AudioPanelView<'_>> {
        match &self.phase {
            NarrationPhase::Success(result) => Some(AudioPanelView {
                audio_url: &result.audio_url,
                download_filename: DEFAULT_DOWNLOAD_FILENAME,
            }),
            _ => None,
        }
    }

    pub fn counter_label(&self) -> String {
        format!("{} characters", self.stats.character_count)
    }
}

pub fn reduce(state: &NarrationState, event: NarrationEvent) -> Transition {
    let mut next = state.clone();

    let effect = match event {
        NarrationEvent::TextChanged(text) => {
            next.stats = TextStats::measure(&text, next.max_chars);
            next.text = text;
            None
        }
        NarrationEvent::VoiceSelected(voice_id) => {
            next.voice_id = voice_id;
            None
        }
        NarrationEvent::SubmitRequested => {
            if next.is_submitting() {
                None
            } else {
                match NarrationRequest::new(next.text.clone(), next.voice_id.clone(), &next.voices)
                {
                    Ok(request) => {
                        next.generation += 1;
                        next.phase = NarrationPhase::Submitting {
                            generation: next.generation,
                        };
                        Some(Effect::Submit {
                            generation: next.generation,
                            request,
                        })
                    }
                    Err(err) => {
                        next.phase = NarrationPhase::Error(NarrationError::from(err).user_message());
                        None
                    }
                }
            }
        }
        NarrationEvent::ClearRequested => {
            next.text.clear();
            next.stats = TextStats::default();
            next.phase = NarrationPhase::Idle;
            next.generation += 1;
            None
        }
        NarrationEvent::ResponseReceived {
            generation,
            outcome,
        } => {
            if !state.accepts_response(generation) {
                None
            } else {
                match outcome {
                    Ok(result) => {
                        next.phase = NarrationPhase::Success(result);
                        None
                    }
                    Err(error) => {
                        next.phase = NarrationPhase::Error(error.user_message().to_string());
                        Some(Effect::ReportFailure { generation, error })
                    }
                }
            }
        }
    };

    Transition {
        state: next,
        effect,
    }
}

#[cfg(test)]
#[path = "tests/reducer_tests.rs"]
mod tests;

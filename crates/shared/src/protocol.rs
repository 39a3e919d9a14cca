use serde::{Deserialize, Serialize};

use crate::{
    domain::{NarrationRequest, NarrationResult},
    error::TransportError,
};

/// JSON body posted to the narration endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateAudioRequest {
    pub text: String,
    pub voice_id: String,
}

impl From<&NarrationRequest> for GenerateAudioRequest {
    fn from(value: &NarrationRequest) -> Self {
        Self {
            text: value.text().to_string(),
            voice_id: value.voice_id().as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateAudioResponse {
    #[serde(default)]
    pub audio_url: Option<String>,
}

impl GenerateAudioResponse {
    pub fn into_result(self) -> Result<NarrationResult, TransportError> {
        match self.audio_url {
            Some(audio_url) if !audio_url.trim().is_empty() => Ok(NarrationResult { audio_url }),
            Some(_) => Err(TransportError::MalformedResponse(
                "audio_url is empty".to_string(),
            )),
            None => Err(TransportError::MalformedResponse(
                "audio_url is missing".to_string(),
            )),
        }
    }
}

/// Decodes a 2xx body. Anything other than an object carrying a non-empty
/// `audio_url` string is rejected.
pub fn parse_generate_audio_response(body: &[u8]) -> Result<NarrationResult, TransportError> {
    let response: GenerateAudioResponse = serde_json::from_slice(body)
        .map_err(|err| TransportError::MalformedResponse(err.to_string()))?;
    response.into_result()
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;

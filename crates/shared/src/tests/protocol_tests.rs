use super::*;
use crate::domain::{default_voices, VoiceId};

#[test]
fn request_body_uses_snake_case_voice_id() {
    let request =
        NarrationRequest::new("Once upon a time", VoiceId::new("Lupe"), &default_voices())
            .expect("valid");
    let body = serde_json::to_value(GenerateAudioRequest::from(&request)).expect("serialize");
    assert_eq!(
        body,
        serde_json::json!({ "text": "Once upon a time", "voice_id": "Lupe" })
    );
}

#[test]
fn parses_audio_url_from_success_body() {
    let result = parse_generate_audio_response(br#"{"audio_url":"https://x/a.mp3"}"#)
        .expect("valid body");
    assert_eq!(result.audio_url, "https://x/a.mp3");
}

#[test]
fn ignores_extra_fields_in_success_body() {
    let result =
        parse_generate_audio_response(br#"{"audio_url":"https://x/a.mp3","expires_in":3600}"#)
            .expect("valid body");
    assert_eq!(result.audio_url, "https://x/a.mp3");
}

#[test]
fn rejects_bodies_without_a_usable_audio_url() {
    for body in [
        &br#"{}"#[..],
        br#"{"audio_url":null}"#,
        br#"{"audio_url":""}"#,
        br#"{"audio_url":42}"#,
        br#"{"url":"https://x/a.mp3"}"#,
        b"not json",
        b"",
    ] {
        let err = parse_generate_audio_response(body).expect_err("must fail");
        assert!(
            matches!(err, TransportError::MalformedResponse(_)),
            "unexpected error for {:?}: {err:?}",
            String::from_utf8_lossy(body)
        );
        assert_eq!(err.user_message(), crate::error::GENERIC_FAILURE_MESSAGE);
    }
}

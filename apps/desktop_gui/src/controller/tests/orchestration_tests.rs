use super::*;
use crossbeam_channel::{bounded, Receiver};
use shared::{
    domain::{default_voices, NarrationResult, VoiceId, MAX_CHARS},
    error::{EMPTY_TEXT_MESSAGE, GENERIC_FAILURE_MESSAGE},
};

fn controller_with_queue(capacity: usize) -> (NarrationController, Receiver<BackendCommand>) {
    let (cmd_tx, cmd_rx) = bounded(capacity);
    let state = NarrationState::new(default_voices(), VoiceId::default(), MAX_CHARS);
    (NarrationController::new(state, cmd_tx), cmd_rx)
}

fn drain(cmd_rx: &Receiver<BackendCommand>) -> Vec<BackendCommand> {
    cmd_rx.try_iter().collect()
}

#[test]
fn empty_submit_sends_no_command() {
    let (mut controller, cmd_rx) = controller_with_queue(4);
    controller.handle(NarrationEvent::TextChanged("   ".to_string()));
    controller.handle(NarrationEvent::SubmitRequested);

    assert!(cmd_rx.try_recv().is_err());
    assert_eq!(controller.state().error_message(), Some(EMPTY_TEXT_MESSAGE));
}

#[test]
fn valid_submit_sends_exactly_one_generate_command() {
    let (mut controller, cmd_rx) = controller_with_queue(4);
    controller.handle(NarrationEvent::TextChanged("Chapter one".to_string()));
    controller.handle(NarrationEvent::VoiceSelected(VoiceId::new("Matthew")));
    controller.handle(NarrationEvent::SubmitRequested);
    controller.handle(NarrationEvent::SubmitRequested);

    let commands = drain(&cmd_rx);
    let generates: Vec<_> = commands
        .iter()
        .filter_map(|cmd| match cmd {
            BackendCommand::GenerateAudio {
                generation,
                request,
            } => Some((*generation, request)),
            _ => None,
        })
        .collect();
    assert_eq!(generates.len(), 1, "second submit must be ignored");
    let (generation, request) = generates[0];
    assert_eq!(generation, controller.state().generation());
    assert_eq!(request.text(), "Chapter one");
    assert_eq!(request.voice_id().as_str(), "Matthew");
    assert_eq!(controller.status(), "Generating audio...");
}

#[test]
fn disconnected_worker_surfaces_generic_failure() {
    let (mut controller, cmd_rx) = controller_with_queue(4);
    drop(cmd_rx);

    controller.handle(NarrationEvent::TextChanged("hello".to_string()));
    controller.handle(NarrationEvent::SubmitRequested);

    assert!(!controller.state().is_submitting());
    assert_eq!(
        controller.state().error_message(),
        Some(GENERIC_FAILURE_MESSAGE)
    );
    assert_eq!(
        controller.status(),
        "Background worker disconnected; restart the app"
    );
}

#[test]
fn accepted_submit_stops_playback_before_generating() {
    let (mut controller, cmd_rx) = controller_with_queue(4);
    controller.handle(NarrationEvent::TextChanged("hello".to_string()));
    controller.handle(NarrationEvent::SubmitRequested);

    let commands = drain(&cmd_rx);
    assert!(matches!(commands[0], BackendCommand::StopAudio));
    assert!(matches!(commands[1], BackendCommand::GenerateAudio { .. }));
    assert_eq!(commands.len(), 2);
}

#[test]
fn rejected_submit_leaves_playback_alone() {
    let (mut controller, cmd_rx) = controller_with_queue(4);
    controller.handle(NarrationEvent::SubmitRequested);
    assert!(drain(&cmd_rx).is_empty());
}

#[test]
fn full_queue_reports_retry_status() {
    let (cmd_tx, cmd_rx) = bounded(1);
    cmd_tx
        .try_send(BackendCommand::StopAudio)
        .expect("prefill queue");
    let mut status = String::new();

    let queued = dispatch_backend_command(&cmd_tx, BackendCommand::StopAudio, &mut status);

    assert!(!queued);
    assert_eq!(status, "UI command queue is full; please retry");
    drop(cmd_rx);
}

#[test]
fn download_and_playback_require_a_result() {
    let (mut controller, cmd_rx) = controller_with_queue(4);
    controller.request_download();
    controller.request_playback();
    assert!(cmd_rx.try_recv().is_err());
}

#[test]
fn download_uses_result_url_and_default_filename() {
    let (mut controller, cmd_rx) = controller_with_queue(4);
    controller.handle(NarrationEvent::TextChanged("hello".to_string()));
    controller.handle(NarrationEvent::SubmitRequested);
    drain(&cmd_rx);

    let generation = controller.state().generation();
    controller.handle(NarrationEvent::ResponseReceived {
        generation,
        outcome: Ok(NarrationResult {
            audio_url: "https://cdn.example/a.mp3".to_string(),
        }),
    });
    controller.request_download();

    match cmd_rx.try_recv() {
        Ok(BackendCommand::DownloadAudio {
            audio_url,
            filename,
        }) => {
            assert_eq!(audio_url, "https://cdn.example/a.mp3");
            assert_eq!(filename, "narration.mp3");
        }
        other => panic!("expected download command, got {other:?}"),
    }
    assert_eq!(controller.status(), "Downloading audio...");
}

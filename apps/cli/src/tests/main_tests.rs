use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use shared::{
    domain::default_voices,
    error::{EMPTY_TEXT_MESSAGE, GENERIC_FAILURE_MESSAGE},
};
use tokio::net::TcpListener;

use super::*;

#[test]
fn download_flag_without_path_uses_default_filename() {
    let args = Args::try_parse_from(["narrate", "--text", "hi", "--download"]).expect("parse");
    assert_eq!(args.download, Some(PathBuf::from("narration.mp3")));

    let args = Args::try_parse_from(["narrate", "--text", "hi", "--download", "out/ch1.mp3"])
        .expect("parse");
    assert_eq!(args.download, Some(PathBuf::from("out/ch1.mp3")));

    let args = Args::try_parse_from(["narrate", "--text", "hi"]).expect("parse");
    assert_eq!(args.download, None);
}

#[test]
fn text_and_text_file_are_mutually_exclusive() {
    let parsed = Args::try_parse_from(["narrate", "--text", "hi", "--text-file", "book.txt"]);
    assert!(parsed.is_err());
}

#[tokio::test]
async fn missing_text_reads_as_empty() {
    let args = Args::try_parse_from(["narrate"]).expect("parse");
    assert_eq!(read_text(&args).await.expect("read"), "");
}

#[tokio::test]
async fn text_is_passed_through_verbatim() {
    let args = Args::try_parse_from(["narrate", "--text", "  padded  "]).expect("parse");
    assert_eq!(read_text(&args).await.expect("read"), "  padded  ");
}

#[tokio::test]
async fn unreadable_text_file_is_an_error() {
    let args = Args::try_parse_from(["narrate", "--text-file", "/definitely/not/here.txt"])
        .expect("parse");
    let err = read_text(&args).await.expect_err("missing file");
    assert!(err.to_string().contains("/definitely/not/here.txt"));
}

#[test]
fn voice_list_prints_one_aligned_row_per_voice() {
    let listing = format_voice_list(&default_voices());
    let lines: Vec<&str> = listing.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(
        lines[0],
        "Joanna   Joanna (English) - Professional female voice with American accent"
    );
    assert!(lines[2].starts_with("Lupe     Lupe (Spanish)"));
}

#[derive(Clone)]
struct MockEndpoint {
    reply_status: StatusCode,
    reply_body: String,
    hits: Arc<AtomicUsize>,
}

async fn handle_generate_audio(State(mock): State<MockEndpoint>) -> (StatusCode, String) {
    mock.hits.fetch_add(1, Ordering::SeqCst);
    (mock.reply_status, mock.reply_body.clone())
}

async fn handle_audio_file() -> Vec<u8> {
    b"ID3-fake-mp3-bytes".to_vec()
}

/// `reply_body` may reference `{base}`, replaced with the server's own address.
async fn spawn_endpoint(
    reply_status: StatusCode,
    reply_body: &str,
) -> (NarratorSettings, Arc<AtomicUsize>) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let base = format!("http://{}", listener.local_addr().expect("addr"));
    let hits = Arc::new(AtomicUsize::new(0));
    let mock = MockEndpoint {
        reply_status,
        reply_body: reply_body.replace("{base}", &base),
        hits: hits.clone(),
    };
    let app = Router::new()
        .route("/prod/generate-audio", post(handle_generate_audio))
        .route("/audio/narration.mp3", get(handle_audio_file))
        .with_state(mock);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let settings = NarratorSettings {
        endpoint_url: format!("{base}/prod/generate-audio"),
        ..NarratorSettings::default()
    };
    (settings, hits)
}

async fn run_with(args: &[&str], settings: &NarratorSettings) -> (Outcome, String, String) {
    let args = Args::try_parse_from(args).expect("parse");
    let mut out = Vec::new();
    let mut err = Vec::new();
    let outcome = run(&args, settings, &mut out, &mut err)
        .await
        .expect("run completes");
    (
        outcome,
        String::from_utf8(out).expect("utf8"),
        String::from_utf8(err).expect("utf8"),
    )
}

#[tokio::test]
async fn success_prints_audio_url() {
    let (settings, hits) =
        spawn_endpoint(StatusCode::OK, r#"{"audio_url":"{base}/audio/narration.mp3"}"#).await;

    let (outcome, out, err) = run_with(&["narrate", "--text", "Chapter one"], &settings).await;

    assert_eq!(outcome, Outcome::Success);
    assert!(out.trim().ends_with("/audio/narration.mp3"), "stdout: {out}");
    assert!(err.is_empty());
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn empty_text_prints_validation_message_without_request() {
    let (settings, hits) = spawn_endpoint(StatusCode::OK, r#"{"audio_url":"unused"}"#).await;

    let (outcome, out, err) = run_with(&["narrate", "--text", "   "], &settings).await;

    assert_eq!(outcome, Outcome::InvalidInput);
    assert!(out.is_empty());
    assert_eq!(err.trim(), EMPTY_TEXT_MESSAGE);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn server_error_prints_generic_message() {
    let (settings, hits) = spawn_endpoint(StatusCode::INTERNAL_SERVER_ERROR, "boom").await;

    let (outcome, out, err) = run_with(&["narrate", "--text", "hello"], &settings).await;

    assert_eq!(outcome, Outcome::RequestFailed);
    assert!(out.is_empty());
    assert_eq!(err.trim(), GENERIC_FAILURE_MESSAGE);
    assert_eq!(hits.load(Ordering::SeqCst), 1, "no retries");
}

#[tokio::test]
async fn missing_audio_url_prints_generic_message() {
    let (settings, _hits) = spawn_endpoint(StatusCode::OK, r#"{"status":"ok"}"#).await;

    let (outcome, _out, err) = run_with(&["narrate", "--text", "hello"], &settings).await;

    assert_eq!(outcome, Outcome::RequestFailed);
    assert_eq!(err.trim(), GENERIC_FAILURE_MESSAGE);
}

#[tokio::test]
async fn download_writes_audio_to_requested_path() {
    let (settings, _hits) =
        spawn_endpoint(StatusCode::OK, r#"{"audio_url":"{base}/audio/narration.mp3"}"#).await;
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = std::env::temp_dir().join(format!("book_narrator_cli_test_{suffix}"));
    std::fs::create_dir_all(&temp_root).expect("temp root");
    let path = temp_root.join("chapter.mp3");
    let path_arg = path.to_string_lossy().to_string();

    let (outcome, _out, err) = run_with(
        &["narrate", "--text", "hello", "--download", &path_arg],
        &settings,
    )
    .await;

    assert_eq!(outcome, Outcome::Success);
    assert!(err.contains("Saved audio to"));
    assert_eq!(
        std::fs::read(&path).expect("saved file"),
        b"ID3-fake-mp3-bytes"
    );

    std::fs::remove_dir_all(temp_root).expect("cleanup");
}

#[tokio::test]
async fn list_voices_needs_no_endpoint() {
    let settings = NarratorSettings {
        endpoint_url: "http://127.0.0.1:9/unreachable".to_string(),
        ..NarratorSettings::default()
    };

    let (outcome, out, _err) = run_with(&["narrate", "--list-voices"], &settings).await;

    assert_eq!(outcome, Outcome::Success);
    assert_eq!(out.lines().count(), 4);
}

#[test]
fn outcomes_map_to_distinct_exit_codes() {
    let codes = [Outcome::Success, Outcome::InvalidInput, Outcome::RequestFailed]
        .map(|outcome| format!("{:?}", ExitCode::from(outcome)));
    assert_ne!(codes[0], codes[1]);
    assert_ne!(codes[1], codes[2]);
    assert_ne!(codes[0], codes[2]);
}

mod common;

use std::path::Path;

use axum::extract::Path as UrlPath;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;

use common::Recorder;
use shopdesk::config::VoiceConfig;
use shopdesk::voice::{ElevenLabsClient, VoiceError, VoiceRequest, VoiceSynthesizer};

/// A text-to-speech endpoint that always answers `status` + `audio`.
async fn mock_tts(status: StatusCode, audio: &'static [u8]) -> (String, Recorder) {
    let recorder = Recorder::default();
    let rec = recorder.clone();
    let app = Router::new().route(
        "/v1/text-to-speech/{voice_id}",
        post(
            move |UrlPath(voice_id): UrlPath<String>, headers: HeaderMap, Json(body): Json<Value>| {
                let rec = rec.clone();
                async move {
                    rec.record_at(&voice_id, &headers, body);
                    (status, audio)
                }
            },
        ),
    );
    let base = common::spawn_server(app).await;
    (format!("{base}/v1"), recorder)
}

fn voice_client(endpoint: &str, output_dir: &Path) -> ElevenLabsClient {
    ElevenLabsClient::new(&VoiceConfig {
        api_key: "xi-wire-test".into(),
        endpoint: endpoint.to_string(),
        default_voice_id: "voice-default".into(),
        model_id: "eleven_multilingual_v2".into(),
        output_dir: Some(output_dir.to_path_buf()),
    })
    .unwrap()
}

fn request(text: &str, voice_id: &str) -> VoiceRequest {
    VoiceRequest {
        text: text.into(),
        voice_id: voice_id.into(),
        model_id: None,
        similarity_boost: None,
        stability: None,
    }
}

#[tokio::test]
async fn test_synthesis_request_and_stored_audio() {
    let (endpoint, recorder) = mock_tts(StatusCode::OK, b"ID3ok").await;
    let dir = tempfile::tempdir().unwrap();
    let client = voice_client(&endpoint, &dir.path().join("audio"));

    let audio = client
        .synthesize(&request("Your refund was approved.", "v-42"))
        .await
        .unwrap();

    let seen = recorder.all();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].path.as_deref(), Some("v-42"));
    assert_eq!(seen[0].api_key.as_deref(), Some("xi-wire-test"));
    assert!(seen[0].authorization.is_none());

    let body = &seen[0].body;
    assert_eq!(body["text"], "Your refund was approved.");
    assert_eq!(body["model_id"], "eleven_multilingual_v2");
    assert_eq!(body["voice_settings"]["similarity_boost"], 0.75);
    assert_eq!(body["voice_settings"]["stability"], 0.75);

    assert_eq!(audio.voice_id, "v-42");
    assert_eq!(audio.bytes, 5);
    assert!(audio.audio_path.starts_with(dir.path().join("audio")));
    assert_eq!(
        audio.audio_path.extension().and_then(|e| e.to_str()),
        Some("mp3")
    );
    assert_eq!(std::fs::read(&audio.audio_path).unwrap(), b"ID3ok");
}

#[tokio::test]
async fn test_request_overrides_reach_the_wire() {
    let (endpoint, recorder) = mock_tts(StatusCode::OK, b"ID3").await;
    let dir = tempfile::tempdir().unwrap();
    let client = voice_client(&endpoint, dir.path());

    let mut req = request("hi", "v-7");
    req.model_id = Some("eleven_turbo_v2".into());
    req.stability = Some(0.5);
    client.synthesize(&req).await.unwrap();

    let body = &recorder.all()[0].body;
    assert_eq!(body["model_id"], "eleven_turbo_v2");
    assert_eq!(body["voice_settings"]["stability"], 0.5);
}

#[tokio::test]
async fn test_server_error_is_http_error_and_writes_nothing() {
    let (endpoint, recorder) = mock_tts(StatusCode::INTERNAL_SERVER_ERROR, b"").await;
    let dir = tempfile::tempdir().unwrap();
    let output_dir = dir.path().join("audio");
    let client = voice_client(&endpoint, &output_dir);

    let err = client
        .synthesize(&request("hello", "v-42"))
        .await
        .unwrap_err();

    assert!(
        matches!(err, VoiceError::HttpError { status: 500 }),
        "got {err:?}"
    );
    assert_eq!(recorder.all().len(), 1);
    assert!(!output_dir.exists());
}

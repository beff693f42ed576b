mod common;

use serde_json::json;

use common::setup_test_server;

#[tokio::test]
async fn generate_returns_wav_audio() -> Result<(), Box<dyn std::error::Error>> {
    let server = setup_test_server().await;

    let response = server
        .client
        .post(server.url("/generate"))
        .json(&json!({ "text": "Привет, как дела?" }))
        .send()
        .await?;

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["content-type"], "audio/wav");
    assert!(response.headers().contains_key("x-request-id"));

    let body = response.bytes().await?;
    assert_eq!(&body[..4], b"RIFF");
    assert_eq!(&body[8..12], b"WAVE");
    // sample rate lives at byte 24 of the canonical header
    assert_eq!(&body[24..28], &48_000u32.to_le_bytes());

    Ok(())
}

#[tokio::test]
async fn generate_honours_requested_sample_rate() -> Result<(), Box<dyn std::error::Error>> {
    let server = setup_test_server().await;

    let response = server
        .client
        .post(server.url("/generate"))
        .json(&json!({ "text": "hello", "speaker": "aidar", "sampleRate": 24000 }))
        .send()
        .await?;

    assert_eq!(response.status(), 200);
    let body = response.bytes().await?;
    assert_eq!(&body[24..28], &24_000u32.to_le_bytes());

    Ok(())
}

#[tokio::test]
async fn unknown_speaker_is_a_500_with_detail() -> Result<(), Box<dyn std::error::Error>> {
    let server = setup_test_server().await;

    let response = server
        .client
        .post(server.url("/generate"))
        .json(&json!({ "text": "hello", "speaker": "nobody" }))
        .send()
        .await?;

    assert_eq!(response.status(), 500);
    let body: serde_json::Value = response.json().await?;
    assert!(body["detail"]
        .as_str()
        .is_some_and(|detail| detail.contains("unknown speaker: nobody")));

    Ok(())
}

#[tokio::test]
async fn invalid_bodies_are_500_with_detail() -> Result<(), Box<dyn std::error::Error>> {
    let server = setup_test_server().await;

    let empty_text = server
        .client
        .post(server.url("/generate"))
        .json(&json!({ "text": "" }))
        .send()
        .await?;
    let missing_text = server
        .client
        .post(server.url("/generate"))
        .json(&json!({ "speaker": "xenia" }))
        .send()
        .await?;
    let malformed = server
        .client
        .post(server.url("/generate"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;

    for response in [empty_text, missing_text, malformed] {
        assert_eq!(response.status(), 500);
        let body: serde_json::Value = response.json().await?;
        assert!(body["detail"].as_str().is_some_and(|detail| !detail.is_empty()));
    }

    Ok(())
}

#[tokio::test]
async fn health_reports_ok_and_echoes_request_id() -> Result<(), Box<dyn std::error::Error>> {
    let server = setup_test_server().await;

    let response = server
        .client
        .get(server.url("/health"))
        .header("x-request-id", "req-42")
        .send()
        .await?;

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["x-request-id"], "req-42");
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body, json!({ "status": "ok" }));

    Ok(())
}

//! Integration tests for the voice picker.

mod common;

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_list_voices_marks_default() {
    let app = common::build_test_app();

    let (status, json) = common::get_json(app.router.clone(), "/api/v1/voices").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        json!([
            { "id": "lekha", "label": "Lekha (hi-IN)", "selected": true },
            { "id": "rishi", "label": "Rishi (en-IN)", "selected": false },
        ])
    );
}

#[tokio::test]
async fn test_selected_voice_is_used_for_next_narration() {
    // Arrange
    let app = common::build_test_app();

    // Act
    let (status, json) = common::put_json(
        app.router.clone(),
        "/api/v1/voices/selected",
        &json!({ "voice_id": "rishi" }),
    )
    .await;
    common::post_json(
        app.router.clone(),
        "/api/v1/narration/start",
        &json!({ "title": "The Fox", "text": "Once upon a time." }),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["selected_voice"], "rishi");
    let submitted = app.probe.last_submitted().unwrap();
    assert_eq!(submitted.voice.unwrap().as_str(), "rishi");
}

#[tokio::test]
async fn test_selecting_unknown_voice_returns_400() {
    let app = common::build_test_app();

    let (status, json) = common::put_json(
        app.router.clone(),
        "/api/v1/voices/selected",
        &json!({ "voice_id": "nobody" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
}

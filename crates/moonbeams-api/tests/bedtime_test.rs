//! Integration tests for the bedtime view and the event journal.

mod common;

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_fresh_bedtime_view() {
    let app = common::build_test_app();

    let (status, json) = common::get_json(app.router.clone(), "/api/v1/bedtime").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["playback"]["state"], "idle");
    assert_eq!(json["sleep_timer"]["armed"], false);
    assert_eq!(json["overlay_visible"], false);
    assert_eq!(json["selected_voice"], "lekha");
}

#[tokio::test]
async fn test_events_are_listed_oldest_first() {
    // Arrange
    let app = common::build_test_app();
    common::put_json(app.router.clone(), "/api/v1/sleep-timer", &json!({ "minutes": 5 })).await;
    common::post_json(
        app.router.clone(),
        "/api/v1/narration/start",
        &json!({ "title": "The Fox", "text": "Once upon a time." }),
    )
    .await;

    // Act
    let (status, all) = common::get_json(app.router.clone(), "/api/v1/events").await;
    let (_, last) = common::get_json(app.router.clone(), "/api/v1/events?limit=1").await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    let types: Vec<_> = all
        .as_array()
        .unwrap()
        .iter()
        .map(|event| event["event_type"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(
        types,
        vec![
            "session.sleep_timer_armed",
            "narration.started",
            "narration.unit_submitted",
        ]
    );
    assert_eq!(last.as_array().unwrap().len(), 1);
    assert_eq!(last[0]["event_type"], "narration.unit_submitted");
    assert_eq!(last[0]["payload"]["UnitSubmitted"]["index"], 0);
}

//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::TimeDelta;
use http_body_util::BodyExt;
use moonbeams_core::engine::{NarrationEngine, Voice};
use moonbeams_core::journal::BoundedJournal;
use moonbeams_core::story::{Story, StorySource};
use moonbeams_narration::application::command_handlers::{NarrationController, PlaybackConfig};
use moonbeams_narration::domain::voice::VoicePreferences;
use moonbeams_session::application::coordinator::BedtimeSession;
use moonbeams_test_support::{EngineProbe, ManualClock, RecordingEngine, StaticStorySource};
use tokio::sync::mpsc;
use tower::ServiceExt;

use moonbeams_api::routes;
use moonbeams_api::runtime;
use moonbeams_api::state::AppState;

/// A running app plus the handles tests use to steer it.
pub struct TestApp {
    /// The full router, without middleware.
    pub router: Router,
    /// Observes and drives the recording engine.
    pub probe: EngineProbe,
    /// The coordinator's clock.
    pub clock: Arc<ManualClock>,
}

/// Story returned by the default story source.
pub fn fox() -> Story {
    Story::new("The Fox", "Once upon a time. The fox slept.")
}

fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 20, 30, 0).unwrap(),
    ))
}

fn voices() -> Vec<Voice> {
    vec![
        Voice::new("lekha", "Lekha", "hi-IN"),
        Voice::new("rishi", "Rishi", "en-IN"),
    ]
}

/// Build the full app router with a recording engine, a manual clock, and
/// a story source that always returns [`fox`]. Uses the same route
/// structure as `main.rs`. No grace delay, so the first unit is submitted
/// as soon as a narration starts.
pub fn build_test_app() -> TestApp {
    build_test_app_with(Arc::new(StaticStorySource::new(fox())))
}

/// Build the app with a custom story source.
pub fn build_test_app_with(story_source: Arc<dyn StorySource>) -> TestApp {
    let (engine, probe) = RecordingEngine::new(voices());
    build(Some(Box::new(engine)), story_source, probe)
}

/// Build the app as it runs on a host without text-to-speech.
pub fn build_test_app_without_engine() -> TestApp {
    let (_unused, probe) = RecordingEngine::new(voices());
    build(None, Arc::new(StaticStorySource::new(fox())), probe)
}

fn build(
    engine: Option<Box<dyn NarrationEngine>>,
    story_source: Arc<dyn StorySource>,
    probe: EngineProbe,
) -> TestApp {
    let clock = clock();
    let config = PlaybackConfig {
        grace_delay: TimeDelta::zero(),
        ..PlaybackConfig::default()
    };
    let narration = NarrationController::new(engine, config);
    let session = BedtimeSession::new(narration, VoicePreferences::default());
    let journal = Arc::new(BoundedJournal::default());
    let (_signals, signal_rx) = mpsc::unbounded_channel();
    let (handle, _task) = runtime::spawn(session, clock.clone(), journal.clone(), signal_rx);

    let app_state = AppState::new(handle, journal, story_source);
    let router = routes::api_router().with_state(app_state);

    TestApp {
        router,
        probe,
        clock,
    }
}

/// Send a request with an optional JSON body and return the response.
pub async fn send_json(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<&serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send_json(app, "POST", uri, Some(body)).await
}

/// Send a POST request without a body and return the response.
pub async fn post_empty(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send_json(app, "POST", uri, None).await
}

/// Send a PUT request with a JSON body and return the response.
pub async fn put_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send_json(app, "PUT", uri, Some(body)).await
}

/// Send a DELETE request and return the response.
pub async fn delete_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send_json(app, "DELETE", uri, None).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send_json(app, "GET", uri, None).await
}

//! Routes for narration playback.

use axum::extract::State;
use axum::{Json, Router, routing::post};
use moonbeams_core::story::Story;
use moonbeams_session::application::coordinator::BedtimeInput;
use moonbeams_session::application::query_handlers::BedtimeView;
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /start.
#[derive(Debug, Deserialize)]
pub struct StartNarrationRequest {
    /// Story title, spoken first.
    pub title: String,
    /// Story text.
    pub text: String,
}

async fn dispatch(
    state: &AppState,
    command: &'static str,
    input: BedtimeInput,
) -> Result<Json<BedtimeView>, ApiError> {
    let correlation_id = Uuid::new_v4();
    info!(%correlation_id, command, "handling narration command");
    let view = state.session.send(correlation_id, input).await?;
    Ok(Json(view))
}

/// POST /start
#[instrument(skip(state, request), fields(title = %request.title))]
async fn start(
    State(state): State<AppState>,
    Json(request): Json<StartNarrationRequest>,
) -> Result<Json<BedtimeView>, ApiError> {
    let story = Story::new(request.title, request.text);
    dispatch(&state, "start", BedtimeInput::NarrateStory(story)).await
}

/// POST /play
#[instrument(skip(state))]
async fn play(State(state): State<AppState>) -> Result<Json<BedtimeView>, ApiError> {
    dispatch(&state, "play", BedtimeInput::Play).await
}

/// POST /pause
#[instrument(skip(state))]
async fn pause(State(state): State<AppState>) -> Result<Json<BedtimeView>, ApiError> {
    dispatch(&state, "pause", BedtimeInput::Pause).await
}

/// POST /resume
#[instrument(skip(state))]
async fn resume(State(state): State<AppState>) -> Result<Json<BedtimeView>, ApiError> {
    dispatch(&state, "resume", BedtimeInput::Resume).await
}

/// POST /stop
#[instrument(skip(state))]
async fn stop(State(state): State<AppState>) -> Result<Json<BedtimeView>, ApiError> {
    dispatch(&state, "stop", BedtimeInput::Stop).await
}

/// Returns the router for narration playback.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/start", post(start))
        .route("/play", post(play))
        .route("/pause", post(pause))
        .route("/resume", post(resume))
        .route("/stop", post(stop))
}

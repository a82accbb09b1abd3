//! Routes for the voice picker.

use axum::extract::State;
use axum::routing::{get, put};
use axum::{Json, Router};
use moonbeams_core::engine::VoiceId;
use moonbeams_narration::domain::voice::VoiceOption;
use moonbeams_session::application::coordinator::BedtimeInput;
use moonbeams_session::application::query_handlers::BedtimeView;
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for PUT /api/v1/voices/selected.
#[derive(Debug, Deserialize)]
pub struct SelectVoiceRequest {
    /// One of the offered voice identifiers.
    pub voice_id: VoiceId,
}

/// GET /api/v1/voices
async fn list_voices(State(state): State<AppState>) -> Json<Vec<VoiceOption>> {
    Json(state.session.voices())
}

/// PUT /api/v1/voices/selected
#[instrument(skip(state, request), fields(voice_id = %request.voice_id))]
async fn select_voice(
    State(state): State<AppState>,
    Json(request): Json<SelectVoiceRequest>,
) -> Result<Json<BedtimeView>, ApiError> {
    let correlation_id = Uuid::new_v4();
    info!(%correlation_id, "handling select_voice command");
    let view = state
        .session
        .send(correlation_id, BedtimeInput::SelectVoice(request.voice_id))
        .await?;
    Ok(Json(view))
}

/// Returns the router for the voice picker.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/voices", get(list_voices))
        .route("/api/v1/voices/selected", put(select_voice))
}

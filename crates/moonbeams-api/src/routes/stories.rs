//! Story generation route.

use axum::extract::State;
use axum::{Json, Router, routing::post};
use moonbeams_core::story::StoryRequest;
use moonbeams_session::application::coordinator::BedtimeInput;
use moonbeams_session::application::query_handlers::BedtimeView;
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /api/v1/stories.
#[derive(Debug, Deserialize)]
pub struct GenerateStoryRequest {
    /// One of `tenali_raman`, `akbar_birbal`, `vikram_betal`,
    /// `panchatantra`.
    pub story_type: String,
    /// Moral or theme of the story.
    pub moral: String,
}

/// POST /api/v1/stories
///
/// Fetches a story and narrates it. The selected sleep duration is passed
/// to the generator as a length hint.
#[instrument(skip(state, request), fields(story_type = %request.story_type))]
async fn generate_story(
    State(state): State<AppState>,
    Json(request): Json<GenerateStoryRequest>,
) -> Result<Json<BedtimeView>, ApiError> {
    let duration = state.session.view().sleep_timer.selected_minutes;
    let story_request = StoryRequest::parse(&request.story_type, &request.moral, duration)?;

    let correlation_id = Uuid::new_v4();
    info!(%correlation_id, moral = %story_request.moral, "requesting story");
    let story = state.story_source.fetch_story(&story_request).await?;

    let view = state
        .session
        .send(correlation_id, BedtimeInput::NarrateStory(story))
        .await?;
    Ok(Json(view))
}

/// Returns the router for story generation.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/v1/stories", post(generate_story))
}

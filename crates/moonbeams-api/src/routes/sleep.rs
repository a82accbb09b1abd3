//! Routes for the sleep timer and the sleep overlay.

use axum::extract::State;
use axum::routing::{post, put};
use axum::{Json, Router};
use moonbeams_session::application::coordinator::BedtimeInput;
use moonbeams_session::application::query_handlers::BedtimeView;
use moonbeams_session::domain::aggregates::Acknowledgement;
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for PUT /api/v1/sleep-timer.
#[derive(Debug, Deserialize)]
pub struct SleepTimerRequest {
    /// Minutes until the session ends; absent or zero means no timer.
    #[serde(default)]
    pub minutes: Option<u32>,
}

/// Request body for POST /api/v1/sleep-overlay/acknowledge.
#[derive(Debug, Default, Deserialize)]
pub struct AcknowledgeRequest {
    /// The key pressed; absent for a pointer acknowledgement.
    #[serde(default)]
    pub key: Option<String>,
}

impl AcknowledgeRequest {
    fn acknowledgement(self) -> Acknowledgement {
        self.key.map_or(Acknowledgement::Pointer, Acknowledgement::Key)
    }
}

/// PUT /api/v1/sleep-timer
#[instrument(skip(state))]
async fn set_sleep_timer(
    State(state): State<AppState>,
    Json(request): Json<SleepTimerRequest>,
) -> Result<Json<BedtimeView>, ApiError> {
    let correlation_id = Uuid::new_v4();
    info!(%correlation_id, minutes = ?request.minutes, "handling select_sleep_duration command");
    let view = state
        .session
        .send(
            correlation_id,
            BedtimeInput::SelectSleepDuration(request.minutes),
        )
        .await?;
    Ok(Json(view))
}

/// DELETE /api/v1/sleep-timer
#[instrument(skip(state))]
async fn cancel_sleep_timer(State(state): State<AppState>) -> Result<Json<BedtimeView>, ApiError> {
    let correlation_id = Uuid::new_v4();
    info!(%correlation_id, "handling cancel_sleep_timer command");
    let view = state
        .session
        .send(correlation_id, BedtimeInput::CancelSleepTimer)
        .await?;
    Ok(Json(view))
}

/// POST /api/v1/sleep-overlay/acknowledge
#[instrument(skip(state))]
async fn acknowledge_overlay(
    State(state): State<AppState>,
    Json(request): Json<AcknowledgeRequest>,
) -> Result<Json<BedtimeView>, ApiError> {
    let correlation_id = Uuid::new_v4();
    info!(%correlation_id, "handling acknowledge_sleep_overlay command");
    let view = state
        .session
        .send(
            correlation_id,
            BedtimeInput::AcknowledgeOverlay(request.acknowledgement()),
        )
        .await?;
    Ok(Json(view))
}

/// Returns the router for the sleep timer and overlay.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/sleep-timer",
            put(set_sleep_timer).delete(cancel_sleep_timer),
        )
        .route("/api/v1/sleep-overlay/acknowledge", post(acknowledge_overlay))
}

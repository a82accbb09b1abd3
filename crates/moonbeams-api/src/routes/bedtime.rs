//! Read-only session endpoints: the bedtime view and the event journal.

use axum::extract::{Query, State};
use axum::{Json, Router, routing::get};
use moonbeams_core::journal::{BoundedJournal, StoredEvent};
use moonbeams_session::application::query_handlers::BedtimeView;
use serde::Deserialize;

use crate::state::AppState;

/// Events returned when no limit is given.
const DEFAULT_EVENT_LIMIT: usize = 50;

/// Query string for GET /api/v1/events.
#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    /// Maximum number of events to return.
    pub limit: Option<usize>,
}

/// GET /api/v1/bedtime
async fn get_bedtime(State(state): State<AppState>) -> Json<BedtimeView> {
    Json(state.session.view())
}

/// GET /api/v1/events
async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Json<Vec<StoredEvent>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_EVENT_LIMIT)
        .min(BoundedJournal::DEFAULT_CAPACITY);
    Json(state.journal.recent(limit))
}

/// Returns the router for session views.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/bedtime", get(get_bedtime))
        .route("/api/v1/events", get(list_events))
}

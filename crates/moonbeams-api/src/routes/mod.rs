//! Route modules organized by bounded context.

use axum::Router;

use crate::state::AppState;

pub mod bedtime;
pub mod health;
pub mod narration;
pub mod sleep;
pub mod stories;
pub mod voices;

/// Returns every route of the service, without middleware.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(bedtime::router())
        .nest("/api/v1/narration", narration::router())
        .merge(voices::router())
        .merge(sleep::router())
        .merge(stories::router())
}

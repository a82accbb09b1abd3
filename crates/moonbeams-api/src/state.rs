//! Shared application state.

use std::sync::Arc;

use moonbeams_core::journal::EventJournal;
use moonbeams_core::story::StorySource;

use crate::runtime::SessionHandle;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Client for the coordinator task.
    pub session: SessionHandle,
    /// Recently recorded domain events.
    pub journal: Arc<dyn EventJournal>,
    /// Where new stories come from.
    pub story_source: Arc<dyn StorySource>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        session: SessionHandle,
        journal: Arc<dyn EventJournal>,
        story_source: Arc<dyn StorySource>,
    ) -> Self {
        Self {
            session,
            journal,
            story_source,
        }
    }
}

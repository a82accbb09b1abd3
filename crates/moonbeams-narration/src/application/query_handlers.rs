//! Query handlers for the narration context.

use moonbeams_core::engine::VoiceId;
use serde::Serialize;

use crate::application::command_handlers::NarrationController;
use crate::domain::aggregates::PlaybackState;

/// Read-only view of narration playback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackView {
    /// Idle, speaking or paused.
    pub state: PlaybackState,
    /// Index of the current unit.
    pub index: usize,
    /// Number of units in the queue.
    pub unit_count: usize,
    /// Text of the current unit.
    pub current_unit: Option<String>,
    /// Voice captured for the narration.
    pub voice: Option<VoiceId>,
    /// Whether the keep-alive prod is scheduled.
    pub keep_alive_active: bool,
    /// Whether a narration engine is present at all.
    pub engine_available: bool,
}

impl Default for PlaybackView {
    fn default() -> Self {
        Self {
            state: PlaybackState::Idle,
            index: 0,
            unit_count: 0,
            current_unit: None,
            voice: None,
            keep_alive_active: false,
            engine_available: false,
        }
    }
}

/// Builds the playback view.
#[must_use]
pub fn get_playback_view(controller: &NarrationController) -> PlaybackView {
    let session = controller.session();
    PlaybackView {
        state: session.state(),
        index: session.index(),
        unit_count: session.queue().len(),
        current_unit: session.current_unit().map(str::to_owned),
        voice: session.voice().cloned(),
        keep_alive_active: controller.keep_alive_active(),
        engine_available: controller.is_available(),
    }
}

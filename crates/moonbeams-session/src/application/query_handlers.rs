//! Query handlers for the bedtime session context.

use chrono::{DateTime, Utc};
use moonbeams_core::engine::VoiceId;
use moonbeams_narration::application::query_handlers::{PlaybackView, get_playback_view};
use moonbeams_narration::domain::voice::VoiceOption;
use serde::Serialize;

use crate::application::coordinator::BedtimeSession;

/// Read-only view of the sleep timer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SleepTimerView {
    /// Whether a countdown is running.
    pub armed: bool,
    /// Absolute expiry time.
    pub deadline: Option<DateTime<Utc>>,
    /// Remaining time as `MM:SS`; absent when hidden.
    pub remaining: Option<String>,
    /// The listener's duration selection.
    pub selected_minutes: Option<u32>,
}

/// Everything a bedtime client needs to render.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BedtimeView {
    /// Narration playback.
    pub playback: PlaybackView,
    /// The sleep timer.
    pub sleep_timer: SleepTimerView,
    /// Whether the sleep overlay is up.
    pub overlay_visible: bool,
    /// Title of the current story.
    pub story_title: Option<String>,
    /// The voice the next narration will use.
    pub selected_voice: Option<VoiceId>,
}

/// Builds the full session view.
#[must_use]
pub fn get_bedtime_view(session: &BedtimeSession) -> BedtimeView {
    let timer = session.timer();
    BedtimeView {
        playback: get_playback_view(session.narration()),
        sleep_timer: SleepTimerView {
            armed: timer.timer().is_armed(),
            deadline: timer.timer().deadline(),
            remaining: timer.display().map(str::to_owned),
            selected_minutes: session.sleep_selection(),
        },
        overlay_visible: session.overlay().is_visible(),
        story_title: session.story().map(|story| story.title.clone()),
        selected_voice: session.voices().selected().cloned(),
    }
}

/// Lists the voice picker entries.
#[must_use]
pub fn get_voice_options(session: &BedtimeSession) -> Vec<VoiceOption> {
    session.voices().options()
}

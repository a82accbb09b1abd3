//! Domain events for the narration context.

use moonbeams_core::engine::{UtteranceId, VoiceId};
use moonbeams_core::event::{DomainEvent, EventMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Emitted when a fresh narration queue is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrationStarted {
    /// The playback session identifier.
    pub session_id: Uuid,
    /// Story title.
    pub title: String,
    /// Speakable units in speaking order.
    pub units: Vec<String>,
    /// Voice captured for this narration.
    pub voice: Option<VoiceId>,
}

/// Emitted when a unit is handed to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitSubmitted {
    /// The playback session identifier.
    pub session_id: Uuid,
    /// Queue index of the unit.
    pub index: usize,
    /// Identifier the engine will echo on completion.
    pub utterance_id: UtteranceId,
    /// Voice actually put on the utterance.
    pub voice: Option<VoiceId>,
}

/// Emitted when the in-flight unit finishes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitCompleted {
    /// The playback session identifier.
    pub session_id: Uuid,
    /// Queue index of the finished unit.
    pub index: usize,
    /// The finished utterance.
    pub utterance_id: UtteranceId,
}

/// Emitted when narration pauses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrationPaused {
    /// The playback session identifier.
    pub session_id: Uuid,
    /// Queue index at the time of pausing.
    pub index: usize,
}

/// Emitted when narration resumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrationResumed {
    /// The playback session identifier.
    pub session_id: Uuid,
    /// Queue index at the time of resuming.
    pub index: usize,
}

/// Why narration ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The listener pressed stop.
    Requested,
    /// Every unit was spoken.
    Finished,
    /// A new narration replaced this one.
    Restarted,
    /// The sleep timer ran out.
    SleepTimerExpired,
    /// The engine rejected an utterance.
    EngineFailure,
    /// The service is shutting down.
    Shutdown,
}

/// Emitted when narration returns to idle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrationStopped {
    /// The playback session identifier.
    pub session_id: Uuid,
    /// Queue index reached before stopping.
    pub index: usize,
    /// Why narration ended.
    pub reason: StopReason,
}

/// Event type identifier for [`NarrationStarted`].
pub const NARRATION_STARTED_EVENT_TYPE: &str = "narration.started";

/// Event type identifier for [`UnitSubmitted`].
pub const UNIT_SUBMITTED_EVENT_TYPE: &str = "narration.unit_submitted";

/// Event type identifier for [`UnitCompleted`].
pub const UNIT_COMPLETED_EVENT_TYPE: &str = "narration.unit_completed";

/// Event type identifier for [`NarrationPaused`].
pub const NARRATION_PAUSED_EVENT_TYPE: &str = "narration.paused";

/// Event type identifier for [`NarrationResumed`].
pub const NARRATION_RESUMED_EVENT_TYPE: &str = "narration.resumed";

/// Event type identifier for [`NarrationStopped`].
pub const NARRATION_STOPPED_EVENT_TYPE: &str = "narration.stopped";

/// Event payload variants for the narration context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NarrationEventKind {
    /// A narration has started.
    NarrationStarted(NarrationStarted),
    /// A unit was submitted to the engine.
    UnitSubmitted(UnitSubmitted),
    /// The in-flight unit finished.
    UnitCompleted(UnitCompleted),
    /// Narration paused.
    NarrationPaused(NarrationPaused),
    /// Narration resumed.
    NarrationResumed(NarrationResumed),
    /// Narration stopped.
    NarrationStopped(NarrationStopped),
}

impl NarrationEventKind {
    /// Event type name for this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::NarrationStarted(_) => NARRATION_STARTED_EVENT_TYPE,
            Self::UnitSubmitted(_) => UNIT_SUBMITTED_EVENT_TYPE,
            Self::UnitCompleted(_) => UNIT_COMPLETED_EVENT_TYPE,
            Self::NarrationPaused(_) => NARRATION_PAUSED_EVENT_TYPE,
            Self::NarrationResumed(_) => NARRATION_RESUMED_EVENT_TYPE,
            Self::NarrationStopped(_) => NARRATION_STOPPED_EVENT_TYPE,
        }
    }
}

/// Domain event envelope for the narration context.
#[derive(Debug, Clone)]
pub struct NarrationEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: NarrationEventKind,
}

impl DomainEvent for NarrationEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("NarrationEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}

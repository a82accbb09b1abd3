//! Domain events for the bedtime session context.

use chrono::{DateTime, Utc};
use moonbeams_core::event::{DomainEvent, EventMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::aggregates::Acknowledgement;

/// Emitted when the sleep timer is armed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SleepTimerArmed {
    /// The sleep timer identifier.
    pub timer_id: Uuid,
    /// Selected duration.
    pub minutes: u32,
    /// Absolute expiry time.
    pub deadline: DateTime<Utc>,
}

/// Why an armed timer was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    /// The listener cancelled it.
    Requested,
    /// A new duration was selected.
    Replaced,
    /// "No timer" was selected.
    Disarmed,
    /// The sleep overlay was dismissed.
    OverlayDismissed,
    /// The service is shutting down.
    Shutdown,
}

/// Emitted when an armed timer is cancelled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SleepTimerCancelled {
    /// The sleep timer identifier.
    pub timer_id: Uuid,
    /// Why it was cancelled.
    pub reason: CancelReason,
}

/// Emitted when the timer runs out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SleepTimerExpired {
    /// The sleep timer identifier.
    pub timer_id: Uuid,
    /// The deadline that was reached.
    pub deadline: DateTime<Utc>,
}

/// Emitted when the sleep overlay is raised.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SleepOverlayShown {
    /// The overlay identifier.
    pub overlay_id: Uuid,
}

/// Emitted when the listener dismisses the sleep overlay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SleepOverlayDismissed {
    /// The overlay identifier.
    pub overlay_id: Uuid,
    /// The gesture that dismissed it.
    pub acknowledgement: Acknowledgement,
}

/// Event type identifier for [`SleepTimerArmed`].
pub const SLEEP_TIMER_ARMED_EVENT_TYPE: &str = "session.sleep_timer_armed";

/// Event type identifier for [`SleepTimerCancelled`].
pub const SLEEP_TIMER_CANCELLED_EVENT_TYPE: &str = "session.sleep_timer_cancelled";

/// Event type identifier for [`SleepTimerExpired`].
pub const SLEEP_TIMER_EXPIRED_EVENT_TYPE: &str = "session.sleep_timer_expired";

/// Event type identifier for [`SleepOverlayShown`].
pub const SLEEP_OVERLAY_SHOWN_EVENT_TYPE: &str = "session.sleep_overlay_shown";

/// Event type identifier for [`SleepOverlayDismissed`].
pub const SLEEP_OVERLAY_DISMISSED_EVENT_TYPE: &str = "session.sleep_overlay_dismissed";

/// Event payload variants for the bedtime session context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionEventKind {
    /// The timer was armed.
    SleepTimerArmed(SleepTimerArmed),
    /// The timer was cancelled.
    SleepTimerCancelled(SleepTimerCancelled),
    /// The timer ran out.
    SleepTimerExpired(SleepTimerExpired),
    /// The overlay was raised.
    SleepOverlayShown(SleepOverlayShown),
    /// The overlay was dismissed.
    SleepOverlayDismissed(SleepOverlayDismissed),
}

impl SessionEventKind {
    /// Event type name for this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::SleepTimerArmed(_) => SLEEP_TIMER_ARMED_EVENT_TYPE,
            Self::SleepTimerCancelled(_) => SLEEP_TIMER_CANCELLED_EVENT_TYPE,
            Self::SleepTimerExpired(_) => SLEEP_TIMER_EXPIRED_EVENT_TYPE,
            Self::SleepOverlayShown(_) => SLEEP_OVERLAY_SHOWN_EVENT_TYPE,
            Self::SleepOverlayDismissed(_) => SLEEP_OVERLAY_DISMISSED_EVENT_TYPE,
        }
    }
}

/// Domain event envelope for the bedtime session context.
#[derive(Debug, Clone)]
pub struct SessionEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: SessionEventKind,
}

impl DomainEvent for SessionEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("SessionEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}

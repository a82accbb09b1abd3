//! Commands for the bedtime session context.

use moonbeams_core::command::Command;
use uuid::Uuid;

use super::aggregates::Acknowledgement;

/// Command to pick a sleep duration. `None` or zero means "no timer".
#[derive(Debug, Clone)]
pub struct SelectSleepDuration {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Minutes until the session ends.
    pub minutes: Option<u32>,
}

impl Command for SelectSleepDuration {
    fn command_type(&self) -> &'static str {
        "session.select_sleep_duration"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to cancel the sleep timer.
#[derive(Debug, Clone)]
pub struct CancelSleepTimer {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

impl Command for CancelSleepTimer {
    fn command_type(&self) -> &'static str {
        "session.cancel_sleep_timer"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command carrying the listener's reaction to the sleep overlay.
#[derive(Debug, Clone)]
pub struct AcknowledgeSleepOverlay {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// How the listener reacted.
    pub acknowledgement: Acknowledgement,
}

impl Command for AcknowledgeSleepOverlay {
    fn command_type(&self) -> &'static str {
        "session.acknowledge_sleep_overlay"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

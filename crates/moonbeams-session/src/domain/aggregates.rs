//! Aggregate roots for the bedtime session context.

use chrono::{DateTime, TimeDelta, Utc};
use moonbeams_core::aggregate::AggregateRoot;
use moonbeams_core::clock::Clock;
use moonbeams_core::event::EventMetadata;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::events::{
    CancelReason, SessionEvent, SessionEventKind, SleepOverlayDismissed, SleepOverlayShown,
    SleepTimerArmed, SleepTimerCancelled, SleepTimerExpired,
};

/// State of the sleep timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    /// No countdown running.
    Inactive,
    /// Counting down to `deadline`.
    Armed {
        /// Selected duration.
        minutes: u32,
        /// Absolute expiry time.
        deadline: DateTime<Utc>,
    },
}

/// How the listener reacted to the sleep overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Acknowledgement {
    /// A click or tap anywhere on the overlay.
    Pointer,
    /// A key press, by key name.
    Key(String),
}

impl Acknowledgement {
    /// Whether this reaction dismisses the overlay. Only a pointer or the
    /// `Escape` and `Enter` keys do.
    #[must_use]
    pub fn dismisses(&self) -> bool {
        match self {
            Self::Pointer => true,
            Self::Key(key) => matches!(key.as_str(), "Escape" | "Enter"),
        }
    }
}

/// The aggregate root for the session countdown.
///
/// At most one timer is armed; arming again replaces it.
#[derive(Debug)]
pub struct SleepTimer {
    /// Aggregate identifier.
    pub id: Uuid,
    pub(crate) version: i64,
    pub(crate) state: TimerState,
    armed_correlation_id: Option<Uuid>,
    uncommitted_events: Vec<SessionEvent>,
}

impl SleepTimer {
    /// Creates an inactive timer.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            version: 0,
            state: TimerState::Inactive,
            armed_correlation_id: None,
            uncommitted_events: Vec::new(),
        }
    }

    /// Current timer state.
    #[must_use]
    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Deadline of the armed timer.
    #[must_use]
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        match self.state {
            TimerState::Armed { deadline, .. } => Some(deadline),
            TimerState::Inactive => None,
        }
    }

    /// Whether a countdown is running.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        matches!(self.state, TimerState::Armed { .. })
    }

    /// Correlation ID of the command that armed the running countdown.
    #[must_use]
    pub fn armed_correlation_id(&self) -> Uuid {
        self.armed_correlation_id.unwrap_or_else(Uuid::nil)
    }

    fn record(&mut self, kind: SessionEventKind, correlation_id: Uuid, clock: &dyn Clock) {
        let event = SessionEvent {
            metadata: EventMetadata::new(
                kind.event_type(),
                self.id,
                self.version + 1,
                correlation_id,
                clock.now(),
            ),
            kind,
        };
        self.apply(&event);
        self.uncommitted_events.push(event);
    }

    /// Arms the timer for `minutes` (must be positive) from now, replacing
    /// any running countdown. Returns the new deadline.
    pub fn arm(&mut self, minutes: u32, correlation_id: Uuid, clock: &dyn Clock) -> DateTime<Utc> {
        debug_assert!(minutes > 0, "arm requires a positive duration");
        self.cancel(CancelReason::Replaced, correlation_id, clock);
        let deadline = clock.now() + TimeDelta::minutes(i64::from(minutes));
        self.record(
            SessionEventKind::SleepTimerArmed(SleepTimerArmed {
                timer_id: self.id,
                minutes,
                deadline,
            }),
            correlation_id,
            clock,
        );
        deadline
    }

    /// Marks the countdown as run out. Returns `false` when not armed.
    pub fn expire(&mut self, clock: &dyn Clock) -> bool {
        let TimerState::Armed { deadline, .. } = self.state else {
            return false;
        };
        let correlation_id = self.armed_correlation_id();
        self.record(
            SessionEventKind::SleepTimerExpired(SleepTimerExpired {
                timer_id: self.id,
                deadline,
            }),
            correlation_id,
            clock,
        );
        true
    }

    /// Cancels the countdown. Returns `false` (and records nothing) when
    /// not armed.
    pub fn cancel(&mut self, reason: CancelReason, correlation_id: Uuid, clock: &dyn Clock) -> bool {
        if !self.is_armed() {
            return false;
        }
        self.record(
            SessionEventKind::SleepTimerCancelled(SleepTimerCancelled {
                timer_id: self.id,
                reason,
            }),
            correlation_id,
            clock,
        );
        true
    }
}

impl AggregateRoot for SleepTimer {
    type Event = SessionEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match &event.kind {
            SessionEventKind::SleepTimerArmed(payload) => {
                self.state = TimerState::Armed {
                    minutes: payload.minutes,
                    deadline: payload.deadline,
                };
                self.armed_correlation_id = Some(event.metadata.correlation_id);
            }
            SessionEventKind::SleepTimerCancelled(_) | SessionEventKind::SleepTimerExpired(_) => {
                self.state = TimerState::Inactive;
                self.armed_correlation_id = None;
            }
            SessionEventKind::SleepOverlayShown(_) | SessionEventKind::SleepOverlayDismissed(_) => {}
        }
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn take_uncommitted_events(&mut self) -> Vec<Self::Event> {
        std::mem::take(&mut self.uncommitted_events)
    }
}

/// The aggregate root for the "time to sleep" overlay.
#[derive(Debug)]
pub struct SleepOverlay {
    /// Aggregate identifier.
    pub id: Uuid,
    pub(crate) version: i64,
    pub(crate) visible: bool,
    uncommitted_events: Vec<SessionEvent>,
}

impl SleepOverlay {
    /// Creates a hidden overlay.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            version: 0,
            visible: false,
            uncommitted_events: Vec::new(),
        }
    }

    /// Whether the overlay is on screen.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    fn record(&mut self, kind: SessionEventKind, correlation_id: Uuid, clock: &dyn Clock) {
        let event = SessionEvent {
            metadata: EventMetadata::new(
                kind.event_type(),
                self.id,
                self.version + 1,
                correlation_id,
                clock.now(),
            ),
            kind,
        };
        self.apply(&event);
        self.uncommitted_events.push(event);
    }

    /// Raises the overlay. Returns `false` if already visible.
    pub fn show(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> bool {
        if self.visible {
            return false;
        }
        self.record(
            SessionEventKind::SleepOverlayShown(SleepOverlayShown {
                overlay_id: self.id,
            }),
            correlation_id,
            clock,
        );
        true
    }

    /// Hides the overlay if visible and `acknowledgement` dismisses it.
    pub fn dismiss(
        &mut self,
        acknowledgement: &Acknowledgement,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> bool {
        if !self.visible || !acknowledgement.dismisses() {
            return false;
        }
        self.record(
            SessionEventKind::SleepOverlayDismissed(SleepOverlayDismissed {
                overlay_id: self.id,
                acknowledgement: acknowledgement.clone(),
            }),
            correlation_id,
            clock,
        );
        true
    }
}

impl AggregateRoot for SleepOverlay {
    type Event = SessionEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match &event.kind {
            SessionEventKind::SleepOverlayShown(_) => self.visible = true,
            SessionEventKind::SleepOverlayDismissed(_) => self.visible = false,
            SessionEventKind::SleepTimerArmed(_)
            | SessionEventKind::SleepTimerCancelled(_)
            | SessionEventKind::SleepTimerExpired(_) => {}
        }
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn take_uncommitted_events(&mut self) -> Vec<Self::Event> {
        std::mem::take(&mut self.uncommitted_events)
    }
}

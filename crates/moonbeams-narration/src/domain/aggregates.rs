//! Aggregate roots for the narration context.

use moonbeams_core::aggregate::AggregateRoot;
use moonbeams_core::clock::Clock;
use moonbeams_core::engine::{UtteranceId, VoiceId};
use moonbeams_core::event::EventMetadata;
use serde::Serialize;
use uuid::Uuid;

use super::events::{
    NarrationEvent, NarrationEventKind, NarrationPaused, NarrationResumed, NarrationStarted,
    NarrationStopped, StopReason, UnitCompleted, UnitSubmitted,
};

/// Playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    /// Nothing to narrate.
    Idle,
    /// Units are being fed to the engine.
    Speaking,
    /// Paused mid-utterance.
    Paused,
}

/// Result of a completion signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The signal did not match the in-flight utterance and was ignored.
    Stale,
    /// The unit finished and more remain.
    Advanced,
    /// The unit finished and it was the last one.
    Exhausted,
}

/// The aggregate root for narration playback.
///
/// Invariants: `index <= queue.len()`; `Idle` implies an empty queue and
/// index 0; at most one utterance is in flight.
#[derive(Debug)]
pub struct PlaybackSession {
    /// Aggregate identifier.
    pub id: Uuid,
    /// Current version (event count).
    pub(crate) version: i64,
    pub(crate) state: PlaybackState,
    pub(crate) queue: Vec<String>,
    pub(crate) index: usize,
    pub(crate) voice: Option<VoiceId>,
    pub(crate) in_flight: Option<UtteranceId>,
    /// Correlation ID of the command that started the current narration.
    pub(crate) narration_correlation_id: Option<Uuid>,
    /// Uncommitted events pending drain.
    uncommitted_events: Vec<NarrationEvent>,
}

impl PlaybackSession {
    /// Creates an idle playback session.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            version: 0,
            state: PlaybackState::Idle,
            queue: Vec::new(),
            index: 0,
            voice: None,
            in_flight: None,
            narration_correlation_id: None,
            uncommitted_events: Vec::new(),
        }
    }

    /// Current playback state.
    #[must_use]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Index of the unit being (or about to be) spoken.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The narration queue.
    #[must_use]
    pub fn queue(&self) -> &[String] {
        &self.queue
    }

    /// The unit at the current index, if any.
    #[must_use]
    pub fn current_unit(&self) -> Option<&str> {
        self.queue.get(self.index).map(String::as_str)
    }

    /// Voice captured when the narration started.
    #[must_use]
    pub fn voice(&self) -> Option<&VoiceId> {
        self.voice.as_ref()
    }

    /// Utterance currently at the engine.
    #[must_use]
    pub fn in_flight(&self) -> Option<UtteranceId> {
        self.in_flight
    }

    /// Correlation ID for events caused by engine signals and wakeups.
    #[must_use]
    pub fn narration_correlation_id(&self) -> Uuid {
        self.narration_correlation_id.unwrap_or_else(Uuid::nil)
    }

    fn record(&mut self, kind: NarrationEventKind, correlation_id: Uuid, clock: &dyn Clock) {
        let event = NarrationEvent {
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

    /// Loads a fresh queue and starts speaking. Only valid from `Idle`;
    /// returns `false` otherwise or when `units` is empty.
    pub fn start(
        &mut self,
        title: &str,
        units: Vec<String>,
        voice: Option<VoiceId>,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> bool {
        if self.state != PlaybackState::Idle || units.is_empty() {
            return false;
        }
        self.record(
            NarrationEventKind::NarrationStarted(NarrationStarted {
                session_id: self.id,
                title: title.to_owned(),
                units,
                voice,
            }),
            correlation_id,
            clock,
        );
        true
    }

    /// Marks the current unit as in flight and returns its text. Returns
    /// `None` unless speaking with nothing in flight and units remaining.
    pub fn submit_current(
        &mut self,
        utterance_id: UtteranceId,
        voice: Option<VoiceId>,
        clock: &dyn Clock,
    ) -> Option<String> {
        if self.state != PlaybackState::Speaking || self.in_flight.is_some() {
            return None;
        }
        let text = self.current_unit()?.to_owned();
        self.record(
            NarrationEventKind::UnitSubmitted(UnitSubmitted {
                session_id: self.id,
                index: self.index,
                utterance_id,
                voice,
            }),
            self.narration_correlation_id(),
            clock,
        );
        Some(text)
    }

    /// Handles the engine's completion signal for `utterance_id`.
    pub fn complete(&mut self, utterance_id: UtteranceId, clock: &dyn Clock) -> Completion {
        if self.state == PlaybackState::Idle || self.in_flight != Some(utterance_id) {
            return Completion::Stale;
        }
        self.record(
            NarrationEventKind::UnitCompleted(UnitCompleted {
                session_id: self.id,
                index: self.index,
                utterance_id,
            }),
            self.narration_correlation_id(),
            clock,
        );
        if self.index >= self.queue.len() {
            Completion::Exhausted
        } else {
            Completion::Advanced
        }
    }

    /// `Speaking` -> `Paused`. Returns `false` in any other state.
    pub fn pause(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> bool {
        if self.state != PlaybackState::Speaking {
            return false;
        }
        self.record(
            NarrationEventKind::NarrationPaused(NarrationPaused {
                session_id: self.id,
                index: self.index,
            }),
            correlation_id,
            clock,
        );
        true
    }

    /// `Paused` -> `Speaking`. Returns `false` in any other state.
    pub fn resume(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> bool {
        if self.state != PlaybackState::Paused {
            return false;
        }
        self.record(
            NarrationEventKind::NarrationResumed(NarrationResumed {
                session_id: self.id,
                index: self.index,
            }),
            correlation_id,
            clock,
        );
        true
    }

    /// Returns to `Idle`, clearing the queue. Returns `false` (and records
    /// nothing) when already idle.
    pub fn stop(&mut self, reason: StopReason, correlation_id: Uuid, clock: &dyn Clock) -> bool {
        if self.state == PlaybackState::Idle {
            return false;
        }
        self.record(
            NarrationEventKind::NarrationStopped(NarrationStopped {
                session_id: self.id,
                index: self.index,
                reason,
            }),
            correlation_id,
            clock,
        );
        true
    }
}

impl AggregateRoot for PlaybackSession {
    type Event = NarrationEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match &event.kind {
            NarrationEventKind::NarrationStarted(payload) => {
                self.state = PlaybackState::Speaking;
                self.queue.clone_from(&payload.units);
                self.index = 0;
                self.voice.clone_from(&payload.voice);
                self.in_flight = None;
                self.narration_correlation_id = Some(event.metadata.correlation_id);
            }
            NarrationEventKind::UnitSubmitted(payload) => {
                self.in_flight = Some(payload.utterance_id);
            }
            NarrationEventKind::UnitCompleted(_) => {
                self.in_flight = None;
                self.index = (self.index + 1).min(self.queue.len());
            }
            NarrationEventKind::NarrationPaused(_) => {
                self.state = PlaybackState::Paused;
            }
            NarrationEventKind::NarrationResumed(_) => {
                self.state = PlaybackState::Speaking;
            }
            NarrationEventKind::NarrationStopped(_) => {
                self.state = PlaybackState::Idle;
                self.queue.clear();
                self.index = 0;
                self.voice = None;
                self.in_flight = None;
                self.narration_correlation_id = None;
            }
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

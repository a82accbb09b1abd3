//! The bedtime session coordinator.
//!
//! [`BedtimeSession`] is the single owner of everything that changes during
//! a bedtime session: narration playback, the sleep timer, the overlay, the
//! voice picker and the current story. Every command, engine signal and
//! wakeup arrives through [`BedtimeSession::handle`] or
//! [`BedtimeSession::advance`] and is processed to completion before the
//! next one.

use chrono::{DateTime, Utc};
use moonbeams_core::aggregate::AggregateRoot;
use moonbeams_core::clock::Clock;
use moonbeams_core::command::Command;
use moonbeams_core::engine::{UtteranceId, Voice, VoiceId};
use moonbeams_core::error::DomainError;
use moonbeams_core::journal::StoredEvent;
use moonbeams_core::story::Story;
use moonbeams_narration::application::command_handlers::NarrationController;
use moonbeams_narration::domain::aggregates::PlaybackState;
use moonbeams_narration::domain::commands::{
    PauseNarration, ResumeNarration, StartNarration, StopNarration,
};
use moonbeams_narration::domain::events::StopReason;
use moonbeams_narration::domain::voice::{VoicePreferences, VoiceSelector};
use tracing::{debug, info};
use uuid::Uuid;

use crate::application::command_handlers::{SleepTimerController, TimerFired};
use crate::domain::aggregates::{Acknowledgement, SleepOverlay};
use crate::domain::commands::{AcknowledgeSleepOverlay, CancelSleepTimer, SelectSleepDuration};
use crate::domain::events::CancelReason;

/// Inputs accepted by the coordinator.
#[derive(Debug, Clone)]
pub enum BedtimeInput {
    /// A story arrived; make it current and narrate it.
    NarrateStory(Story),
    /// Resume if paused, otherwise restart the current story.
    Play,
    /// Pause narration.
    Pause,
    /// Resume narration.
    Resume,
    /// Stop narration.
    Stop,
    /// Pick a sleep duration in minutes; `None` or zero means no timer.
    SelectSleepDuration(Option<u32>),
    /// Cancel the sleep timer.
    CancelSleepTimer,
    /// The listener reacted to the sleep overlay.
    AcknowledgeOverlay(Acknowledgement),
    /// The listener picked a voice.
    SelectVoice(VoiceId),
    /// The engine finished an utterance.
    UtteranceCompleted(UtteranceId),
    /// The engine's voice list changed.
    VoicesChanged(Vec<Voice>),
    /// The service is going away.
    Shutdown,
}

/// Coordinates narration, the sleep timer and the sleep overlay.
#[derive(Debug)]
pub struct BedtimeSession {
    narration: NarrationController,
    timer: SleepTimerController,
    overlay: SleepOverlay,
    voices: VoiceSelector,
    story: Option<Story>,
    sleep_selection: Option<u32>,
    pending_events: Vec<StoredEvent>,
}

impl BedtimeSession {
    /// Creates a session around `narration`, seeding the voice picker with
    /// whatever the engine offers right now.
    #[must_use]
    pub fn new(narration: NarrationController, preferences: VoicePreferences) -> Self {
        let mut voices = VoiceSelector::new(preferences);
        voices.voices_changed(narration.voices());
        Self {
            narration,
            timer: SleepTimerController::new(),
            overlay: SleepOverlay::new(Uuid::new_v4()),
            voices,
            story: None,
            sleep_selection: None,
            pending_events: Vec::new(),
        }
    }

    /// The narration controller.
    #[must_use]
    pub fn narration(&self) -> &NarrationController {
        &self.narration
    }

    /// The sleep timer controller.
    #[must_use]
    pub fn timer(&self) -> &SleepTimerController {
        &self.timer
    }

    /// The sleep overlay.
    #[must_use]
    pub fn overlay(&self) -> &SleepOverlay {
        &self.overlay
    }

    /// The voice picker.
    #[must_use]
    pub fn voices(&self) -> &VoiceSelector {
        &self.voices
    }

    /// The most recently received story.
    #[must_use]
    pub fn story(&self) -> Option<&Story> {
        self.story.as_ref()
    }

    /// The selected sleep duration.
    #[must_use]
    pub fn sleep_selection(&self) -> Option<u32> {
        self.sleep_selection
    }

    /// Earliest instant at which [`advance`](Self::advance) has work.
    #[must_use]
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        match (self.timer.next_deadline(), self.narration.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Drains the events recorded since the last call, in the order they
    /// happened.
    pub fn take_events(&mut self) -> Vec<StoredEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Applies one input.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` when selecting a voice the engine
    /// does not offer. Every other input is total.
    pub fn handle(
        &mut self,
        correlation_id: Uuid,
        input: BedtimeInput,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        let result = self.dispatch(correlation_id, input, clock);
        self.collect_events();
        result
    }

    /// Fires every wakeup that is due, in deadline order. On a tie the
    /// timer goes first, so an expiring timer preempts narration work
    /// scheduled for the same instant.
    pub fn advance(&mut self, clock: &dyn Clock) {
        let now = clock.now();
        loop {
            let timer_due = self.timer.next_deadline().filter(|d| *d <= now);
            let narration_due = self.narration.next_deadline().filter(|d| *d <= now);

            match (timer_due, narration_due) {
                (Some(t), Some(n)) if n < t => {
                    self.narration.fire_next_due(clock);
                }
                (Some(_), _) => {
                    let correlation_id = self.timer.timer().armed_correlation_id();
                    let fired = self.timer.fire_next_due(clock);
                    self.collect_events();
                    if fired == Some(TimerFired::Expired) {
                        self.on_timer_expired(correlation_id, clock);
                    }
                }
                (None, Some(_)) => {
                    self.narration.fire_next_due(clock);
                }
                (None, None) => break,
            }
            self.collect_events();
        }
    }

    fn dispatch(
        &mut self,
        correlation_id: Uuid,
        input: BedtimeInput,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        match input {
            BedtimeInput::NarrateStory(story) => {
                info!(%correlation_id, title = %story.title, "story received");
                self.story = Some(story);
                self.start_current_story(correlation_id, clock);
            }
            BedtimeInput::Play => match self.narration.state() {
                PlaybackState::Paused => {
                    self.narration
                        .handle_resume(&ResumeNarration { correlation_id }, clock);
                }
                PlaybackState::Idle if self.story.is_some() => {
                    self.start_current_story(correlation_id, clock);
                }
                state => debug!(?state, has_story = self.story.is_some(), "ignoring play"),
            },
            BedtimeInput::Pause => {
                self.narration
                    .handle_pause(&PauseNarration { correlation_id }, clock);
            }
            BedtimeInput::Resume => {
                self.narration
                    .handle_resume(&ResumeNarration { correlation_id }, clock);
            }
            BedtimeInput::Stop => {
                self.narration
                    .handle_stop(&StopNarration { correlation_id }, clock);
            }
            BedtimeInput::SelectSleepDuration(minutes) => {
                let command = SelectSleepDuration {
                    correlation_id,
                    minutes,
                };
                self.sleep_selection = minutes.filter(|m| *m > 0);
                self.timer.handle_arm(&command, clock);
            }
            BedtimeInput::CancelSleepTimer => {
                self.timer
                    .handle_cancel(&CancelSleepTimer { correlation_id }, clock);
                self.sleep_selection = None;
            }
            BedtimeInput::AcknowledgeOverlay(acknowledgement) => {
                let command = AcknowledgeSleepOverlay {
                    correlation_id,
                    acknowledgement,
                };
                self.acknowledge_overlay(&command, clock);
            }
            BedtimeInput::SelectVoice(voice) => {
                self.voices.select(&voice)?;
                info!(%correlation_id, %voice, "voice selected");
            }
            BedtimeInput::UtteranceCompleted(utterance_id) => {
                self.narration.handle_utterance_completed(utterance_id, clock);
            }
            BedtimeInput::VoicesChanged(voices) => {
                debug!(count = voices.len(), "voices changed");
                self.voices.voices_changed(voices);
            }
            BedtimeInput::Shutdown => {
                self.narration
                    .stop_for(StopReason::Shutdown, correlation_id, clock);
                self.timer.cancel(CancelReason::Shutdown, correlation_id, clock);
                info!(%correlation_id, "bedtime session shut down");
            }
        }
        Ok(())
    }

    fn start_current_story(&mut self, correlation_id: Uuid, clock: &dyn Clock) {
        let Some(story) = self.story.clone() else {
            return;
        };
        let command = StartNarration {
            correlation_id,
            story,
            voice: self.voices.selected().cloned(),
        };
        self.narration.handle_start(&command, clock);
    }

    fn acknowledge_overlay(&mut self, command: &AcknowledgeSleepOverlay, clock: &dyn Clock) {
        if !self
            .overlay
            .dismiss(&command.acknowledgement, command.correlation_id, clock)
        {
            debug!(
                visible = self.overlay.is_visible(),
                acknowledgement = ?command.acknowledgement,
                "overlay not dismissed"
            );
            return;
        }
        self.timer
            .cancel(CancelReason::OverlayDismissed, command.correlation_id, clock);
        self.sleep_selection = None;
        info!(
            command = command.command_type(),
            correlation_id = %command.correlation_id,
            "sleep overlay dismissed"
        );
    }

    fn on_timer_expired(&mut self, correlation_id: Uuid, clock: &dyn Clock) {
        self.narration
            .stop_for(StopReason::SleepTimerExpired, correlation_id, clock);
        self.overlay.show(correlation_id, clock);
        info!(%correlation_id, "sleep overlay shown");
    }

    fn collect_events(&mut self) {
        let narration = self.narration.take_events();
        let timer = self.timer.take_events();
        let overlay = self.overlay.take_uncommitted_events();
        self.pending_events.extend(
            narration
                .iter()
                .map(StoredEvent::from_event)
                .chain(timer.iter().map(StoredEvent::from_event))
                .chain(overlay.iter().map(StoredEvent::from_event)),
        );
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone};
    use moonbeams_narration::application::command_handlers::PlaybackConfig;
    use moonbeams_test_support::{EngineProbe, ManualClock, RecordingEngine};

    use super::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 20, 30, 0).unwrap()
    }

    fn fox() -> Story {
        Story::new("The Fox", "Once upon a time. The fox slept.")
    }

    fn session() -> (BedtimeSession, EngineProbe, ManualClock) {
        let (engine, probe) = RecordingEngine::new(vec![
            Voice::new("lekha", "Lekha", "hi-IN"),
            Voice::new("rishi", "Rishi", "en-IN"),
        ]);
        let narration = NarrationController::new(Some(Box::new(engine)), PlaybackConfig::default());
        let session = BedtimeSession::new(narration, VoicePreferences::default());
        (session, probe, ManualClock::new(t0()))
    }

    fn send(session: &mut BedtimeSession, clock: &ManualClock, input: BedtimeInput) {
        session.handle(Uuid::new_v4(), input, clock).unwrap();
    }

    fn step(session: &mut BedtimeSession, clock: &ManualClock, delta: TimeDelta) {
        clock.advance(delta);
        session.advance(clock);
    }

    fn event_types(session: &mut BedtimeSession) -> Vec<String> {
        session
            .take_events()
            .into_iter()
            .map(|event| event.event_type)
            .collect()
    }

    #[test]
    fn test_fox_story_is_narrated_to_the_end() {
        // Arrange
        let (mut session, probe, clock) = session();
        send(&mut session, &clock, BedtimeInput::SelectSleepDuration(Some(1)));
        send(&mut session, &clock, BedtimeInput::NarrateStory(fox()));

        // Act
        step(&mut session, &clock, TimeDelta::milliseconds(250));
        for _ in 0..3 {
            let finished = probe.finish_current().unwrap();
            send(&mut session, &clock, BedtimeInput::UtteranceCompleted(finished));
            step(&mut session, &clock, TimeDelta::seconds(1));
        }

        // Assert
        assert_eq!(
            probe.submitted_texts(),
            vec!["The Fox.", "Once upon a time.", "The fox slept."]
        );
        assert_eq!(session.narration().state(), PlaybackState::Idle);
        assert!(session.narration().session().queue().is_empty());
        assert!(!session.overlay().is_visible());
        assert!(session.timer().timer().is_armed());
    }

    #[test]
    fn test_fox_story_is_force_stopped_when_timer_expires() {
        // Arrange
        let (mut session, probe, clock) = session();
        send(&mut session, &clock, BedtimeInput::SelectSleepDuration(Some(1)));
        send(&mut session, &clock, BedtimeInput::NarrateStory(fox()));
        step(&mut session, &clock, TimeDelta::milliseconds(250));
        session.take_events();
        let cancels_before = probe.cancel_calls();

        // Act: the listener never lets the first unit finish.
        for _ in 0..60 {
            step(&mut session, &clock, TimeDelta::seconds(1));
        }

        // Assert
        assert_eq!(session.narration().state(), PlaybackState::Idle);
        assert!(session.overlay().is_visible());
        assert!(!session.timer().timer().is_armed());
        assert!(probe.cancel_calls() > cancels_before);

        let types = event_types(&mut session);
        let stopped = types.iter().position(|t| t == "narration.stopped").unwrap();
        let expired = types
            .iter()
            .position(|t| t == "session.sleep_timer_expired")
            .unwrap();
        let shown = types
            .iter()
            .position(|t| t == "session.sleep_overlay_shown")
            .unwrap();
        assert!(expired < stopped);
        assert!(stopped < shown);
    }

    #[test]
    fn test_overlay_shown_after_idle_expiry() {
        let (mut session, _probe, clock) = session();
        send(&mut session, &clock, BedtimeInput::SelectSleepDuration(Some(1)));

        clock.set(t0() + TimeDelta::minutes(1) + TimeDelta::milliseconds(1));
        session.advance(&clock);

        assert!(session.overlay().is_visible());
        assert_eq!(
            event_types(&mut session),
            vec![
                "session.sleep_timer_armed",
                "session.sleep_timer_expired",
                "session.sleep_overlay_shown",
            ]
        );
    }

    #[test]
    fn test_dismissing_overlay_resets_sleep_selection() {
        // Arrange
        let (mut session, _probe, clock) = session();
        send(&mut session, &clock, BedtimeInput::SelectSleepDuration(Some(1)));
        clock.advance(TimeDelta::minutes(2));
        session.advance(&clock);

        // Act
        send(
            &mut session,
            &clock,
            BedtimeInput::AcknowledgeOverlay(Acknowledgement::Key("a".into())),
        );
        let still_visible = session.overlay().is_visible();
        send(
            &mut session,
            &clock,
            BedtimeInput::AcknowledgeOverlay(Acknowledgement::Key("Escape".into())),
        );

        // Assert
        assert!(still_visible);
        assert!(!session.overlay().is_visible());
        assert_eq!(session.sleep_selection(), None);
        assert!(session.next_deadline().is_none());
    }

    #[test]
    fn test_stop_twice_matches_stop_once() {
        let (mut session, probe, clock) = session();
        send(&mut session, &clock, BedtimeInput::NarrateStory(fox()));
        step(&mut session, &clock, TimeDelta::milliseconds(250));

        send(&mut session, &clock, BedtimeInput::Stop);
        let once = (
            session.narration().state(),
            session.narration().session().index(),
            session.narration().session().queue().len(),
            session.narration().keep_alive_active(),
            session.next_deadline(),
        );
        let events_after_once = session.take_events().len();
        send(&mut session, &clock, BedtimeInput::Stop);
        let twice = (
            session.narration().state(),
            session.narration().session().index(),
            session.narration().session().queue().len(),
            session.narration().keep_alive_active(),
            session.next_deadline(),
        );

        assert_eq!(once, twice);
        assert!(events_after_once > 0);
        assert!(session.take_events().is_empty());
        assert_eq!(probe.submitted().len(), 1);
    }

    #[test]
    fn test_play_resumes_or_restarts_current_story() {
        // Arrange
        let (mut session, probe, clock) = session();

        // Act / Assert: nothing to play yet.
        send(&mut session, &clock, BedtimeInput::Play);
        assert_eq!(session.narration().state(), PlaybackState::Idle);

        send(&mut session, &clock, BedtimeInput::NarrateStory(fox()));
        step(&mut session, &clock, TimeDelta::milliseconds(250));
        send(&mut session, &clock, BedtimeInput::Pause);
        assert_eq!(session.narration().state(), PlaybackState::Paused);

        send(&mut session, &clock, BedtimeInput::Play);
        assert_eq!(session.narration().state(), PlaybackState::Speaking);
        assert_eq!(probe.resume_calls(), 1);

        send(&mut session, &clock, BedtimeInput::Stop);
        send(&mut session, &clock, BedtimeInput::Play);
        assert_eq!(session.narration().state(), PlaybackState::Speaking);
        assert_eq!(session.narration().session().index(), 0);
    }

    #[test]
    fn test_narration_uses_selected_voice() {
        let (mut session, probe, clock) = session();
        send(
            &mut session,
            &clock,
            BedtimeInput::SelectVoice(VoiceId::new("rishi")),
        );

        send(&mut session, &clock, BedtimeInput::NarrateStory(fox()));
        step(&mut session, &clock, TimeDelta::milliseconds(250));

        let submitted = probe.last_submitted().unwrap();
        assert_eq!(submitted.voice, Some(VoiceId::new("rishi")));
    }

    #[test]
    fn test_selecting_unknown_voice_is_rejected() {
        let (mut session, _probe, clock) = session();

        let result = session.handle(
            Uuid::new_v4(),
            BedtimeInput::SelectVoice(VoiceId::new("nobody")),
            &clock,
        );

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_shutdown_stops_narration_and_cancels_timer() {
        let (mut session, _probe, clock) = session();
        send(&mut session, &clock, BedtimeInput::SelectSleepDuration(Some(30)));
        send(&mut session, &clock, BedtimeInput::NarrateStory(fox()));

        send(&mut session, &clock, BedtimeInput::Shutdown);

        assert_eq!(session.narration().state(), PlaybackState::Idle);
        assert!(!session.timer().timer().is_armed());
        assert!(session.next_deadline().is_none());
    }
}

//! Command handlers for the narration context.
//!
//! [`NarrationController`] owns the playback aggregate, the engine adapter
//! and the controller's own wakeups (the first-unit grace delay and the
//! keep-alive prod). Every handler is total: inputs that make no sense in
//! the current state are logged and ignored.

use std::fmt;

use chrono::TimeDelta;
use moonbeams_core::aggregate::AggregateRoot;
use moonbeams_core::clock::Clock;
use moonbeams_core::command::Command;
use moonbeams_core::engine::{NarrationEngine, Utterance, UtteranceId, Voice};
use moonbeams_core::schedule::{Schedule, WakeupHandle};
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::domain::aggregates::{Completion, PlaybackSession, PlaybackState};
use crate::domain::chunker;
use crate::domain::commands::{PauseNarration, ResumeNarration, StartNarration, StopNarration};
use crate::domain::events::{NarrationEvent, StopReason};
use crate::domain::voice;

/// Timing and utterance parameters for playback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackConfig {
    /// Delay between `start` and the first submission, so the engine does
    /// not clip the first word.
    pub grace_delay: TimeDelta,
    /// Period of the keep-alive prod while speaking.
    pub keep_alive_interval: TimeDelta,
    /// Speech rate applied to every utterance.
    pub rate: f32,
    /// Pitch applied to every utterance.
    pub pitch: f32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            grace_delay: TimeDelta::milliseconds(250),
            keep_alive_interval: TimeDelta::seconds(5),
            rate: 0.95,
            pitch: 1.0,
        }
    }
}

/// Wakeups owned by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackWakeup {
    /// Grace delay elapsed; submit the first unit.
    SubmitFirst,
    /// Time to prod the engine.
    KeepAlive,
}

/// The narration playback controller.
pub struct NarrationController {
    engine: Option<Box<dyn NarrationEngine>>,
    session: PlaybackSession,
    schedule: Schedule<PlaybackWakeup>,
    grace: Option<WakeupHandle>,
    keep_alive: Option<WakeupHandle>,
    next_utterance: u64,
    config: PlaybackConfig,
}

impl fmt::Debug for NarrationController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NarrationController")
            .field("engine_available", &self.engine.is_some())
            .field("session", &self.session)
            .field("grace", &self.grace)
            .field("keep_alive", &self.keep_alive)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl NarrationController {
    /// Creates a controller. `engine` is `None` when the runtime has no
    /// text-to-speech; every operation is then a silent no-op.
    #[must_use]
    pub fn new(engine: Option<Box<dyn NarrationEngine>>, config: PlaybackConfig) -> Self {
        Self {
            engine,
            session: PlaybackSession::new(Uuid::new_v4()),
            schedule: Schedule::new(),
            grace: None,
            keep_alive: None,
            next_utterance: 1,
            config,
        }
    }

    /// Whether a narration engine is present.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.engine.is_some()
    }

    /// The playback aggregate.
    #[must_use]
    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    /// Current playback state.
    #[must_use]
    pub fn state(&self) -> PlaybackState {
        self.session.state()
    }

    /// The playback configuration.
    #[must_use]
    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Whether the keep-alive prod is currently scheduled.
    #[must_use]
    pub fn keep_alive_active(&self) -> bool {
        self.keep_alive
            .is_some_and(|handle| self.schedule.is_pending(handle))
    }

    /// Voices the engine currently offers.
    #[must_use]
    pub fn voices(&self) -> Vec<Voice> {
        self.engine
            .as_ref()
            .map(|engine| engine.list_voices())
            .unwrap_or_default()
    }

    /// Drains the recorded narration events.
    pub fn take_events(&mut self) -> Vec<NarrationEvent> {
        self.session.take_uncommitted_events()
    }

    /// Deadline of the next controller wakeup.
    #[must_use]
    pub fn next_deadline(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.schedule.next_deadline()
    }

    /// Handles `StartNarration`: tears down any current narration, builds a
    /// fresh queue and schedules the first unit after the grace delay.
    /// Returns whether a narration started.
    pub fn handle_start(&mut self, command: &StartNarration, clock: &dyn Clock) -> bool {
        if self.engine.is_none() {
            debug!("no narration engine; ignoring start");
            return false;
        }

        self.teardown(StopReason::Restarted, command.correlation_id, clock);

        let units = chunker::split(&command.story.narration_text());
        if !self.session.start(
            &command.story.title,
            units,
            command.voice.clone(),
            command.correlation_id,
            clock,
        ) {
            info!(title = %command.story.title, "story has nothing to narrate");
            return false;
        }

        let now = clock.now();
        self.keep_alive = Some(self.schedule.schedule_after(
            now,
            self.config.keep_alive_interval,
            PlaybackWakeup::KeepAlive,
        ));
        self.grace = Some(self.schedule.schedule_after(
            now,
            self.config.grace_delay,
            PlaybackWakeup::SubmitFirst,
        ));

        info!(
            command = command.command_type(),
            correlation_id = %command.correlation_id,
            title = %command.story.title,
            units = self.session.queue().len(),
            voice = ?command.voice,
            "narration started"
        );
        true
    }

    /// Handles `PauseNarration`. Only pauses while the engine is audibly
    /// speaking.
    pub fn handle_pause(&mut self, command: &PauseNarration, clock: &dyn Clock) -> bool {
        let Some(engine) = self.engine.as_mut() else {
            return false;
        };
        if self.session.state() != PlaybackState::Speaking || !engine.is_producing_audio() {
            debug!(state = ?self.session.state(), "ignoring pause");
            return false;
        }

        self.session.pause(command.correlation_id, clock);
        if let Some(handle) = self.keep_alive.take() {
            self.schedule.cancel(handle);
        }
        engine.pause();

        info!(
            command = command.command_type(),
            correlation_id = %command.correlation_id,
            index = self.session.index(),
            "narration paused"
        );
        true
    }

    /// Handles `ResumeNarration`.
    pub fn handle_resume(&mut self, command: &ResumeNarration, clock: &dyn Clock) -> bool {
        if self.engine.is_none() || !self.session.resume(command.correlation_id, clock) {
            debug!(state = ?self.session.state(), "ignoring resume");
            return false;
        }

        self.keep_alive = Some(self.schedule.schedule_after(
            clock.now(),
            self.config.keep_alive_interval,
            PlaybackWakeup::KeepAlive,
        ));
        if let Some(engine) = self.engine.as_mut() {
            engine.resume();
        }

        // The in-flight unit may have finished while paused.
        let grace_pending = self.grace.is_some_and(|h| self.schedule.is_pending(h));
        if self.session.in_flight().is_none() && !grace_pending {
            self.submit_current(clock);
        }

        info!(
            command = command.command_type(),
            correlation_id = %command.correlation_id,
            index = self.session.index(),
            "narration resumed"
        );
        true
    }

    /// Handles `StopNarration`. Valid in every state and idempotent.
    pub fn handle_stop(&mut self, command: &StopNarration, clock: &dyn Clock) -> bool {
        self.stop_for(StopReason::Requested, command.correlation_id, clock)
    }

    /// Stops for `reason`: cancels the engine and every controller wakeup,
    /// clears the queue. Returns whether narration was active.
    pub fn stop_for(&mut self, reason: StopReason, correlation_id: Uuid, clock: &dyn Clock) -> bool {
        let stopped = self.teardown(reason, correlation_id, clock);
        if stopped {
            info!(%correlation_id, ?reason, "narration stopped");
        }
        stopped
    }

    /// Handles the engine's completion signal.
    pub fn handle_utterance_completed(&mut self, utterance_id: UtteranceId, clock: &dyn Clock) {
        match self.session.complete(utterance_id, clock) {
            Completion::Stale => {
                debug!(%utterance_id, "ignoring stale completion");
            }
            Completion::Exhausted => {
                let correlation_id = self.session.narration_correlation_id();
                self.stop_for(StopReason::Finished, correlation_id, clock);
            }
            Completion::Advanced => {
                if self.session.state() == PlaybackState::Speaking {
                    self.submit_current(clock);
                }
            }
        }
    }

    /// Fires the earliest wakeup if it is due. Returns whether one fired.
    pub fn fire_next_due(&mut self, clock: &dyn Clock) -> bool {
        let now = clock.now();
        let Some(due) = self.schedule.pop_due(now) else {
            return false;
        };

        match due.kind {
            PlaybackWakeup::SubmitFirst => {
                self.grace = None;
                self.submit_current(clock);
            }
            PlaybackWakeup::KeepAlive => {
                self.keep_alive = None;
                if self.session.state() == PlaybackState::Speaking {
                    if let Some(engine) = self.engine.as_mut() {
                        trace!("keep-alive prod");
                        engine.resume();
                    }
                    self.keep_alive = Some(self.schedule.schedule_after(
                        now,
                        self.config.keep_alive_interval,
                        PlaybackWakeup::KeepAlive,
                    ));
                }
            }
        }
        true
    }

    fn submit_current(&mut self, clock: &dyn Clock) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };

        let utterance_id = UtteranceId(self.next_utterance);
        let voice = voice::resolve_for_submit(self.session.voice(), &engine.list_voices());
        let Some(text) = self
            .session
            .submit_current(utterance_id, voice.clone(), clock)
        else {
            return;
        };
        self.next_utterance += 1;

        let utterance = Utterance {
            id: utterance_id,
            text,
            voice,
            rate: self.config.rate,
            pitch: self.config.pitch,
        };
        debug!(%utterance_id, index = self.session.index(), "submitting unit");

        if let Err(err) = engine.submit(utterance) {
            warn!(error = %err, %utterance_id, "engine rejected utterance; stopping narration");
            let correlation_id = self.session.narration_correlation_id();
            self.stop_for(StopReason::EngineFailure, correlation_id, clock);
        }
    }

    fn teardown(&mut self, reason: StopReason, correlation_id: Uuid, clock: &dyn Clock) -> bool {
        for handle in [self.grace.take(), self.keep_alive.take()].into_iter().flatten() {
            self.schedule.cancel(handle);
        }
        if let Some(engine) = self.engine.as_mut() {
            engine.cancel_all();
        }
        self.session.stop(reason, correlation_id, clock)
    }
}

//! The coordinator task.
//!
//! One tokio task owns the [`BedtimeSession`]. HTTP handlers talk to it
//! through a [`SessionHandle`]; the engine talks to it through
//! [`EngineSignal`]s. Between inputs the task sleeps until the session's
//! next wakeup is due.

use std::sync::Arc;
use std::time::Duration;

use moonbeams_core::clock::Clock;
use moonbeams_core::error::DomainError;
use moonbeams_core::journal::EventJournal;
use moonbeams_narration::domain::voice::VoiceOption;
use moonbeams_session::application::coordinator::{BedtimeInput, BedtimeSession};
use moonbeams_session::application::query_handlers::{
    BedtimeView, get_bedtime_view, get_voice_options,
};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::engine::EngineSignal;

/// Capacity of the command queue.
const INPUT_BUFFER: usize = 64;

/// One input plus the channel its result goes back on.
#[derive(Debug)]
struct Envelope {
    correlation_id: Uuid,
    input: BedtimeInput,
    reply: oneshot::Sender<Result<BedtimeView, DomainError>>,
}

/// Cloneable client for the coordinator task.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    inputs: mpsc::Sender<Envelope>,
    view: watch::Receiver<BedtimeView>,
    voices: watch::Receiver<Vec<VoiceOption>>,
}

impl SessionHandle {
    /// Sends `input` and waits for the view after it was applied.
    ///
    /// # Errors
    ///
    /// Returns the coordinator's `DomainError`, or
    /// `DomainError::Infrastructure` if the coordinator task is gone.
    pub async fn send(
        &self,
        correlation_id: Uuid,
        input: BedtimeInput,
    ) -> Result<BedtimeView, DomainError> {
        let (reply, response) = oneshot::channel();
        self.inputs
            .send(Envelope {
                correlation_id,
                input,
                reply,
            })
            .await
            .map_err(|_| DomainError::Infrastructure("bedtime session is not running".into()))?;
        response.await.map_err(|_| {
            DomainError::Infrastructure("bedtime session dropped the request".into())
        })?
    }

    /// The most recently published view.
    #[must_use]
    pub fn view(&self) -> BedtimeView {
        self.view.borrow().clone()
    }

    /// The most recently published voice picker entries.
    #[must_use]
    pub fn voices(&self) -> Vec<VoiceOption> {
        self.voices.borrow().clone()
    }

    /// A receiver that observes every published view.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<BedtimeView> {
        self.view.clone()
    }
}

/// Starts the coordinator task for `session`.
pub fn spawn(
    session: BedtimeSession,
    clock: Arc<dyn Clock>,
    journal: Arc<dyn EventJournal>,
    signals: mpsc::UnboundedReceiver<EngineSignal>,
) -> (SessionHandle, JoinHandle<()>) {
    let (input_tx, input_rx) = mpsc::channel(INPUT_BUFFER);
    let (view_tx, view_rx) = watch::channel(get_bedtime_view(&session));
    let (voices_tx, voices_rx) = watch::channel(get_voice_options(&session));

    let coordinator = Coordinator {
        session,
        clock,
        journal,
        inputs: input_rx,
        signals,
        view: view_tx,
        voices: voices_tx,
    };
    let task = tokio::spawn(coordinator.run());

    let handle = SessionHandle {
        inputs: input_tx,
        view: view_rx,
        voices: voices_rx,
    };
    (handle, task)
}

struct Coordinator {
    session: BedtimeSession,
    clock: Arc<dyn Clock>,
    journal: Arc<dyn EventJournal>,
    inputs: mpsc::Receiver<Envelope>,
    signals: mpsc::UnboundedReceiver<EngineSignal>,
    view: watch::Sender<BedtimeView>,
    voices: watch::Sender<Vec<VoiceOption>>,
}

impl Coordinator {
    async fn run(mut self) {
        info!("bedtime session running");
        loop {
            let wait = self.session.next_deadline().map(|deadline| {
                self.clock
                    .until(deadline)
                    .to_std()
                    .unwrap_or(Duration::ZERO)
            });

            tokio::select! {
                envelope = self.inputs.recv() => {
                    let Some(envelope) = envelope else {
                        break;
                    };
                    self.handle(envelope);
                }
                Some(signal) = self.signals.recv() => {
                    self.handle_signal(signal);
                }
                () = sleep(wait.unwrap_or_default()), if wait.is_some() => {
                    let clock = Arc::clone(&self.clock);
                    self.session.advance(clock.as_ref());
                    self.publish();
                }
            }
        }
        info!("bedtime session stopped");
    }

    fn handle(&mut self, envelope: Envelope) {
        let Envelope {
            correlation_id,
            input,
            reply,
        } = envelope;
        let result = self.apply(correlation_id, input);
        let view = self.publish();
        if reply.send(result.map(|()| view)).is_err() {
            debug!(%correlation_id, "caller went away before the reply");
        }
    }

    fn handle_signal(&mut self, signal: EngineSignal) {
        let input = match signal {
            EngineSignal::Completed(utterance_id) => BedtimeInput::UtteranceCompleted(utterance_id),
            EngineSignal::VoicesChanged(voices) => BedtimeInput::VoicesChanged(voices),
        };
        if let Err(err) = self.apply(Uuid::new_v4(), input) {
            warn!(error = %err, "engine signal rejected");
        }
        self.publish();
    }

    fn apply(&mut self, correlation_id: Uuid, input: BedtimeInput) -> Result<(), DomainError> {
        let clock = Arc::clone(&self.clock);
        let result = self.session.handle(correlation_id, input, clock.as_ref());
        self.session.advance(clock.as_ref());
        result
    }

    fn publish(&mut self) -> BedtimeView {
        let events = self.session.take_events();
        if !events.is_empty() {
            self.journal.append(&events);
        }
        let view = get_bedtime_view(&self.session);
        self.view.send_replace(view.clone());
        let voices = get_voice_options(&self.session);
        self.voices.send_if_modified(|current| {
            if *current == voices {
                return false;
            }
            *current = voices;
            true
        });
        view
    }
}

//! Recording engine — a scripted `NarrationEngine` for tests.
//!
//! The engine itself is handed to the controller; the paired
//! [`EngineProbe`] stays with the test to inspect calls and to play the
//! engine's part (finishing utterances, self-pausing).

use std::sync::{Arc, Mutex, MutexGuard};

use moonbeams_core::engine::{NarrationEngine, Utterance, UtteranceId, Voice};
use moonbeams_core::error::DomainError;

#[derive(Debug, Default)]
struct EngineLog {
    submitted: Vec<Utterance>,
    pause_calls: usize,
    resume_calls: usize,
    cancel_calls: usize,
    producing: bool,
    paused: bool,
    fail_next_submit: bool,
    voices: Vec<Voice>,
}

/// Engine double that records every call.
#[derive(Debug, Clone)]
pub struct RecordingEngine {
    log: Arc<Mutex<EngineLog>>,
}

/// Test-side view of a [`RecordingEngine`].
#[derive(Debug, Clone)]
pub struct EngineProbe {
    log: Arc<Mutex<EngineLog>>,
}

impl RecordingEngine {
    /// Creates an engine offering `voices`, plus its probe.
    #[must_use]
    pub fn new(voices: Vec<Voice>) -> (Self, EngineProbe) {
        let log = Arc::new(Mutex::new(EngineLog {
            voices,
            ..EngineLog::default()
        }));
        (
            Self {
                log: Arc::clone(&log),
            },
            EngineProbe { log },
        )
    }

    fn log(&self) -> MutexGuard<'_, EngineLog> {
        self.log.lock().unwrap()
    }
}

impl NarrationEngine for RecordingEngine {
    fn submit(&mut self, utterance: Utterance) -> Result<(), DomainError> {
        let mut log = self.log();
        if log.fail_next_submit {
            log.fail_next_submit = false;
            return Err(DomainError::Engine("synthesizer refused utterance".into()));
        }
        log.submitted.push(utterance);
        log.producing = true;
        log.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        let mut log = self.log();
        log.pause_calls += 1;
        if log.producing {
            log.producing = false;
            log.paused = true;
        }
    }

    fn resume(&mut self) {
        let mut log = self.log();
        log.resume_calls += 1;
        if log.paused {
            log.paused = false;
            log.producing = true;
        }
    }

    fn cancel_all(&mut self) {
        let mut log = self.log();
        log.cancel_calls += 1;
        log.producing = false;
        log.paused = false;
    }

    fn is_producing_audio(&self) -> bool {
        self.log().producing
    }

    fn list_voices(&self) -> Vec<Voice> {
        self.log().voices.clone()
    }
}

impl EngineProbe {
    fn log(&self) -> MutexGuard<'_, EngineLog> {
        self.log.lock().unwrap()
    }

    /// All utterances submitted so far.
    #[must_use]
    pub fn submitted(&self) -> Vec<Utterance> {
        self.log().submitted.clone()
    }

    /// Texts of all utterances submitted so far.
    #[must_use]
    pub fn submitted_texts(&self) -> Vec<String> {
        self.log().submitted.iter().map(|u| u.text.clone()).collect()
    }

    /// The most recently submitted utterance.
    #[must_use]
    pub fn last_submitted(&self) -> Option<Utterance> {
        self.log().submitted.last().cloned()
    }

    /// Number of `pause` calls.
    #[must_use]
    pub fn pause_calls(&self) -> usize {
        self.log().pause_calls
    }

    /// Number of `resume` calls, keep-alive prods included.
    #[must_use]
    pub fn resume_calls(&self) -> usize {
        self.log().resume_calls
    }

    /// Number of `cancel_all` calls.
    #[must_use]
    pub fn cancel_calls(&self) -> usize {
        self.log().cancel_calls
    }

    /// Whether the engine is paused mid-utterance.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.log().paused
    }

    /// Finishes the current utterance and returns its id, which the test
    /// then feeds back to the controller as a completion signal.
    #[must_use]
    pub fn finish_current(&self) -> Option<UtteranceId> {
        let mut log = self.log();
        log.producing = false;
        log.paused = false;
        log.submitted.last().map(|u| u.id)
    }

    /// Simulates the engine quietly pausing itself during a long silence.
    pub fn self_pause(&self) {
        let mut log = self.log();
        if log.producing {
            log.producing = false;
            log.paused = true;
        }
    }

    /// Replaces the offered voices.
    pub fn set_voices(&self, voices: Vec<Voice>) {
        self.log().voices = voices;
    }

    /// Makes the next `submit` fail.
    pub fn fail_next_submit(&self) {
        self.log().fail_next_submit = true;
    }
}

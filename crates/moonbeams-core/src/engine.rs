//! Narration engine boundary.
//!
//! The engine speaks one utterance at a time. It reports a finished
//! utterance asynchronously by handing its [`UtteranceId`] back to whoever
//! drives the playback controller; the controller decides whether that
//! signal is still relevant.
//!
//! Some engines quietly pause themselves after a long silence between
//! utterances. Implementations must therefore treat `resume` as harmless
//! when nothing is paused, because the controller calls it periodically
//! while speaking.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Engine-specific voice identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoiceId(String);

impl VoiceId {
    /// Wraps a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A voice offered by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    /// Identifier passed back on submit.
    pub id: VoiceId,
    /// Human-readable name, e.g. `Google हिन्दी`.
    pub name: String,
    /// BCP-47 style language tag, e.g. `hi-IN`.
    pub lang: String,
}

impl Voice {
    /// Creates a voice.
    pub fn new(id: impl Into<String>, name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            id: VoiceId::new(id),
            name: name.into(),
            lang: lang.into(),
        }
    }

    /// Display label: `"<name> (<lang>)"`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.lang)
    }
}

/// Identifier the controller assigns to each submitted utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UtteranceId(pub u64);

impl fmt::Display for UtteranceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "utt-{}", self.0)
    }
}

/// One speakable unit handed to the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    /// Controller-assigned identifier, echoed back on completion.
    pub id: UtteranceId,
    /// Text to speak.
    pub text: String,
    /// Voice to use; `None` means the engine default.
    pub voice: Option<VoiceId>,
    /// Speech rate multiplier (1.0 = engine normal).
    pub rate: f32,
    /// Pitch multiplier (1.0 = engine normal).
    pub pitch: f32,
}

/// The text-to-speech engine adapter.
pub trait NarrationEngine: Send {
    /// Starts speaking `utterance`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Engine` if the engine could not accept it.
    fn submit(&mut self, utterance: Utterance) -> Result<(), DomainError>;

    /// Pauses the current utterance mid-way.
    fn pause(&mut self);

    /// Resumes a paused utterance; a no-op when nothing is paused.
    fn resume(&mut self);

    /// Drops the current utterance and anything queued. No completion is
    /// reported for dropped utterances.
    fn cancel_all(&mut self);

    /// Whether audio is currently being produced.
    fn is_producing_audio(&self) -> bool;

    /// Voices currently offered.
    fn list_voices(&self) -> Vec<Voice>;
}

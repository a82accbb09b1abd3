//! Commands for the narration context.

use moonbeams_core::command::Command;
use moonbeams_core::engine::VoiceId;
use moonbeams_core::story::Story;
use uuid::Uuid;

/// Command to narrate a story from the beginning.
#[derive(Debug, Clone)]
pub struct StartNarration {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The story to narrate.
    pub story: Story,
    /// Voice captured for the whole narration.
    pub voice: Option<VoiceId>,
}

impl Command for StartNarration {
    fn command_type(&self) -> &'static str {
        "narration.start"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to pause mid-utterance.
#[derive(Debug, Clone)]
pub struct PauseNarration {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

impl Command for PauseNarration {
    fn command_type(&self) -> &'static str {
        "narration.pause"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to resume a paused narration.
#[derive(Debug, Clone)]
pub struct ResumeNarration {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

impl Command for ResumeNarration {
    fn command_type(&self) -> &'static str {
        "narration.resume"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to stop narration and discard the queue.
#[derive(Debug, Clone)]
pub struct StopNarration {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

impl Command for StopNarration {
    fn command_type(&self) -> &'static str {
        "narration.stop"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

//! Shared test doubles for the Moonbeams narration service.

mod clock;
mod engine;
mod story;

pub use clock::{FixedClock, ManualClock};
pub use engine::{EngineProbe, RecordingEngine};
pub use story::{FailingStorySource, StaticStorySource};

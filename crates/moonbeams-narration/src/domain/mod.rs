//! Domain model for narration playback.

pub mod aggregates;
pub mod chunker;
pub mod commands;
pub mod events;
pub mod voice;

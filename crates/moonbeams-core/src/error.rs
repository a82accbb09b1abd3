//! Domain error types.
//!
//! Playback and timer transitions never fail; these errors cover the
//! collaborator boundaries (engine submission, story retrieval) and input
//! validation at the edges.

use thiserror::Error;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A request was rejected before reaching the state machines.
    #[error("validation error: {0}")]
    Validation(String),

    /// The narration engine refused or failed an operation.
    #[error("narration engine error: {0}")]
    Engine(String),

    /// The story source could not produce a story.
    #[error("story retrieval failed: {0}")]
    StoryRetrieval(String),

    /// An infrastructure error (channels, tasks, processes).
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

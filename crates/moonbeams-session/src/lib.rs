//! Moonbeams — bedtime session bounded context.
//!
//! Responsible for the sleep timer, the sleep overlay raised when it runs
//! out, and the coordinator that lets the timer preempt narration.

pub mod application;
pub mod domain;
